//! Terminal lifecycle and the dispatch loop

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::sync::Arc;

use super::app::App;
use super::core::{Action, EventReader, EventType};
use crate::backend::ServiceBackend;
use crate::config::Config;

/// One turn of the dispatch loop.
enum Step {
    Event(EventType),
    Action(Action),
    Closed,
}

/// Run the main TUI application
pub async fn run_app(config: Config, backend: Arc<dyn ServiceBackend>) -> Result<()> {
    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;

    log::info!("Starting with backend '{}'", backend.backend_type());
    let mut app = App::new(&config, backend);
    app.load_services();

    // Main application loop
    let res = run_ui(&mut terminal, &mut app).await;
    app.shutdown();

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Dispatch loop: the only reader of terminal input.
async fn run_ui(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> Result<()> {
    let mut reader = EventReader::new();

    loop {
        if app.take_redraw() {
            terminal.draw(|f| app.render(f))?;
        }

        let step = tokio::select! {
            event = reader.next_event() => Step::Event(event?),
            action = app.next_action() => match action {
                Some(action) => Step::Action(action),
                None => Step::Closed,
            },
        };

        match step {
            Step::Event(event) => app.handle_event(event),
            Step::Action(action) => {
                app.handle_action(action);
                // Collapse a burst of refreshes into one frame
                app.drain_actions();
            }
            Step::Closed => {
                log::warn!("Action channel closed, exiting");
                break;
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
