use crossterm::event::KeyCode;
use ratatui::{backend::TestBackend, Terminal};
use std::sync::Arc;

use swarmdeck::backend::MemoryBackend;
use swarmdeck::config::Config;
use swarmdeck::ui::core::{Action, EventType};
use swarmdeck::ui::{App, Screen};

use super::support::{code, ctrl, key};

fn demo_app() -> App {
    App::new(&Config::default(), Arc::new(MemoryBackend::demo()))
}

/// Feed queued actions back into the app until the channel is empty.
async fn pump(app: &mut App) {
    for _ in 0..20 {
        tokio::task::yield_now().await;
        app.drain_actions();
    }
}

fn render(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
    terminal.draw(|f| app.render(f)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

#[tokio::test]
async fn test_initial_load_fills_service_list() {
    let mut app = demo_app();
    assert!(app.take_redraw());
    app.load_services();
    pump(&mut app).await;

    assert_eq!(app.services().services().read().visible_services().len(), 4);
    assert!(app.take_redraw());
    assert!(!app.take_redraw());

    let screen = render(&app);
    assert!(screen.contains("node-exporter"));
    assert!(screen.contains("Services (4)"));
}

#[tokio::test]
async fn test_enter_opens_task_screen_and_escape_returns() {
    let mut app = demo_app();
    app.load_services();
    pump(&mut app).await;

    app.handle_event(EventType::Key(code(KeyCode::Enter)));
    pump(&mut app).await;
    match app.screen() {
        Screen::Tasks(table) => {
            assert_eq!(table.service_id, "p0a7qe");
            assert_eq!(table.tasks.len(), 2);
        }
        Screen::Services => panic!("expected the task screen"),
    }
    assert!(render(&app).contains("Tasks of service p0a7qe"));

    app.handle_event(EventType::Key(code(KeyCode::Esc)));
    assert!(matches!(app.screen(), Screen::Services));
    assert!(!app.should_quit());
}

#[tokio::test]
async fn test_prompt_overlay_is_painted_while_open() {
    let mut app = demo_app();
    app.load_services();
    pump(&mut app).await;

    app.handle_event(EventType::Key(ctrl('s')));
    app.handle_event(EventType::Key(key('7')));
    pump(&mut app).await;
    assert_eq!(app.registry().len(), 1);
    assert!(render(&app).contains("> 7"));

    app.handle_event(EventType::Key(code(KeyCode::Enter)));
    pump(&mut app).await;
    assert!(app.registry().is_empty());
    assert!(!app.services().is_forwarding());

    // The reload triggered by the scale brings the new count in
    let screen = render(&app);
    assert!(screen.contains("7/7"));
    assert!(screen.contains("scaled to 7 replicas"));
}

#[tokio::test]
async fn test_inspect_close_restores_focus() {
    let mut app = demo_app();
    app.load_services();
    pump(&mut app).await;

    app.handle_event(EventType::Key(key('i')));
    pump(&mut app).await;
    assert!(!app.services().has_focus());
    assert!(render(&app).contains("\"image\""));

    app.handle_event(EventType::Key(code(KeyCode::Esc)));
    pump(&mut app).await;
    assert!(app.services().has_focus());
    assert!(app.registry().is_empty());
}

#[tokio::test]
async fn test_logs_prompt_is_drawn_when_opened() {
    let mut app = demo_app();
    app.load_services();
    pump(&mut app).await;
    app.take_redraw();

    app.handle_event(EventType::Key(key('l')));
    pump(&mut app).await;
    assert_eq!(app.registry().len(), 1);
    assert!(app.take_redraw());

    app.handle_event(EventType::Key(code(KeyCode::Esc)));
    pump(&mut app).await;
    assert!(app.registry().is_empty());
    assert!(app.services().has_focus());
    app.shutdown();
}

#[tokio::test]
async fn test_inspect_viewer_is_drawn_when_opened() {
    let mut app = demo_app();
    app.load_services();
    pump(&mut app).await;
    app.take_redraw();

    app.handle_event(EventType::Key(key('i')));
    pump(&mut app).await;
    assert_eq!(app.registry().len(), 1);
    assert!(app.take_redraw());

    app.handle_event(EventType::Key(code(KeyCode::Esc)));
    pump(&mut app).await;
    assert!(app.registry().is_empty());
    app.shutdown();
}

#[tokio::test]
async fn test_quit_keys() {
    let mut app = demo_app();
    app.handle_event(EventType::Key(key('q')));
    pump(&mut app).await;
    assert!(app.should_quit());

    let mut app = demo_app();
    app.handle_action(Action::Quit);
    assert!(app.should_quit());
}

#[tokio::test]
async fn test_quit_key_inside_prompt_is_text() {
    let mut app = demo_app();
    app.load_services();
    pump(&mut app).await;

    app.handle_event(EventType::Key(key('%')));
    app.handle_event(EventType::Key(key('q')));
    pump(&mut app).await;
    assert!(!app.should_quit());

    app.handle_event(EventType::Key(code(KeyCode::Esc)));
    pump(&mut app).await;
    app.shutdown();
}
