//! Application state and action dispatch

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::backend::ServiceBackend;
use crate::config::Config;
use crate::ui::components::{StatusBar, TaskTable};
use crate::ui::core::{Action, EventType, MessageLog, WidgetRegistry};
use crate::ui::layout::LayoutManager;
use crate::ui::services::ServicesEventHandler;

/// Screen shown below the overlays.
pub enum Screen {
    Services,
    Tasks(TaskTable),
}

/// Application state separate from terminal concerns.
///
/// Owns the services screen handler and the receiving end of the action channel
/// that interactions and background loads report through.
pub struct App {
    services: ServicesEventHandler,
    screen: Screen,
    action_rx: mpsc::UnboundedReceiver<Action>,
    should_quit: bool,
    needs_redraw: bool,
}

impl App {
    pub fn new(config: &Config, backend: Arc<dyn ServiceBackend>) -> Self {
        let (services, action_rx) = ServicesEventHandler::new(backend, config);
        Self {
            services,
            screen: Screen::Services,
            action_rx,
            should_quit: false,
            needs_redraw: true,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn services(&self) -> &ServicesEventHandler {
        &self.services
    }

    pub fn registry(&self) -> &WidgetRegistry {
        self.services.registry()
    }

    pub fn messages(&self) -> &MessageLog {
        self.services.messages()
    }

    /// Start the initial load of the service list
    pub fn load_services(&mut self) {
        self.services.reload_services();
    }

    /// Deliver a terminal event.
    pub fn handle_event(&mut self, event: EventType) {
        match event {
            EventType::Key(key) => self.handle_key(key),
            EventType::Resize(_, _) => self.needs_redraw = true,
            EventType::Tick | EventType::Other => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // The task screen has no modal interactions of its own, but a view
        // opened from the services screen may still be reading input.
        if let Screen::Tasks(_) = self.screen {
            if !self.services.is_forwarding() {
                let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                match key.code {
                    KeyCode::Esc => {
                        self.screen = Screen::Services;
                        self.needs_redraw = true;
                    }
                    KeyCode::Char('c') if ctrl => self.should_quit = true,
                    KeyCode::Char('q') => self.should_quit = true,
                    _ => {}
                }
                return;
            }
        }
        self.services.handle(key);
    }

    /// Wait for the next action from the handler or a background task.
    pub async fn next_action(&mut self) -> Option<Action> {
        self.action_rx.recv().await
    }

    /// Apply every action that is already queued, without waiting.
    pub fn drain_actions(&mut self) {
        while let Ok(action) = self.action_rx.try_recv() {
            self.handle_action(action);
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Refresh => self.needs_redraw = true,
            Action::CloseView => self.services.on_view_closed(),
            Action::ReloadServices => self.services.reload_services(),
            Action::ServicesLoaded(services) => {
                log::info!("App: loaded {} services", services.len());
                self.services.services().write().set_services(services);
                self.needs_redraw = true;
            }
            Action::ShowServiceTasks(service_id) => self.services.load_tasks(service_id),
            Action::ServiceTasksLoaded { service_id, tasks } => {
                self.screen = Screen::Tasks(TaskTable::new(service_id, tasks));
                self.needs_redraw = true;
            }
            Action::Quit => self.should_quit = true,
        }
    }

    /// Whether a frame should be drawn, clearing the request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn render(&self, f: &mut Frame) {
        let chunks = LayoutManager::main_layout(f.area());

        match &self.screen {
            Screen::Services => self.services.services().read().render(f, chunks[0]),
            Screen::Tasks(table) => table.render(f, chunks[0]),
        }
        StatusBar::render(f, chunks[1], self.messages());

        // Overlays are painted last, oldest first
        for overlay in self.registry().overlays() {
            overlay.render(f, chunks[0]);
        }
    }

    /// Abort running interactions and loads.
    pub fn shutdown(&mut self) {
        self.services.shutdown();
    }
}
