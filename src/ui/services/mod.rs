//! The services screen: command interpretation and modal interactions.

pub mod interactions;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::backend::ServiceBackend;
use crate::config::Config;
use crate::constants::{
    ERROR_INTERACTION_BUSY, ERROR_SHOW_TASKS, INFO_REFRESHING_SERVICES, PROMPT_FILTER_SERVICES, PROMPT_REMOVE_SERVICE,
    PROMPT_SCALE_SERVICE, PROMPT_SERVICE_LOGS,
};
use crate::ui::components::{Prompt, ServiceList, ServiceListHandle};
use crate::ui::core::{
    Action, EventRouter, ForwardingSession, MessageLog, RoutingState, TaskManager, WidgetRegistry,
};

pub use interactions::{InteractionContext, InteractionError, InteractionSettings};

/// Modal interactions that read their input through a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptFlow {
    Remove,
    Scale,
    Logs,
    Filter,
}

impl PromptFlow {
    fn message(self) -> &'static str {
        match self {
            Self::Remove => PROMPT_REMOVE_SERVICE,
            Self::Scale => PROMPT_SCALE_SERVICE,
            Self::Logs => PROMPT_SERVICE_LOGS,
            Self::Filter => PROMPT_FILTER_SERVICES,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Remove => "Remove service",
            Self::Scale => "Scale service",
            Self::Logs => "Service logs",
            Self::Filter => "Filter services",
        }
    }
}

/// Event handler bound to the services screen.
///
/// Every key from the dispatch loop goes through [`handle`](Self::handle). While
/// a modal interaction is running the key is forwarded to it untouched; otherwise
/// it is matched against the screen's command table and, failing that, the
/// navigation keys of the service list.
pub struct ServicesEventHandler {
    router: EventRouter,
    has_focus: bool,
    ctx: InteractionContext,
    task_manager: TaskManager,
}

impl ServicesEventHandler {
    /// Build the handler and the receiving end of its action channel.
    pub fn new(backend: Arc<dyn ServiceBackend>, config: &Config) -> (Self, mpsc::UnboundedReceiver<Action>) {
        let (task_manager, action_rx) = TaskManager::new();
        let services = ServiceListHandle::new(ServiceList::new(config.ui.default_sort, config.ui.page_size));

        let ctx = InteractionContext {
            backend,
            services,
            registry: WidgetRegistry::new(),
            messages: MessageLog::new(),
            actions: task_manager.action_sender(),
            settings: InteractionSettings {
                default_since: config.logs.default_since.clone(),
                max_log_lines: config.logs.max_lines,
                page_size: config.ui.page_size,
            },
        };

        (
            Self {
                router: EventRouter::new(),
                has_focus: true,
                ctx,
                task_manager,
            },
            action_rx,
        )
    }

    /// Route one input event.
    pub fn handle(&mut self, event: KeyEvent) {
        self.task_manager.cleanup_finished_tasks();

        let Some(event) = self.router.route(event) else {
            return;
        };

        if self.handle_command(event) {
            // An interaction that just started has an overlay to paint
            if self.has_focus || self.router.is_forwarding() {
                self.ctx.refresh();
            }
            return;
        }

        self.handle_base(event);
    }

    fn handle_command(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::F(1) => {
                let mode = {
                    let mut list = self.ctx.services.write();
                    list.cycle_sort();
                    list.sort_mode()
                };
                log::debug!("Services: sorted by {}", mode);
            }
            KeyCode::F(5) => {
                self.ctx.messages.push(INFO_REFRESHING_SERVICES);
                self.reload_services();
            }
            KeyCode::Char('r') if ctrl => self.start_prompt(PromptFlow::Remove),
            KeyCode::Char('s') if ctrl => self.start_prompt(PromptFlow::Scale),
            KeyCode::Enter => self.show_tasks(),
            KeyCode::Char('%') => self.start_prompt(PromptFlow::Filter),
            KeyCode::Char('l') if !ctrl => self.start_prompt(PromptFlow::Logs),
            KeyCode::Char('i') | KeyCode::Char('I') if !ctrl => self.start_inspect(),
            _ => return false,
        }
        true
    }

    /// Navigation and quit.
    fn handle_base(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let moved = {
            let mut list = self.ctx.services.write();
            match key.code {
                KeyCode::Char('c') if ctrl => {
                    let _ = self.ctx.actions.send(Action::Quit);
                    false
                }
                KeyCode::Char('q') => {
                    let _ = self.ctx.actions.send(Action::Quit);
                    false
                }
                KeyCode::Down | KeyCode::Char('j') => list.select_next(),
                KeyCode::Up | KeyCode::Char('k') => list.select_previous(),
                KeyCode::PageDown => list.page_down(),
                KeyCode::PageUp => list.page_up(),
                KeyCode::Home => list.select_first(),
                KeyCode::End => list.select_last(),
                _ => false,
            }
        };
        if moved {
            self.ctx.refresh();
        }
    }

    /// Start forwarding for a new interaction, or report that one is already running.
    fn begin_interaction(&mut self) -> Option<ForwardingSession> {
        match self.router.begin_forwarding() {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("Services: cannot start interaction: {}", e);
                self.ctx.messages.push(ERROR_INTERACTION_BUSY);
                None
            }
        }
    }

    fn start_prompt(&mut self, flow: PromptFlow) {
        let Some(session) = self.begin_interaction() else {
            return;
        };
        let prompt = Prompt::new(flow.message());
        let registration = self.ctx.registry.register(prompt.overlay());
        log::info!("Services: {} prompt opened", flow.description());

        let ctx = self.ctx.clone();
        let description = flow.description();
        match flow {
            PromptFlow::Remove => {
                self.task_manager
                    .spawn(description, interactions::remove_service(ctx, session, prompt, registration));
            }
            PromptFlow::Scale => {
                self.task_manager
                    .spawn(description, interactions::scale_service(ctx, session, prompt, registration));
            }
            PromptFlow::Filter => {
                self.task_manager
                    .spawn(description, interactions::filter_services(ctx, session, prompt, registration));
            }
            PromptFlow::Logs => {
                // The log viewer takes over the screen; the flow ends with the close signal.
                self.has_focus = false;
                self.task_manager
                    .spawn(description, interactions::show_service_logs(ctx, session, prompt, registration));
            }
        }
    }

    fn start_inspect(&mut self) {
        let Some(session) = self.begin_interaction() else {
            return;
        };
        self.has_focus = false;
        let ctx = self.ctx.clone();
        self.task_manager
            .spawn("Inspect service", interactions::inspect_service(ctx, session));
    }

    fn show_tasks(&mut self) {
        match self.ctx.services.selected_id() {
            Ok(service_id) => {
                let _ = self.ctx.actions.send(Action::ShowServiceTasks(service_id));
            }
            Err(e) => self.ctx.messages.push(format!("{}: {}", ERROR_SHOW_TASKS, e)),
        }
    }

    /// Reload the service list in the background.
    pub fn reload_services(&mut self) {
        self.task_manager
            .spawn_service_load(self.ctx.backend.clone(), self.ctx.messages.clone());
    }

    /// Fetch a service's tasks in the background.
    pub fn load_tasks(&mut self, service_id: String) {
        self.task_manager
            .spawn_task_fetch(self.ctx.backend.clone(), self.ctx.messages.clone(), service_id);
    }

    /// A sub-view sent the close signal: the screen is visible again.
    pub fn on_view_closed(&mut self) {
        self.has_focus = true;
        self.ctx.refresh();
    }

    pub fn routing_state(&self) -> RoutingState {
        self.router.state()
    }

    pub fn is_forwarding(&self) -> bool {
        self.router.is_forwarding()
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn services(&self) -> &ServiceListHandle {
        &self.ctx.services
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.ctx.registry
    }

    pub fn messages(&self) -> &MessageLog {
        &self.ctx.messages
    }

    pub fn active_task_count(&self) -> usize {
        self.task_manager.task_count()
    }

    /// Wait until every interaction and load spawned so far has completed.
    pub async fn settle(&mut self) {
        self.task_manager.join_all().await;
    }

    /// Abort running interactions. Their sessions and registrations are dropped with them.
    pub fn shutdown(&mut self) {
        self.task_manager.cancel_all_tasks();
    }
}
