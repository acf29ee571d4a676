//! Modal interactions started from the services screen.
//!
//! Each interaction runs as its own task and follows the same protocol: the
//! handler has already switched the router to forwarding and registered the
//! prompt; the task runs the prompt's focus loop, unregisters it, resumes
//! command interpretation, and only then validates the input and talks to the
//! backend.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::backend::{BackendError, LogStream, ServiceBackend};
use crate::constants::{
    ERROR_INSPECT_SERVICE, ERROR_INVALID_REPLICAS, ERROR_REMOVE_SERVICE, ERROR_SCALE_SERVICE, ERROR_SERVICE_LOGS,
};
use crate::ui::components::{NoSelection, Prompt, PromptResult, ServiceListHandle, TextViewer};
use crate::ui::core::{Action, ForwardingSession, MessageLog, Registration, WidgetRegistry};

/// Failure of an interaction's effect.
#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    #[error(transparent)]
    NoSelection(#[from] NoSelection),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Settings that shape the interactions, taken from the configuration.
#[derive(Debug, Clone)]
pub struct InteractionSettings {
    /// `since` filter used when the logs prompt is committed empty
    pub default_since: String,
    pub max_log_lines: usize,
    pub page_size: usize,
}

/// Everything an interaction task needs, cheap to clone into each task.
#[derive(Clone)]
pub struct InteractionContext {
    pub backend: Arc<dyn ServiceBackend>,
    pub services: ServiceListHandle,
    pub registry: WidgetRegistry,
    pub messages: MessageLog,
    pub actions: mpsc::UnboundedSender<Action>,
    pub settings: InteractionSettings,
}

impl InteractionContext {
    pub fn refresh(&self) {
        let _ = self.actions.send(Action::Refresh);
    }

    fn reload(&self) {
        let _ = self.actions.send(Action::ReloadServices);
    }

    fn close_view(&self) {
        let _ = self.actions.send(Action::CloseView);
    }
}

/// "y" or "Y" confirms a destructive action; anything else declines it.
pub fn is_confirmation(text: &str) -> bool {
    text == "y" || text == "Y"
}

/// Parse a replica count: an integer that is not negative.
pub fn parse_replicas(text: &str) -> Option<u64> {
    text.parse::<i64>().ok().and_then(|n| u64::try_from(n).ok())
}

/// Run the prompt's focus loop with a refresh after every keystroke, then take it off screen.
async fn run_prompt(
    ctx: &InteractionContext,
    session: &mut ForwardingSession,
    mut prompt: Prompt,
    registration: Registration,
) -> PromptResult {
    {
        let mut source = session.refreshing_source(ctx.actions.clone());
        prompt.focus(&mut source).await;
    }
    registration.release();
    ctx.refresh();
    prompt.text()
}

pub(crate) async fn remove_service(
    ctx: InteractionContext,
    mut session: ForwardingSession,
    prompt: Prompt,
    registration: Registration,
) {
    let result = run_prompt(&ctx, &mut session, prompt, registration).await;
    session.finish();

    if result.canceled || !is_confirmation(&result.text) {
        log::info!("Remove: declined");
        return;
    }

    let outcome = ctx
        .services
        .with_selected_id(|service_id| {
            let ctx = ctx.clone();
            async move {
                log::info!("Remove: removing service {}", service_id);
                ctx.backend.remove_service(&service_id).await?;
                ctx.messages.push(format!("Service {} removed", service_id));
                Ok::<(), InteractionError>(())
            }
        })
        .await;

    if let Err(e) = outcome {
        log::warn!("Remove: failed: {}", e);
        ctx.messages.push(format!("{}: {}", ERROR_REMOVE_SERVICE, e));
    }
    ctx.reload();
    ctx.refresh();
}

pub(crate) async fn scale_service(
    ctx: InteractionContext,
    mut session: ForwardingSession,
    prompt: Prompt,
    registration: Registration,
) {
    let result = run_prompt(&ctx, &mut session, prompt, registration).await;
    session.finish();

    if result.canceled {
        log::info!("Scale: canceled");
        return;
    }

    let Some(replicas) = parse_replicas(&result.text) else {
        ctx.messages.push(format!("{}: {}", ERROR_INVALID_REPLICAS, result.text));
        ctx.refresh();
        return;
    };

    let outcome = ctx
        .services
        .with_selected_id(|service_id| {
            let ctx = ctx.clone();
            async move {
                log::info!("Scale: scaling service {} to {}", service_id, replicas);
                ctx.backend.scale_service(&service_id, replicas).await?;
                ctx.messages
                    .push(format!("Service {} scaled to {} replicas", service_id, replicas));
                Ok::<(), InteractionError>(())
            }
        })
        .await;

    if let Err(e) = outcome {
        log::warn!("Scale: failed: {}", e);
        ctx.messages.push(format!("{}: {}", ERROR_SCALE_SERVICE, e));
    }
    ctx.reload();
    ctx.refresh();
}

pub(crate) async fn filter_services(
    ctx: InteractionContext,
    mut session: ForwardingSession,
    prompt: Prompt,
    registration: Registration,
) {
    let result = run_prompt(&ctx, &mut session, prompt, registration).await;
    session.finish();

    if !result.canceled {
        ctx.services.write().set_filter(&result.text);
    }
    ctx.refresh();
}

/// Ask for a `since` filter, then stream the selected service's logs until the viewer is closed.
///
/// Always ends with the close signal, like [`inspect_service`].
pub(crate) async fn show_service_logs(
    ctx: InteractionContext,
    mut session: ForwardingSession,
    prompt: Prompt,
    registration: Registration,
) {
    let result = run_prompt(&ctx, &mut session, prompt, registration).await;
    if result.canceled {
        log::info!("Logs: canceled");
    } else {
        let since = if result.text.is_empty() {
            ctx.settings.default_since.clone()
        } else {
            result.text
        };

        let opened = ctx
            .services
            .with_selected_id(|service_id| {
                let backend = ctx.backend.clone();
                async move {
                    let stream = backend.service_logs(&service_id, &since).await?;
                    Ok::<_, InteractionError>((service_id, stream))
                }
            })
            .await;

        match opened {
            // Forwarding continues: the viewer reads the same session until closed.
            Ok((service_id, stream)) => stream_logs(&ctx, &mut session, service_id, stream).await,
            Err(e) => {
                log::warn!("Logs: failed to open stream: {}", e);
                ctx.messages.push(format!("{}: {}", ERROR_SERVICE_LOGS, e));
            }
        }
    }

    session.finish();
    ctx.close_view();
    ctx.refresh();
}

async fn stream_logs(ctx: &InteractionContext, session: &mut ForwardingSession, service_id: String, stream: LogStream) {
    let viewer = Arc::new(TextViewer::streaming(
        format!("Logs of service {}", service_id),
        ctx.settings.page_size,
        ctx.settings.max_log_lines,
    ));
    let registration = ctx.registry.register(viewer.clone());
    ctx.refresh();

    let pump = tokio::spawn(pump_logs(viewer.clone(), stream, ctx.actions.clone()));
    {
        let mut source = session.refreshing_source(ctx.actions.clone());
        viewer.focus(&mut source).await;
    }
    pump.abort();
    registration.release();
    log::info!("Logs: viewer for service {} closed", service_id);
}

async fn pump_logs(viewer: Arc<TextViewer>, mut stream: LogStream, actions: mpsc::UnboundedSender<Action>) {
    while let Some(line) = stream.recv().await {
        viewer.push_line(line);
        let _ = actions.send(Action::Refresh);
    }
    viewer.mark_ended();
    let _ = actions.send(Action::Refresh);
}

/// Fetch the selected service's definition and show it until the user closes the viewer.
///
/// Always ends with the close signal so the screen takes focus back.
pub(crate) async fn inspect_service(ctx: InteractionContext, mut session: ForwardingSession) {
    let fetched = ctx
        .services
        .with_selected_id(|service_id| {
            let backend = ctx.backend.clone();
            async move {
                let value = backend.inspect_service(&service_id).await?;
                Ok::<_, InteractionError>((service_id, value))
            }
        })
        .await;

    match fetched {
        Ok((service_id, value)) => match serde_json::to_string_pretty(&value) {
            Ok(json) => {
                let lines = json.lines().map(str::to_string).collect();
                let viewer = Arc::new(TextViewer::new(
                    format!("Service {}", service_id),
                    lines,
                    ctx.settings.page_size,
                ));
                let registration = ctx.registry.register(viewer.clone());
                ctx.refresh();
                {
                    let mut source = session.refreshing_source(ctx.actions.clone());
                    viewer.focus(&mut source).await;
                }
                registration.release();
            }
            Err(e) => ctx.messages.push(format!("{}: {}", ERROR_INSPECT_SERVICE, e)),
        },
        Err(e) => {
            log::warn!("Inspect: failed: {}", e);
            ctx.messages.push(format!("{}: {}", ERROR_INSPECT_SERVICE, e));
        }
    }

    session.finish();
    ctx.close_view();
    ctx.refresh();
}
