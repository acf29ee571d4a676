//! Input routing between a screen handler and its modal interactions.
//!
//! The dispatch loop hands every key to the screen's handler, which asks the
//! [`EventRouter`] whether to interpret it. While a modal interaction runs, the
//! router is in [`RoutingState::Forwarding`] and pushes keys onto a channel whose
//! receiving end is owned by the interaction's [`ForwardingSession`].
//!
//! The session takes the receiver out of the router when forwarding begins and
//! hands it back when it is dropped, so the channel can only ever have one
//! consumer, and the state flip back to `Interpreting` happens on every exit
//! path of the interaction task, panics included.

use crossterm::event::KeyEvent;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

use super::actions::Action;
use super::event_source::EventSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingState {
    /// Keys are interpreted as screen commands
    #[default]
    Interpreting,
    /// Keys are pushed to the active modal interaction
    Forwarding,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("another interaction is already receiving input")]
    AlreadyForwarding,
}

struct RouterInner {
    state: RoutingState,
    receiver: Option<mpsc::UnboundedReceiver<KeyEvent>>,
}

/// Two-state machine deciding who consumes the next key.
pub struct EventRouter {
    inner: Arc<Mutex<RouterInner>>,
    sender: mpsc::UnboundedSender<KeyEvent>,
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRouter {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Mutex::new(RouterInner {
                state: RoutingState::Interpreting,
                receiver: Some(receiver),
            })),
            sender,
        }
    }

    pub fn state(&self) -> RoutingState {
        lock(&self.inner).state
    }

    pub fn is_forwarding(&self) -> bool {
        self.state() == RoutingState::Forwarding
    }

    /// Forward `event` if an interaction is active, otherwise hand it back for
    /// interpretation. Never blocks.
    pub fn route(&self, event: KeyEvent) -> Option<KeyEvent> {
        let inner = lock(&self.inner);
        match inner.state {
            RoutingState::Interpreting => Some(event),
            RoutingState::Forwarding => {
                if let Err(e) = self.sender.send(event) {
                    log::error!("Routing: forwarded event lost, channel closed: {:?}", e.0);
                }
                None
            }
        }
    }

    /// Switch to forwarding and hand the channel's read end to a new session.
    ///
    /// Once this returns, every routed key is buffered for the session, so the
    /// interaction task may start receiving at any later point without losing input.
    pub fn begin_forwarding(&self) -> Result<ForwardingSession, RoutingError> {
        let mut inner = lock(&self.inner);
        if inner.state == RoutingState::Forwarding {
            return Err(RoutingError::AlreadyForwarding);
        }
        let receiver = inner.receiver.take().ok_or(RoutingError::AlreadyForwarding)?;
        inner.state = RoutingState::Forwarding;
        log::info!("Routing: forwarding started");

        Ok(ForwardingSession {
            inner: self.inner.clone(),
            receiver: Some(receiver),
        })
    }
}

/// Exclusive claim on the forwarded-event channel for one modal interaction.
///
/// Dropping the session (or calling [`finish`](Self::finish)) returns the router
/// to `Interpreting`. Keys forwarded after the interaction stopped reading are
/// discarded at that point so they cannot leak into the next interaction. This
/// loses keys typed between a prompt's commit and the end of its session: they
/// were addressed to a prompt that no longer exists, and replaying them as
/// screen commands could start an unintended action. Each discard is logged at
/// warn level.
pub struct ForwardingSession {
    inner: Arc<Mutex<RouterInner>>,
    receiver: Option<mpsc::UnboundedReceiver<KeyEvent>>,
}

impl ForwardingSession {
    /// An event source over this session's channel with a custom handled-hook.
    pub fn event_source<'a, F>(&'a mut self, on_handled: F) -> EventSource<'a>
    where
        F: FnMut(&KeyEvent) -> anyhow::Result<()> + Send + 'a,
    {
        EventSource::new(self.receiver.as_mut(), on_handled)
    }

    /// An event source that requests a refresh after every handled event.
    pub fn refreshing_source(&mut self, actions: mpsc::UnboundedSender<Action>) -> EventSource<'_> {
        EventSource::refreshing(self.receiver.as_mut(), actions)
    }

    /// End the interaction and resume command interpretation.
    pub fn finish(self) {}
}

impl Drop for ForwardingSession {
    fn drop(&mut self) {
        let mut inner = lock(&self.inner);
        inner.state = RoutingState::Interpreting;

        if let Some(mut receiver) = self.receiver.take() {
            let mut stale = 0;
            while let Ok(event) = receiver.try_recv() {
                log::debug!("Routing: dropping unread event {:?}", event.code);
                stale += 1;
            }
            if stale > 0 {
                log::warn!("Routing: discarded {} unread event(s)", stale);
            }
            inner.receiver = Some(receiver);
        }
        log::info!("Routing: forwarding stopped");
    }
}

fn lock(inner: &Mutex<RouterInner>) -> MutexGuard<'_, RouterInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
