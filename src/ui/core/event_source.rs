use crossterm::event::KeyEvent;
use tokio::sync::mpsc;

use super::actions::Action;

type HandledHook<'a> = Box<dyn FnMut(&KeyEvent) -> anyhow::Result<()> + Send + 'a>;

/// Event feed for a modal focus loop.
///
/// Wraps the read end of the forwarded-event channel together with a hook that
/// the loop calls after each event it handles. A source is built fresh for each
/// interaction and borrows the channel from the forwarding session that owns it.
pub struct EventSource<'a> {
    events: Option<&'a mut mpsc::UnboundedReceiver<KeyEvent>>,
    on_handled: HandledHook<'a>,
}

impl<'a> EventSource<'a> {
    pub fn new<F>(events: Option<&'a mut mpsc::UnboundedReceiver<KeyEvent>>, on_handled: F) -> Self
    where
        F: FnMut(&KeyEvent) -> anyhow::Result<()> + Send + 'a,
    {
        Self {
            events,
            on_handled: Box::new(on_handled),
        }
    }

    /// A source whose hook requests a screen refresh after every handled event.
    pub fn refreshing(
        events: Option<&'a mut mpsc::UnboundedReceiver<KeyEvent>>,
        actions: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self::new(events, move |_| {
            actions
                .send(Action::Refresh)
                .map_err(|_| anyhow::anyhow!("refresh channel closed"))
        })
    }

    /// Wait for the next forwarded event. `None` once the channel is closed.
    pub async fn next_event(&mut self) -> Option<KeyEvent> {
        match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => None,
        }
    }

    /// Report that `event` has been handled.
    pub fn event_handled(&mut self, event: &KeyEvent) {
        if let Err(e) = (self.on_handled)(event) {
            log::warn!("Event hook failed: {}", e);
        }
    }
}
