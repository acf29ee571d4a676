use crossterm::event::{poll, Event, KeyEvent, KeyEventKind};
use tokio::time::Duration;

/// Reads raw terminal input for the dispatch loop.
///
/// Polls crossterm without blocking and yields a [`EventType::Tick`] when no
/// input is pending, so the caller can `select!` it against other channels.
pub struct EventReader {
    tick_rate: Duration,
}

impl EventReader {
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(50),
        }
    }

    pub async fn next_event(&mut self) -> anyhow::Result<EventType> {
        // Check for terminal events without blocking first
        if poll(Duration::from_millis(0))? {
            match crossterm::event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(EventType::Key(key));
                }
                Event::Resize(w, h) => return Ok(EventType::Resize(w, h)),
                _ => return Ok(EventType::Other),
            }
        }

        // If no immediate event, wait a bit and return tick
        tokio::time::sleep(self.tick_rate).await;
        Ok(EventType::Tick)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
    Other,
}

impl Default for EventReader {
    fn default() -> Self {
        Self::new()
    }
}
