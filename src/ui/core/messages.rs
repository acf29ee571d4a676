use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex};

/// A user-visible notification.
#[derive(Debug, Clone)]
pub struct Message {
    pub at: DateTime<Local>,
    pub text: String,
}

/// Append-only sink for short user-visible messages, shared across tasks.
#[derive(Clone, Default)]
pub struct MessageLog {
    entries: Arc<Mutex<Vec<Message>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message
    pub fn push(&self, text: impl Into<String>) {
        let text = text.into();
        log::info!("Message: {}", text);

        if let Ok(mut entries) = self.entries.lock() {
            entries.push(Message { at: Local::now(), text });
        }
    }

    /// The most recent message, if any
    pub fn latest(&self) -> Option<Message> {
        self.entries.lock().ok().and_then(|entries| entries.last().cloned())
    }

    /// All message texts, oldest first
    pub fn texts(&self) -> Vec<String> {
        if let Ok(entries) = self.entries.lock() {
            entries.iter().map(|m| m.text.clone()).collect()
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
