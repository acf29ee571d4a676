//! Status bar component

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Paragraph},
    Frame,
};

use chrono::Local;

use crate::constants::{KEY_HINTS, STATUS_MESSAGE_TTL_SECS};
use crate::ui::core::MessageLog;

/// Status bar component
pub struct StatusBar;

impl StatusBar {
    /// Render the latest message while it is recent, the key hints otherwise
    pub fn render(f: &mut Frame, area: Rect, messages: &MessageLog) {
        let recent = messages
            .latest()
            .filter(|m| Local::now().signed_duration_since(m.at).num_seconds() < STATUS_MESSAGE_TTL_SECS);
        let (status_text, status_color) = match recent {
            Some(message) => (
                format!("[{}] {}", message.at.format("%H:%M:%S"), message.text),
                Color::Yellow,
            ),
            None => (KEY_HINTS.to_string(), Color::Gray),
        };

        let status_bar = Paragraph::new(status_text)
            .block(Block::default())
            .alignment(Alignment::Center)
            .style(Style::default().fg(status_color));

        f.render_widget(status_bar, area);
    }
}
