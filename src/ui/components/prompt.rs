//! Modal text prompt used for confirmations and free-text input.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::sync::{Arc, Mutex};

use crate::ui::core::{EventSource, Overlay, WidgetId};
use crate::ui::layout::LayoutManager;

/// What a prompt ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptResult {
    pub text: String,
    pub canceled: bool,
}

/// Effect of a single key on the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Continue,
    Committed,
    Canceled,
}

#[derive(Default)]
struct Snapshot {
    text: String,
    cursor: usize,
}

/// Read-only face of a [`Prompt`], registered as an overlay for painting.
pub struct PromptView {
    id: WidgetId,
    message: String,
    snapshot: Mutex<Snapshot>,
}

impl PromptView {
    pub fn text(&self) -> String {
        self.snapshot.lock().map(|s| s.text.clone()).unwrap_or_default()
    }
}

impl Overlay for PromptView {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn render(&self, f: &mut Frame, area: Rect) {
        let (text, cursor) = match self.snapshot.lock() {
            Ok(snapshot) => (snapshot.text.clone(), snapshot.cursor),
            Err(_) => return,
        };

        let dialog_area = LayoutManager::centered_rect_lines(70, 7, area);
        f.render_widget(Clear, dialog_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Input ")
            .style(Style::default().fg(Color::Yellow));
        let inner = block.inner(dialog_area);
        f.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(2), Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let message = Paragraph::new(self.message.as_str())
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: true });
        f.render_widget(message, chunks[0]);

        let input = Paragraph::new(format!("> {}", text)).style(Style::default().fg(Color::Cyan));
        f.render_widget(input, chunks[1]);

        let instructions = Paragraph::new("Enter to confirm, Esc to cancel").style(Style::default().fg(Color::Gray));
        f.render_widget(instructions, chunks[2]);

        let cursor_x = chunks[1].x.saturating_add(2).saturating_add(cursor as u16);
        f.set_cursor_position((cursor_x.min(chunks[1].right().saturating_sub(1)), chunks[1].y));
    }
}

/// A modal prompt.
///
/// While focused, the prompt's loop is the only reader and writer of its input
/// buffer; the registered [`PromptView`] sees a copy published after each edit.
pub struct Prompt {
    buffer: String,
    /// Cursor position in characters
    cursor: usize,
    committed: bool,
    canceled: bool,
    view: Arc<PromptView>,
}

impl Prompt {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            committed: false,
            canceled: false,
            view: Arc::new(PromptView {
                id: WidgetId::new(),
                message: message.into(),
                snapshot: Mutex::new(Snapshot::default()),
            }),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.view.id
    }

    /// The overlay to register while this prompt is shown.
    pub fn overlay(&self) -> Arc<dyn Overlay> {
        self.view.clone()
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// Consume events from `source` until the user commits or cancels.
    ///
    /// A closed source counts as a cancellation.
    pub async fn focus(&mut self, source: &mut EventSource<'_>) {
        while !self.committed && !self.canceled {
            let Some(event) = source.next_event().await else {
                log::debug!("Prompt: event source closed, canceling");
                self.canceled = true;
                break;
            };
            if self.handle_key(event) == PromptOutcome::Continue {
                source.event_handled(&event);
            }
        }
    }

    /// Apply a single key to the prompt.
    pub fn handle_key(&mut self, key: KeyEvent) -> PromptOutcome {
        if self.committed {
            return PromptOutcome::Committed;
        }
        if self.canceled {
            return PromptOutcome::Canceled;
        }

        match key.code {
            KeyCode::Enter => {
                self.committed = true;
                return PromptOutcome::Committed;
            }
            KeyCode::Esc => {
                self.canceled = true;
                return PromptOutcome::Canceled;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.canceled = true;
                return PromptOutcome::Canceled;
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                let at = self.byte_index();
                self.buffer.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_index();
                self.buffer.remove(at);
            }
            KeyCode::Delete if self.cursor < self.char_count() => {
                let at = self.byte_index();
                self.buffer.remove(at);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.char_count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.char_count(),
            _ => {}
        }

        self.publish();
        PromptOutcome::Continue
    }

    /// The entered text and whether the prompt was canceled.
    pub fn text(&self) -> PromptResult {
        PromptResult {
            text: self.buffer.clone(),
            canceled: self.canceled,
        }
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_index(&self) -> usize {
        self.buffer
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    fn publish(&self) {
        if let Ok(mut snapshot) = self.view.snapshot.lock() {
            snapshot.text.clone_from(&self.buffer);
            snapshot.cursor = self.cursor;
        }
    }
}
