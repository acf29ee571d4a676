//! Scrollable full-screen text viewer for inspect output and log streams.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use std::sync::{Mutex, MutexGuard};

use crate::ui::core::{EventSource, Overlay, WidgetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerOutcome {
    Continue,
    Close,
}

struct ViewerState {
    lines: Vec<String>,
    /// Index of the first visible line when not following
    offset: usize,
    /// Keep the newest lines in view
    follow: bool,
    ended: bool,
}

pub struct TextViewer {
    id: WidgetId,
    title: String,
    page_size: usize,
    max_lines: usize,
    state: Mutex<ViewerState>,
}

impl TextViewer {
    /// A viewer over fixed content, starting at the top.
    pub fn new(title: impl Into<String>, lines: Vec<String>, page_size: usize) -> Self {
        Self::build(title.into(), lines, page_size, usize::MAX, false)
    }

    /// A viewer fed line by line, following the newest line and keeping at most `max_lines`.
    pub fn streaming(title: impl Into<String>, page_size: usize, max_lines: usize) -> Self {
        Self::build(title.into(), Vec::new(), page_size, max_lines, true)
    }

    fn build(title: String, lines: Vec<String>, page_size: usize, max_lines: usize, follow: bool) -> Self {
        Self {
            id: WidgetId::new(),
            title,
            page_size: page_size.max(1),
            max_lines: max_lines.max(1),
            state: Mutex::new(ViewerState {
                lines,
                offset: 0,
                follow,
                ended: false,
            }),
        }
    }

    pub fn push_line(&self, line: String) {
        let mut state = self.lock();
        state.lines.push(line);
        if state.lines.len() > self.max_lines {
            let excess = state.lines.len() - self.max_lines;
            state.lines.drain(..excess);
            state.offset = state.offset.saturating_sub(excess);
        }
    }

    /// Mark the underlying stream as finished.
    pub fn mark_ended(&self) {
        self.lock().ended = true;
    }

    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    pub fn offset(&self) -> usize {
        self.lock().offset
    }

    pub fn is_following(&self) -> bool {
        self.lock().follow
    }

    /// Consume events from `source` until the user closes the viewer.
    pub async fn focus(&self, source: &mut EventSource<'_>) {
        while let Some(event) = source.next_event().await {
            if self.handle_key(event) == ViewerOutcome::Close {
                return;
            }
            source.event_handled(&event);
        }
        log::debug!("Viewer: event source closed");
    }

    pub fn handle_key(&self, key: KeyEvent) -> ViewerOutcome {
        let mut state = self.lock();
        let last_top = state.lines.len().saturating_sub(self.page_size);
        if state.follow && matches!(key.code, KeyCode::Up | KeyCode::PageUp | KeyCode::Char('k')) {
            state.follow = false;
            state.offset = last_top;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return ViewerOutcome::Close,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return ViewerOutcome::Close,
            KeyCode::Up | KeyCode::Char('k') => state.offset = state.offset.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => state.offset = (state.offset + 1).min(last_top),
            KeyCode::PageUp => state.offset = state.offset.saturating_sub(self.page_size),
            KeyCode::PageDown => state.offset = (state.offset + self.page_size).min(last_top),
            KeyCode::Home | KeyCode::Char('g') => {
                state.follow = false;
                state.offset = 0;
            }
            KeyCode::End | KeyCode::Char('G') => {
                state.follow = true;
                state.offset = last_top;
            }
            _ => {}
        }
        ViewerOutcome::Continue
    }

    fn lock(&self) -> MutexGuard<'_, ViewerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Overlay for TextViewer {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn render(&self, f: &mut Frame, area: Rect) {
        let state = self.lock();
        f.render_widget(Clear, area);

        let title = if state.ended {
            format!(" {} (stream ended) ", self.title)
        } else {
            format!(" {} ", self.title)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_bottom(" Esc/q: close • ↑↓ PgUp/PgDn: scroll • End: follow ")
            .style(Style::default().fg(Color::Gray));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let height = inner.height as usize;
        let top = if state.follow {
            state.lines.len().saturating_sub(height)
        } else {
            state.offset.min(state.lines.len().saturating_sub(1))
        };
        let visible: Vec<Line> = state
            .lines
            .iter()
            .skip(top)
            .take(height)
            .map(|l| Line::from(l.as_str()))
            .collect();
        f.render_widget(Paragraph::new(visible).style(Style::default().fg(Color::White)), inner);

        if state.lines.len() > height {
            let mut scrollbar_state = ScrollbarState::new(state.lines.len()).position(top);
            f.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area,
                &mut scrollbar_state,
            );
        }
    }
}
