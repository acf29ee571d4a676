use ratatui::{layout::Rect, Frame};
use std::fmt;
use uuid::Uuid;

/// Identity of an overlay widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(Uuid);

impl WidgetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A widget painted on top of the current screen while it is registered.
///
/// Overlays are shared between the task that drives them and the painter, so
/// rendering only gets `&self`; any state the painter needs is published by the
/// owning task behind interior mutability.
pub trait Overlay: Send + Sync {
    fn id(&self) -> WidgetId;

    fn render(&self, f: &mut Frame, area: Rect);
}
