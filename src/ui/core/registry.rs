//! Registry of overlay widgets currently shown on top of the screen.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::component::{Overlay, WidgetId};

struct Entry {
    seq: u64,
    widget: Arc<dyn Overlay>,
}

#[derive(Default)]
struct RegistryState {
    widgets: HashMap<WidgetId, Entry>,
    next_seq: u64,
}

/// Shared set of active overlays.
///
/// Prompts and viewers are added when their interaction starts and removed when
/// their focus loop ends. Removal tolerates widgets that are already gone, since
/// a view can be torn down by more than one path.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a widget. Returns `false` if a widget with the same id is already registered.
    pub fn add(&self, widget: Arc<dyn Overlay>) -> bool {
        let id = widget.id();
        let mut state = self.lock();
        if state.widgets.contains_key(&id) {
            log::warn!("Registry: widget {} is already registered", id);
            return false;
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.widgets.insert(id, Entry { seq, widget });
        log::debug!("Registry: added widget {}", id);
        true
    }

    /// Remove a widget. Removing an absent widget is a no-op; returns whether it was present.
    pub fn remove(&self, id: WidgetId) -> bool {
        let removed = self.lock().widgets.remove(&id).is_some();
        if removed {
            log::debug!("Registry: removed widget {}", id);
        }
        removed
    }

    /// Add a widget and get a guard that removes it when released or dropped.
    pub fn register(&self, widget: Arc<dyn Overlay>) -> Registration {
        let id = widget.id();
        self.add(widget);
        Registration {
            registry: self.clone(),
            id,
        }
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.lock().widgets.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the registered widgets in the order they were added, for painting.
    pub fn overlays(&self) -> Vec<Arc<dyn Overlay>> {
        let state = self.lock();
        let mut entries: Vec<&Entry> = state.widgets.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.widget.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Keeps a widget registered for as long as it is alive.
#[must_use = "dropping a Registration unregisters the widget immediately"]
pub struct Registration {
    registry: WidgetRegistry,
    id: WidgetId,
}

impl Registration {
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Unregister the widget now.
    pub fn release(self) {}
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
