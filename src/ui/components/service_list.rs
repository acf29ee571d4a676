//! Service list widget bound to the services screen.
//!
//! The list is shared between the dispatch loop (navigation), interaction tasks
//! (which read the selection when their effect runs) and the painter.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table, TableState},
    Frame,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::backend::{Service, ServiceMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no service selected")]
pub struct NoSelection;

/// Column the list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Name,
    Image,
    Replicas,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::Name => SortMode::Image,
            SortMode::Image => SortMode::Replicas,
            SortMode::Replicas => SortMode::Name,
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Name => write!(f, "name"),
            SortMode::Image => write!(f, "image"),
            SortMode::Replicas => write!(f, "replicas"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceList {
    services: Vec<Service>,
    selected: usize,
    sort: SortMode,
    filter: Option<String>,
    page_size: usize,
}

impl ServiceList {
    pub fn new(sort: SortMode, page_size: usize) -> Self {
        Self {
            services: Vec::new(),
            selected: 0,
            sort,
            filter: None,
            page_size: page_size.max(1),
        }
    }

    /// Replace the services, keeping the selection on the same service when it still exists.
    pub fn set_services(&mut self, services: Vec<Service>) {
        let previous = self.selected_id().ok();
        self.services = services;
        self.sort_services();
        self.reselect(previous);
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    pub fn cycle_sort(&mut self) {
        let previous = self.selected_id().ok();
        self.sort = self.sort.next();
        self.sort_services();
        self.reselect(previous);
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Show only services whose name contains `filter`; an empty filter shows everything.
    pub fn set_filter(&mut self, filter: &str) {
        let previous = self.selected_id().ok();
        self.filter = if filter.is_empty() {
            None
        } else {
            Some(filter.to_string())
        };
        self.reselect(previous);
    }

    pub fn visible_services(&self) -> Vec<&Service> {
        self.services
            .iter()
            .filter(|s| self.filter.as_deref().map_or(true, |f| s.name.contains(f)))
            .collect()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_id(&self) -> Result<String, NoSelection> {
        self.visible_services()
            .get(self.selected)
            .map(|s| s.id.clone())
            .ok_or(NoSelection)
    }

    // Navigation; each returns whether the selection moved.

    pub fn select_next(&mut self) -> bool {
        self.select(self.selected.saturating_add(1))
    }

    pub fn select_previous(&mut self) -> bool {
        self.select(self.selected.saturating_sub(1))
    }

    pub fn select_first(&mut self) -> bool {
        self.select(0)
    }

    pub fn select_last(&mut self) -> bool {
        self.select(usize::MAX)
    }

    pub fn page_down(&mut self) -> bool {
        self.select(self.selected.saturating_add(self.page_size))
    }

    pub fn page_up(&mut self) -> bool {
        self.select(self.selected.saturating_sub(self.page_size))
    }

    fn select(&mut self, index: usize) -> bool {
        let last = self.visible_services().len().saturating_sub(1);
        let index = index.min(last);
        let moved = index != self.selected;
        self.selected = index;
        moved
    }

    fn reselect(&mut self, id: Option<String>) {
        let position = id.and_then(|id| self.visible_services().iter().position(|s| s.id == id));
        match position {
            Some(index) => self.selected = index,
            None => {
                self.select(self.selected);
            }
        }
    }

    fn sort_services(&mut self) {
        match self.sort {
            SortMode::Name => self.services.sort_by(|a, b| a.name.cmp(&b.name)),
            SortMode::Image => self
                .services
                .sort_by(|a, b| a.image.cmp(&b.image).then_with(|| a.name.cmp(&b.name))),
            SortMode::Replicas => self
                .services
                .sort_by(|a, b| b.replicas.cmp(&a.replicas).then_with(|| a.name.cmp(&b.name))),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let header = Row::new(vec!["ID", "NAME", "IMAGE", "MODE", "REPLICAS"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        let visible = self.visible_services();
        let rows: Vec<Row> = visible
            .iter()
            .map(|service| {
                let (mode, replicas) = match service.mode {
                    ServiceMode::Replicated => (
                        "replicated",
                        format!("{}/{}", service.running, service.replicas),
                    ),
                    ServiceMode::Global => ("global", format!("{}", service.running)),
                };
                Row::new(vec![
                    service.id.clone(),
                    service.name.clone(),
                    service.image.clone(),
                    mode.to_string(),
                    replicas,
                ])
            })
            .collect();

        let title = match &self.filter {
            Some(filter) => format!(" Services ({}) • sort: {} • filter: {} ", visible.len(), self.sort, filter),
            None => format!(" Services ({}) • sort: {} ", visible.len(), self.sort),
        };

        let table = Table::new(
            rows,
            [
                Constraint::Length(14),
                Constraint::Percentage(25),
                Constraint::Percentage(40),
                Constraint::Length(12),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

        let mut state = TableState::default();
        if !visible.is_empty() {
            state.select(Some(self.selected));
        }
        f.render_stateful_widget(table, area, &mut state);
    }
}

/// Shared handle to the service list.
#[derive(Clone)]
pub struct ServiceListHandle {
    inner: Arc<RwLock<ServiceList>>,
}

impl ServiceListHandle {
    pub fn new(list: ServiceList) -> Self {
        Self {
            inner: Arc::new(RwLock::new(list)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ServiceList> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ServiceList> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn selected_id(&self) -> Result<String, NoSelection> {
        self.read().selected_id()
    }

    /// Run `effect` against the currently selected service and pass its result through.
    ///
    /// The selection is read once, when this is called; the list lock is not
    /// held while the effect runs.
    pub async fn with_selected_id<T, E, F, Fut>(&self, effect: F) -> Result<T, E>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<NoSelection>,
    {
        let service_id = self.selected_id()?;
        effect(service_id).await
    }
}
