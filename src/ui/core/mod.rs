//! Core UI functionality for swarmdeck.
//!
//! This module contains the building blocks every screen relies on: input
//! routing between a screen and its modal interactions, the overlay registry,
//! the user-visible message log, and background task management.
//!
//! # Module Components
//!
//! - [`actions`] - Messages from handlers and background tasks to the app loop
//! - [`component`] - Overlay widget trait and widget identity
//! - [`event_reader`] - Raw terminal input for the dispatch loop
//! - [`event_source`] - Event feed handed to modal focus loops
//! - [`messages`] - Append-only sink for user-visible notifications
//! - [`registry`] - Shared set of active overlay widgets
//! - [`routing`] - Interpreting/Forwarding state machine and forwarding sessions
//! - [`task_manager`] - Background task ownership
//!
//! # Input flow
//!
//! 1. The dispatch loop reads a key with the [`EventReader`]
//! 2. The active screen handler asks its [`EventRouter`] whether to interpret it
//! 3. While a modal interaction runs, the key is forwarded to the interaction's
//!    [`ForwardingSession`] and consumed through an [`EventSource`]
//! 4. When the interaction ends the session is dropped and interpretation resumes

pub mod actions;
pub mod component;
pub mod event_reader;
pub mod event_source;
pub mod messages;
pub mod registry;
pub mod routing;
pub mod task_manager;

pub use actions::Action;
pub use component::{Overlay, WidgetId};
pub use event_reader::{EventReader, EventType};
pub use event_source::EventSource;
pub use messages::{Message, MessageLog};
pub use registry::{Registration, WidgetRegistry};
pub use routing::{EventRouter, ForwardingSession, RoutingError, RoutingState};
pub use task_manager::{TaskId, TaskManager};
