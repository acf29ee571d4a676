//! UI module for swarmdeck
//!
//! This module handles the screens, overlay components, input routing and the
//! terminal dispatch loop.

pub mod app;
pub mod components;
pub mod core;
pub mod layout;
pub mod renderer;
pub mod services;

pub use app::{App, Screen};
pub use layout::LayoutManager;
pub use renderer::run_app;
pub use services::ServicesEventHandler;
