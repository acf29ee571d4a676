//! swarmdeck - A terminal user interface for swarm services
//!
//! This library provides a terminal-based interface for browsing the services
//! of a swarm and acting on them: removal, scaling, logs and inspection. Modal
//! prompts and viewers take over keyboard input while they are open, and hand
//! it back to the service list when they close.
//!
//! # Modules
//!
//! * [`backend`] - Service backend trait and the in-memory swarm
//! * [`config`] - Application configuration management
//! * [`constants`] - Prompt texts, user-visible messages and limits
//! * [`logger`] - File logging setup
//! * [`ui`] - Terminal user interface, input routing and interactions

/// Backend abstraction over the swarm manager
pub mod backend;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// Logging setup for debugging and error tracking
pub mod logger;

/// Terminal user interface components and rendering
pub mod ui;
