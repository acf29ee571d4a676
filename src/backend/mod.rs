//! Backend abstraction layer for swarm service management.
//!
//! This module defines the interface the UI uses to talk to a swarm manager,
//! along with the service data types and error handling shared by all backends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub mod memory;

pub use memory::MemoryBackend;

/// Common error types for backend operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("No such service: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Swarm manager unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}

/// Live stream of log lines for a service. The stream ends when the sender is dropped.
pub type LogStream = mpsc::Receiver<String>;

/// Scheduling mode of a service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    Replicated,
    Global,
}

/// A swarm service as shown in the service list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub image: String,
    pub mode: ServiceMode,
    /// Desired number of replicas
    pub replicas: u64,
    /// Number of tasks currently running
    pub running: u64,
}

/// A task (container slot) belonging to a service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTask {
    pub id: String,
    pub service_id: String,
    pub node: String,
    pub state: String,
    pub desired_state: String,
}

/// Backend trait that all swarm managers must implement.
///
/// Errors are opaque to the UI: their `Display` output is shown to the user as-is.
#[async_trait]
pub trait ServiceBackend: Send + Sync {
    /// Returns the backend type identifier (e.g., "memory").
    fn backend_type(&self) -> &str;

    async fn list_services(&self) -> Result<Vec<Service>, BackendError>;
    async fn remove_service(&self, service_id: &str) -> Result<(), BackendError>;
    async fn scale_service(&self, service_id: &str, replicas: u64) -> Result<(), BackendError>;

    /// Open a log stream for the service. `since` is passed through untouched;
    /// an empty string means "from the beginning".
    async fn service_logs(&self, service_id: &str, since: &str) -> Result<LogStream, BackendError>;

    async fn inspect_service(&self, service_id: &str) -> Result<serde_json::Value, BackendError>;
    async fn service_tasks(&self, service_id: &str) -> Result<Vec<ServiceTask>, BackendError>;
}
