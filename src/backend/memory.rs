//! In-memory swarm backend.
//!
//! Keeps services, tasks and log lines in process memory. Used by the binary's
//! demo mode and by the test-suite, which relies on the recorded call list and
//! on per-operation failure injection.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

use super::{BackendError, LogStream, Service, ServiceBackend, ServiceMode, ServiceTask};

/// Operations that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    List,
    Remove,
    Scale,
    Logs,
    Inspect,
    Tasks,
}

/// A call received by the backend, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    List,
    Remove(String),
    Scale(String, u64),
    Logs { service_id: String, since: String },
    Inspect(String),
    Tasks(String),
}

#[derive(Default)]
struct MemoryState {
    services: Vec<Service>,
    logs: HashMap<String, Vec<String>>,
    failures: HashMap<BackendOp, BackendError>,
    calls: Vec<BackendCall>,
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_services(services: Vec<Service>) -> Self {
        let backend = Self::new();
        backend.lock().services = services;
        backend
    }

    /// A small swarm used when no real manager is configured.
    pub fn demo() -> Self {
        let service = |id: &str, name: &str, image: &str, replicas: u64| Service {
            id: id.to_string(),
            name: name.to_string(),
            image: image.to_string(),
            mode: ServiceMode::Replicated,
            replicas,
            running: replicas,
        };
        let backend = Self::with_services(vec![
            service("k3l9x2", "web", "nginx:1.27", 3),
            service("p0a7qe", "api", "example/api:2.4.1", 2),
            service("z8m1c4", "worker", "example/worker:2.4.1", 4),
            Service {
                id: "g5t2hn".to_string(),
                name: "node-exporter".to_string(),
                image: "prom/node-exporter:v1.8".to_string(),
                mode: ServiceMode::Global,
                replicas: 0,
                running: 3,
            },
        ]);
        backend.set_logs(
            "k3l9x2",
            vec![
                "2024-05-02T10:00:01Z web.1 | GET / 200".to_string(),
                "2024-05-02T10:00:03Z web.2 | GET /health 200".to_string(),
                "2024-05-02T10:00:07Z web.3 | GET /static/app.js 304".to_string(),
            ],
        );
        backend
    }

    pub fn set_logs(&self, service_id: &str, lines: Vec<String>) {
        self.lock().logs.insert(service_id.to_string(), lines);
    }

    /// Make every subsequent call of `op` fail with `error`.
    pub fn fail(&self, op: BackendOp, error: BackendError) {
        self.lock().failures.insert(op, error);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    pub fn services(&self) -> Vec<Service> {
        self.lock().services.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and return the injected failure for `op`, if any.
    fn enter(&self, op: BackendOp, call: BackendCall) -> Result<MutexGuard<'_, MemoryState>, BackendError> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.failures.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(state),
        }
    }
}

fn find<'a>(services: &'a mut [Service], service_id: &str) -> Result<&'a mut Service, BackendError> {
    services
        .iter_mut()
        .find(|s| s.id == service_id)
        .ok_or_else(|| BackendError::NotFound(service_id.to_string()))
}

#[async_trait]
impl ServiceBackend for MemoryBackend {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn list_services(&self) -> Result<Vec<Service>, BackendError> {
        let state = self.enter(BackendOp::List, BackendCall::List)?;
        Ok(state.services.clone())
    }

    async fn remove_service(&self, service_id: &str) -> Result<(), BackendError> {
        let mut state = self.enter(BackendOp::Remove, BackendCall::Remove(service_id.to_string()))?;
        find(&mut state.services, service_id)?;
        state.services.retain(|s| s.id != service_id);
        state.logs.remove(service_id);
        Ok(())
    }

    async fn scale_service(&self, service_id: &str, replicas: u64) -> Result<(), BackendError> {
        let mut state = self.enter(
            BackendOp::Scale,
            BackendCall::Scale(service_id.to_string(), replicas),
        )?;
        let service = find(&mut state.services, service_id)?;
        if service.mode == ServiceMode::Global {
            return Err(BackendError::InvalidArgument(format!(
                "service {} is a global service and cannot be scaled",
                service.name
            )));
        }
        service.replicas = replicas;
        service.running = replicas;
        Ok(())
    }

    async fn service_logs(&self, service_id: &str, since: &str) -> Result<LogStream, BackendError> {
        let mut state = self.enter(
            BackendOp::Logs,
            BackendCall::Logs {
                service_id: service_id.to_string(),
                since: since.to_string(),
            },
        )?;
        find(&mut state.services, service_id)?;
        let lines = state.logs.get(service_id).cloned().unwrap_or_default();
        drop(state);

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            for line in lines {
                if tx.send(line).await.is_err() {
                    return;
                }
            }
            // Behave like a followed stream: stay open until the reader goes away.
            tx.closed().await;
        });
        Ok(rx)
    }

    async fn inspect_service(&self, service_id: &str) -> Result<serde_json::Value, BackendError> {
        let mut state = self.enter(BackendOp::Inspect, BackendCall::Inspect(service_id.to_string()))?;
        let service = find(&mut state.services, service_id)?;
        serde_json::to_value(&*service).map_err(|e| BackendError::Other(e.to_string()))
    }

    async fn service_tasks(&self, service_id: &str) -> Result<Vec<ServiceTask>, BackendError> {
        let mut state = self.enter(BackendOp::Tasks, BackendCall::Tasks(service_id.to_string()))?;
        let service = find(&mut state.services, service_id)?;
        Ok((1..=service.running)
            .map(|slot| ServiceTask {
                id: format!("{}.{}", service.id, slot),
                service_id: service.id.clone(),
                node: format!("node-{}", (slot - 1) % 3 + 1),
                state: "running".to_string(),
                desired_state: "running".to_string(),
            })
            .collect())
    }
}
