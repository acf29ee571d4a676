use super::actions::Action;
use super::messages::MessageLog;
use crate::backend::ServiceBackend;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type TaskId = u64;

#[derive(Debug)]
pub struct BackgroundTask {
    pub id: TaskId,
    pub handle: JoinHandle<()>,
    pub description: String,
    pub started_at: std::time::Instant,
}

/// Owns the background tasks spawned by a screen: modal interactions and data loads.
///
/// Results travel back to the app loop as [`Action`]s on the channel returned by
/// [`TaskManager::new`].
pub struct TaskManager {
    tasks: HashMap<TaskId, BackgroundTask>,
    next_task_id: TaskId,
    action_sender: mpsc::UnboundedSender<Action>,
}

impl TaskManager {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();

        (
            Self {
                tasks: HashMap::new(),
                next_task_id: 1,
                action_sender: tx,
            },
            rx,
        )
    }

    pub fn action_sender(&self) -> mpsc::UnboundedSender<Action> {
        self.action_sender.clone()
    }

    /// Spawn an arbitrary task, typically a modal interaction
    pub fn spawn<Fut>(&mut self, description: impl Into<String>, future: Fut) -> TaskId
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task_id = self.next_task_id;
        self.next_task_id += 1;
        let description = description.into();
        log::debug!("Tasks: spawning #{} ({})", task_id, description);

        let task = BackgroundTask {
            id: task_id,
            handle: tokio::spawn(future),
            description,
            started_at: std::time::Instant::now(),
        };

        self.tasks.insert(task_id, task);
        task_id
    }

    /// Spawn a background reload of the service list
    pub fn spawn_service_load(&mut self, backend: Arc<dyn ServiceBackend>, messages: MessageLog) -> TaskId {
        let action_sender = self.action_sender.clone();

        self.spawn("Loading services", async move {
            match backend.list_services().await {
                Ok(services) => {
                    let _ = action_sender.send(Action::ServicesLoaded(services));
                }
                Err(e) => {
                    messages.push(format!("There was an error refreshing the service list: {}", e));
                    let _ = action_sender.send(Action::Refresh);
                }
            }
        })
    }

    /// Spawn a background fetch of a service's tasks
    pub fn spawn_task_fetch(
        &mut self,
        backend: Arc<dyn ServiceBackend>,
        messages: MessageLog,
        service_id: String,
    ) -> TaskId {
        let action_sender = self.action_sender.clone();
        let description = format!("Loading tasks of service {}", service_id);

        self.spawn(description, async move {
            match backend.service_tasks(&service_id).await {
                Ok(tasks) => {
                    let _ = action_sender.send(Action::ServiceTasksLoaded { service_id, tasks });
                }
                Err(e) => {
                    messages.push(format!("There was an error loading the service tasks: {}", e));
                    let _ = action_sender.send(Action::Refresh);
                }
            }
        })
    }

    /// Forget tasks that have finished
    pub fn cleanup_finished_tasks(&mut self) {
        let finished: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|(_, task)| task.handle.is_finished())
            .map(|(id, _)| *id)
            .collect();

        for task_id in &finished {
            if let Some(task) = self.tasks.remove(task_id) {
                log::debug!(
                    "Tasks: #{} ({}) finished after {:?}",
                    task.id,
                    task.description,
                    task.started_at.elapsed()
                );
            }
        }
    }

    /// Wait for every task spawned so far to complete
    pub async fn join_all(&mut self) {
        let mut tasks: Vec<BackgroundTask> = self.tasks.drain().map(|(_, task)| task).collect();
        tasks.sort_by_key(|task| task.id);
        for task in tasks {
            if let Err(e) = task.handle.await {
                log::warn!("Tasks: #{} ({}) did not complete: {}", task.id, task.description, e);
            }
        }
    }

    /// Cancel all running tasks
    pub fn cancel_all_tasks(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.handle.abort();
        }
    }

    /// Get the number of active tasks
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        // Cancel all tasks when the manager is dropped
        self.cancel_all_tasks();
    }
}
