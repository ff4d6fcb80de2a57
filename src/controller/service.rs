use tracing::{info, instrument};

use super::response::TaskOverview;
use super::ControllerError;
use crate::datastore::{Filter, SharedStorage};
use crate::model::{NewTask, Task, TaskId, TaskStatus};

/// The six task operations. Holds nothing but the store handle, so every
/// call is independent of the ones before it.
#[derive(Clone)]
pub struct TaskService {
    storage: SharedStorage,
}

impl TaskService {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<TaskOverview, ControllerError> {
        let all_tasks = self.storage.find(&Filter::all()).await?;
        let (completed_tasks, pending_tasks): (Vec<Task>, Vec<Task>) = all_tasks
            .iter()
            .cloned()
            .partition(|task| task.status == TaskStatus::Completed);
        Ok(TaskOverview {
            all_tasks,
            pending_tasks,
            completed_tasks,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_pending(&self) -> Result<Vec<Task>, ControllerError> {
        Ok(self.storage.find(&Filter::pending()).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_completed(&self) -> Result<Vec<Task>, ControllerError> {
        Ok(self.storage.find(&Filter::completed()).await?)
    }

    #[instrument(skip(self, new_task))]
    pub async fn add(&self, new_task: NewTask) -> Result<Task, ControllerError> {
        let task = Task::new(new_task.validate()?);
        self.storage.insert(task.clone()).await?;
        info!(id = %task.id, title = %task.title, "Task added.");
        Ok(task)
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, id: &str) -> Result<Task, ControllerError> {
        let id = parse_id(id)?;
        let mut task = self
            .storage
            .fetch(&id)
            .await?
            .ok_or_else(|| ControllerError::NotFound(id.to_string()))?;
        task.complete();
        // a delete racing in between leaves nothing to replace
        let task = self
            .storage
            .replace(task)
            .await?
            .ok_or_else(|| ControllerError::NotFound(id.to_string()))?;
        info!(id = %task.id, "Task completed.");
        Ok(task)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ControllerError> {
        let id = parse_id(id)?;
        let task = self
            .storage
            .remove(&id)
            .await?
            .ok_or_else(|| ControllerError::NotFound(id.to_string()))?;
        info!(id = %task.id, title = %task.title, "Task deleted.");
        Ok(())
    }
}

// No task can carry an id that does not parse.
fn parse_id(id: &str) -> Result<TaskId, ControllerError> {
    id.parse::<TaskId>()
        .map_err(|_| ControllerError::NotFound(id.to_string()))
}
