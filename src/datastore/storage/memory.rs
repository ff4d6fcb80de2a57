use parking_lot::RwLock;

use super::super::TaskStorage;
use super::error::StorageError;
use crate::datastore::Filter;
use crate::model::{Task, TaskId};

/// Process-local collection, documents kept in insertion order.
pub struct MemoryTaskStorage {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryTaskStorage {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryTaskStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TaskStorage for MemoryTaskStorage {
    async fn insert(&self, item: Task) -> Result<TaskId, StorageError> {
        let mut tasks = self.tasks.write();
        if tasks.iter().any(|task| task.id == item.id) {
            return Err(StorageError::Conflict(item.id));
        }
        let id = item.id;
        tasks.push(item);
        Ok(id)
    }

    async fn fetch(&self, id: &TaskId) -> Result<Option<Task>, StorageError> {
        let tasks = self.tasks.read();
        Ok(tasks.iter().find(|task| task.id == *id).cloned())
    }

    async fn replace(&self, item: Task) -> Result<Option<Task>, StorageError> {
        let mut tasks = self.tasks.write();
        match tasks.iter_mut().find(|task| task.id == item.id) {
            Some(task) => {
                *task = item;
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: &TaskId) -> Result<Option<Task>, StorageError> {
        let mut tasks = self.tasks.write();
        Ok(tasks
            .iter()
            .position(|task| task.id == *id)
            .map(|idx| tasks.remove(idx)))
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Task>, StorageError> {
        let tasks = self.tasks.read();
        Ok(filter.apply(tasks.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTask, TaskStatus};

    fn task(title: &str) -> Task {
        Task::new(NewTask::new(title, None, None).validate().unwrap())
    }

    #[tokio::test]
    async fn test_insert() {
        // GIVEN
        let storage = MemoryTaskStorage::new();
        let task_a = task("task_a");

        // WHEN
        let res = storage.insert(task_a.clone()).await;

        // THEN
        assert_eq!(res.unwrap(), task_a.id, "Task storage failed.");
        let res = storage.insert(task_a.clone()).await.unwrap_err();
        assert!(matches!(res, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_replace_and_remove() {
        // GIVEN
        let storage = MemoryTaskStorage::new();
        let mut task_a = task("task_a");
        let task_b = task("task_b");
        storage.insert(task_a.clone()).await.unwrap();
        storage.insert(task_b.clone()).await.unwrap();

        // WHEN
        task_a.complete();
        let replaced = storage.replace(task_a.clone()).await.unwrap();

        // THEN
        assert_eq!(replaced, Some(task_a.clone()));
        let fetched = storage.fetch(&task_a.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, TaskStatus::Completed);

        // WHEN
        let removed = storage.remove(&task_a.id).await.unwrap();

        // THEN
        assert_eq!(removed.map(|t| t.id), Some(task_a.id));
        assert!(storage.fetch(&task_a.id).await.unwrap().is_none());
        assert!(storage.remove(&task_a.id).await.unwrap().is_none());
        assert!(storage.replace(task_a).await.unwrap().is_none());

        let items = storage.find(&Filter::all()).await.unwrap();
        assert_eq!(1, items.len());
        assert_eq!(task_b.id, items[0].id, "Items do not match stored ones.");
    }

    #[tokio::test]
    async fn test_find_by_status() {
        // GIVEN
        let storage = MemoryTaskStorage::new();
        let mut done = task("done");
        done.complete();
        storage.insert(task("open")).await.unwrap();
        storage.insert(done).await.unwrap();

        // WHEN
        let pending = storage.find(&Filter::pending()).await.unwrap();
        let completed = storage.find(&Filter::completed()).await.unwrap();

        // THEN
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "open");
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].title, "done");
    }
}
