use parking_lot::Mutex;
use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::super::TaskStorage;
use super::error::StorageError;
use crate::datastore::Filter;
use crate::model::{Task, TaskId};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoredTasks {
    schema_version: u32,
    tasks: Vec<Task>,
}

/// Collection persisted as a single JSON document on disk.
///
/// Every call reads the file, and every mutation rewrites it before
/// returning, so the file is always the source of truth. File access runs
/// on the blocking pool; the mutex serializes read-modify-write cycles
/// within the process.
pub struct JsonFileStorage {
    document: Arc<Document>,
}

struct Document {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let document = Document {
            path: path.as_ref().to_owned(),
            lock: Mutex::new(()),
        };
        // fail fast on an unreadable collection
        document.load()?;
        Ok(Self {
            document: Arc::new(document),
        })
    }

    /// Runs `op` on the blocking pool while holding the document lock.
    async fn locked<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Document) -> Result<T, StorageError> + Send + 'static,
    {
        let document = self.document.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = document.lock.lock();
            op(&document)
        })
        .await
        .map_err(|err| StorageError::Io(err.to_string()))?
    }
}

impl Document {
    fn load(&self) -> Result<Vec<Task>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let stored: StoredTasks = serde_json::from_str(&content)
            .map_err(|err| StorageError::Corrupt(err.to_string()))?;
        if stored.schema_version != SCHEMA_VERSION {
            return Err(StorageError::Corrupt(format!(
                "schema_version {} is not supported",
                stored.schema_version
            )));
        }
        Ok(stored.tasks)
    }

    fn save(&self, tasks: Vec<Task>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredTasks {
            schema_version: SCHEMA_VERSION,
            tasks,
        };
        let content = serde_json::to_string_pretty(&stored)
            .map_err(|err| StorageError::Corrupt(err.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TaskStorage for JsonFileStorage {
    async fn insert(&self, item: Task) -> Result<TaskId, StorageError> {
        self.locked(move |doc| {
            let mut tasks = doc.load()?;
            if tasks.iter().any(|task| task.id == item.id) {
                return Err(StorageError::Conflict(item.id));
            }
            let id = item.id;
            tasks.push(item);
            doc.save(tasks)?;
            Ok(id)
        })
        .await
    }

    async fn fetch(&self, id: &TaskId) -> Result<Option<Task>, StorageError> {
        let id = *id;
        self.locked(move |doc| Ok(doc.load()?.into_iter().find(|task| task.id == id)))
            .await
    }

    async fn replace(&self, item: Task) -> Result<Option<Task>, StorageError> {
        self.locked(move |doc| {
            let mut tasks = doc.load()?;
            let replaced = match tasks.iter_mut().find(|task| task.id == item.id) {
                Some(task) => {
                    *task = item.clone();
                    Some(item)
                }
                None => None,
            };
            if replaced.is_some() {
                doc.save(tasks)?;
            }
            Ok(replaced)
        })
        .await
    }

    async fn remove(&self, id: &TaskId) -> Result<Option<Task>, StorageError> {
        let id = *id;
        self.locked(move |doc| {
            let mut tasks = doc.load()?;
            let removed = tasks
                .iter()
                .position(|task| task.id == id)
                .map(|idx| tasks.remove(idx));
            if removed.is_some() {
                doc.save(tasks)?;
            }
            Ok(removed)
        })
        .await
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Task>, StorageError> {
        let filter = filter.clone();
        self.locked(move |doc| Ok(filter.apply(doc.load()?.iter())))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTask, TaskStatus};
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tasktracker-{nanos}-{file_name}"))
    }

    fn task(title: &str) -> Task {
        Task::new(NewTask::new(title, None, None).validate().unwrap())
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let path = temp_path("missing.json");
        let storage = JsonFileStorage::open(&path).unwrap();
        assert!(storage.find(&Filter::all()).await.unwrap().is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_mutations_survive_reopen() {
        // GIVEN
        let path = temp_path("nested/tasks.json");
        let storage = JsonFileStorage::open(&path).unwrap();
        let mut kept = task("kept");
        let dropped = task("dropped");

        // WHEN
        storage.insert(kept.clone()).await.unwrap();
        storage.insert(dropped.clone()).await.unwrap();
        kept.complete();
        storage.replace(kept.clone()).await.unwrap();
        storage.remove(&dropped.id).await.unwrap();

        // THEN
        let reopened = JsonFileStorage::open(&path).unwrap();
        let items = reopened.find(&Filter::all()).await.unwrap();
        fs::remove_dir_all(path.parent().unwrap()).ok();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0], kept);
        assert_eq!(items[0].status, TaskStatus::Completed);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_concurrent_inserts_all_land() {
        // GIVEN
        let path = temp_path("concurrent.json");
        let storage = Arc::new(JsonFileStorage::open(&path).unwrap());

        // WHEN
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move { storage.insert(task(&format!("t{i}"))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // THEN
        let items = storage.find(&Filter::all()).await.unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(items.len(), 8);
    }

    #[tokio::test]
    async fn test_unknown_ids_leave_file_untouched() {
        let path = temp_path("untouched.json");
        let storage = JsonFileStorage::open(&path).unwrap();
        let ghost = task("ghost");

        assert!(storage.replace(ghost.clone()).await.unwrap().is_none());
        assert!(storage.remove(&ghost.id).await.unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_schema_version_must_match() {
        let path = temp_path("bad-schema.json");
        let bad = format!(
            "{{\n  \"schema_version\": {},\n  \"tasks\": []\n}}",
            SCHEMA_VERSION + 1
        );
        fs::write(&path, bad).unwrap();

        let err = JsonFileStorage::open(&path).err().unwrap();
        fs::remove_file(&path).ok();

        assert!(matches!(err, StorageError::Corrupt(_)));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let path = temp_path("garbage.json");
        fs::write(&path, "not json").unwrap();

        let err = JsonFileStorage::open(&path).err().unwrap();
        fs::remove_file(&path).ok();

        assert!(matches!(err, StorageError::Corrupt(_)));
    }
}
