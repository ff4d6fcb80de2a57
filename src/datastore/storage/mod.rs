mod error;
mod file;
mod memory;

use crate::datastore::Filter;
use crate::model::{Task, TaskId};
pub use error::StorageError;
pub use file::JsonFileStorage;
pub use memory::MemoryTaskStorage;

/// Document collection holding task records. Each call touches at most one
/// document and is atomic for that document.
#[async_trait::async_trait]
pub trait TaskStorage: Sync + Send + 'static {
    async fn insert(&self, item: Task) -> Result<TaskId, StorageError>;
    async fn fetch(&self, id: &TaskId) -> Result<Option<Task>, StorageError>;
    /// Overwrites the stored document, `None` when no document has that id.
    async fn replace(&self, item: Task) -> Result<Option<Task>, StorageError>;
    async fn remove(&self, id: &TaskId) -> Result<Option<Task>, StorageError>;
    async fn find(&self, filter: &Filter) -> Result<Vec<Task>, StorageError>;
}
