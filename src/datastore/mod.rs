mod query;
mod storage;

use std::sync::Arc;
use tracing::info;
use url::Url;

pub use query::{Filter, Sort};
pub use storage::{JsonFileStorage, MemoryTaskStorage, StorageError, TaskStorage};

pub type SharedStorage = Arc<dyn TaskStorage>;

/// Opens the task collection named by a connection string.
///
/// `memory://` keeps documents in-process; `file:///path/tasks.json` or a
/// bare filesystem path keeps them in a JSON document on disk.
pub fn open(url: &str) -> Result<SharedStorage, StorageError> {
    let url = url.trim();
    let storage: SharedStorage = match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "memory" => Arc::new(MemoryTaskStorage::new()),
        Ok(parsed) if parsed.scheme() == "file" => {
            let path = parsed
                .to_file_path()
                .map_err(|_| StorageError::UnsupportedUrl(url.to_string()))?;
            Arc::new(JsonFileStorage::open(path)?)
        }
        // a one-letter scheme is a windows drive letter, not a url
        Ok(parsed) if parsed.scheme().len() > 1 => {
            return Err(StorageError::UnsupportedUrl(url.to_string()))
        }
        _ if !url.is_empty() => Arc::new(JsonFileStorage::open(url)?),
        _ => return Err(StorageError::UnsupportedUrl(url.to_string())),
    };
    info!(url = %url, "Task storage opened.");
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory() {
        let storage = open("memory://").unwrap();
        assert!(storage.find(&Filter::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_file_url_and_path() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("tasktracker-open-{}.json", uuid::Uuid::new_v4()));

        let by_url = open(&format!("file://{}", path.display()));
        assert!(by_url.is_ok());
        let by_path = open(path.to_str().unwrap());
        assert!(by_path.is_ok());
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = open("mongodb://localhost:27017/tasks").err().unwrap();
        assert!(matches!(err, StorageError::UnsupportedUrl(_)));

        let err = open("  ").err().unwrap();
        assert!(matches!(err, StorageError::UnsupportedUrl(_)));
    }
}
