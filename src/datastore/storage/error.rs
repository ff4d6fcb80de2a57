use thiserror::*;

use crate::model::TaskId;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("the item exists {0}")]
    Conflict(TaskId),

    #[error("storage io error: {0}")]
    Io(String),

    #[error("storage content is corrupt: {0}")]
    Corrupt(String),

    #[error("unsupported storage url '{0}'")]
    UnsupportedUrl(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}
