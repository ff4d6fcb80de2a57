use http::StatusCode;
use thiserror::Error;

use crate::datastore::StorageError;
use crate::model::ModelError;

// Errors surfaced by the task service, each mapped to one HTTP status.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("validation error: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),
    #[error("{0}")]
    Storage(String),
}

impl ControllerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ControllerError::Validation(_) | ControllerError::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ControllerError::NotFound(_) => StatusCode::NOT_FOUND,
            ControllerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ControllerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ModelError> for ControllerError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(messages) => ControllerError::Validation(messages),
        }
    }
}

impl From<StorageError> for ControllerError {
    fn from(err: StorageError) -> Self {
        ControllerError::Storage(err.to_string())
    }
}
