use thiserror::Error;

// Task model errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
}
