//! Task-ID is the store-assigned UUID identifying a task document

use serde_derive::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::str::FromStr;
use thiserror::*;
use uuid::Uuid;

/// Opaque identifier of a task, assigned once at creation.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// A fresh identifier. UUID v4 ids are never handed out twice, so a
    /// deleted task's id does not come back.
    pub fn generate() -> Self {
        TaskId(Uuid::new_v4())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for TaskId {
    fn from(c: Uuid) -> Self {
        TaskId(c)
    }
}

impl From<TaskId> for Uuid {
    fn from(c: TaskId) -> Self {
        c.0
    }
}

impl<'a> TryFrom<&'a str> for TaskId {
    type Error = InvalidTaskId;

    fn try_from(input: &'a str) -> Result<Self, Self::Error> {
        Uuid::parse_str(input)
            .map(TaskId)
            .map_err(|_| InvalidTaskId(input.to_string()))
    }
}

/// Parses a task id out of a path segment
///
/// # Examples
///
/// ```
/// # use tasktracker::model::TaskId;
/// let id: Result<TaskId, _> = "02497eac-edab-4d96-9f6c-a2c8c1766dee".parse();
/// assert!(id.is_ok());
/// assert!("not-an-id".parse::<TaskId>().is_err());
/// ```
impl FromStr for TaskId {
    type Err = InvalidTaskId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskId::try_from(s)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid task id {0}")]
pub struct InvalidTaskId(pub String);
