use chrono::{DateTime, Utc};
use serde::Deserializer;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::error::ModelError;
use super::TaskId;

pub const TITLE_REQUIRED: &str = "Please add a task title";
pub const PRIORITY_REQUIRED: &str = "Please set a priority (High, Medium, Low)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        })
    }
}

impl FromStr for Priority {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Priority::High),
            "Medium" => Ok(Priority::Medium),
            "Low" => Ok(Priority::Low),
            other => Err(ModelError::Validation(vec![invalid_priority(other)])),
        }
    }
}

fn invalid_priority(value: &str) -> String {
    format!("`{}` is not a valid enum value for path `priority`.", value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Completed,
}

impl Default for Status {
    fn default() -> Self {
        Status::Pending
    }
}

/// Task is the only document the tracker stores.
///
/// `completed_at` is set if and only if `status` is `Completed`; the only
/// mutation after creation is [`Task::complete`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", alias = "id")]
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(draft: TaskDraft) -> Task {
        Self {
            id: TaskId::generate(),
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            status: Status::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    /// Marks the task completed now. Completing twice re-stamps the time.
    pub fn complete(&mut self) {
        self.complete_at(Utc::now())
    }

    pub fn complete_at(&mut self, at: DateTime<Utc>) {
        self.status = Status::Completed;
        self.completed_at = Some(at);
    }
}

/// Create payload as it arrives on the wire. Unknown fields, `status`
/// included, are dropped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NewTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    /// Absent means default; an explicit `null` is kept as `Some(Null)`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    <Value as serde::Deserialize>::deserialize(deserializer).map(Some)
}

/// A create payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
}

impl NewTask {
    pub fn new(title: &str, description: Option<&str>, priority: Option<Priority>) -> Self {
        Self {
            title: Some(Value::from(title)),
            description: description.map(Value::from),
            priority: priority.map(|p| Value::from(p.to_string())),
        }
    }

    /// Checks every field and reports all failures at once, in field order.
    pub fn validate(&self) -> Result<TaskDraft, ModelError> {
        let mut errors = vec![];

        let title = self
            .title
            .as_ref()
            .and_then(scalar_text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if title.is_none() {
            errors.push(TITLE_REQUIRED.to_string());
        }

        let priority = match &self.priority {
            None => Priority::default(),
            Some(value) => match scalar_text(value).filter(|p| !p.is_empty()) {
                None => {
                    errors.push(PRIORITY_REQUIRED.to_string());
                    Priority::default()
                }
                Some(p) => match p.parse::<Priority>() {
                    Ok(p) => p,
                    Err(ModelError::Validation(mut messages)) => {
                        errors.append(&mut messages);
                        Priority::default()
                    }
                },
            },
        };

        match title {
            Some(title) if errors.is_empty() => Ok(TaskDraft {
                title,
                description: self.description.as_ref().and_then(scalar_text),
                priority,
            }),
            _ => Err(ModelError::Validation(errors)),
        }
    }
}

// Scalars are cast to text the way the document schema casts them; null and
// structured values count as absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
