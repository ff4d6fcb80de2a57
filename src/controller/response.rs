use serde_derive::{Deserialize, Serialize};

use super::ControllerError;
use crate::model::Task;

/// Body wrapper shared by every JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Empty `data` payload of a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Payload of the list-all call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOverview {
    pub all_tasks: Vec<Task>,
    pub pending_tasks: Vec<Task>,
    pub completed_tasks: Vec<Task>,
}

impl<T> Envelope<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
            errors: None,
            error: None,
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            data: None,
            errors: None,
            error: None,
        }
    }
}

impl From<&ControllerError> for Envelope<()> {
    fn from(err: &ControllerError) -> Self {
        match err {
            ControllerError::Validation(messages) => Self {
                errors: Some(messages.clone()),
                ..Self::failure("Validation Error")
            },
            ControllerError::MalformedBody(reason) => Self {
                errors: Some(vec![reason.clone()]),
                ..Self::failure("Validation Error")
            },
            ControllerError::NotFound(_) => Self::failure("Task not found"),
            ControllerError::PayloadTooLarge(_) => Self::failure("Payload Too Large"),
            ControllerError::Storage(reason) => Self {
                error: Some(reason.clone()),
                ..Self::failure("Server Error")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_envelope() {
        let err = ControllerError::Validation(vec!["Please add a task title".into()]);
        let v = serde_json::to_value(Envelope::from(&err)).unwrap();
        assert_eq!(
            v,
            json!({
                "success": false,
                "message": "Validation Error",
                "errors": ["Please add a task title"]
            })
        );
    }

    #[test]
    fn test_server_error_carries_reason() {
        let err = ControllerError::Storage("disk full".into());
        let v = serde_json::to_value(Envelope::from(&err)).unwrap();
        assert_eq!(
            v,
            json!({"success": false, "message": "Server Error", "error": "disk full"})
        );
    }

    #[test]
    fn test_delete_payload_is_empty_object() {
        let v = serde_json::to_value(Envelope::ok("Task deleted successfully", Empty {})).unwrap();
        assert_eq!(v["data"], json!({}));
    }

    #[test]
    fn test_failure_without_data_decodes() {
        // GIVEN a failure body for a call that normally carries tasks
        let body = json!({
            "success": false,
            "message": "Validation Error",
            "errors": ["Please add a task title"]
        });

        // WHEN
        let env: Envelope<Vec<Task>> = serde_json::from_value(body).unwrap();

        // THEN
        assert!(env.data.is_none());
        assert_eq!(env.message, "Validation Error");
        assert_eq!(env.errors, Some(vec!["Please add a task title".to_string()]));
    }
}
