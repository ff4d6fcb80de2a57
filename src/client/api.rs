use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::controller::response::{Empty, Envelope, TaskOverview};
use crate::controller::routes::BASE_PATH;
use crate::model::{NewTask, Task};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("http call resulted in error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// HTTP client for the task API.
#[derive(Debug, Clone)]
pub struct TaskClient {
    base_url: String,
    http: reqwest::Client,
}

impl TaskClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn list_all(&self) -> Result<TaskOverview, ClientError> {
        self.call(Method::GET, "", None).await
    }

    pub async fn list_pending(&self) -> Result<Vec<Task>, ClientError> {
        self.call(Method::GET, "/pending", None).await
    }

    pub async fn list_completed(&self) -> Result<Vec<Task>, ClientError> {
        self.call(Method::GET, "/completed", None).await
    }

    pub async fn add(&self, new_task: &NewTask) -> Result<Task, ClientError> {
        let body = serde_json::to_value(new_task).map_err(|err| ClientError::Decode(err.to_string()))?;
        self.call(Method::POST, "", Some(body)).await
    }

    pub async fn complete(&self, id: &str) -> Result<Task, ClientError> {
        self.call(Method::PUT, &format!("/{}/complete", id), None).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let _: Empty = self.call(Method::DELETE, &format!("/{}", id), None).await?;
        Ok(())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}{}", self.base_url, BASE_PATH, path);
        debug!(%method, %url, "Calling task api.");
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        decode(request.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        let envelope: Envelope<T> =
            serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))?;
        return envelope
            .data
            .ok_or_else(|| ClientError::Decode("response carries no data".to_string()));
    }

    let message = match serde_json::from_slice::<Envelope<Value>>(&bytes) {
        Ok(envelope) => envelope.message,
        Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
