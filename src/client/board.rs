use std::fmt;

use super::api::{ClientError, TaskClient};
use crate::model::{NewTask, Task, TaskStatus};

/// Client-side view of the tracker.
///
/// Holds the full task list as last fetched. Every mutation is followed by a
/// full re-fetch; nothing is patched locally. The pending and completed views
/// are recomputed from the full list on each call.
pub struct TaskBoard {
    client: TaskClient,
    tasks: Vec<Task>,
    error: Option<String>,
    loading: bool,
}

impl TaskBoard {
    pub fn new(client: TaskClient) -> Self {
        Self {
            client,
            tasks: Vec::new(),
            error: None,
            loading: true,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn pending(&self) -> Vec<&Task> {
        self.with_status(TaskStatus::Pending)
    }

    pub fn completed(&self) -> Vec<&Task> {
        self.with_status(TaskStatus::Completed)
    }

    fn with_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True until the first full fetch has finished.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub async fn load(&mut self) {
        self.error = None;
        self.refresh().await;
        self.loading = false;
    }

    pub async fn add(&mut self, new_task: NewTask) {
        self.error = None;
        let result = self.client.add(&new_task).await.map(|_| ());
        self.after_mutation(result).await;
    }

    pub async fn complete(&mut self, id: &str) {
        self.error = None;
        let result = self.client.complete(id).await.map(|_| ());
        self.after_mutation(result).await;
    }

    pub async fn delete(&mut self, id: &str) {
        self.error = None;
        let result = self.client.delete(id).await;
        self.after_mutation(result).await;
    }

    async fn after_mutation(&mut self, result: Result<(), ClientError>) {
        match result {
            Ok(()) => self.refresh().await,
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    async fn refresh(&mut self) {
        match self.client.list_all().await {
            Ok(overview) => self.tasks = overview.all_tasks,
            Err(err) => self.error = Some(err.to_string()),
        }
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, empty: &str, tasks: &[&Task]) -> fmt::Result {
    writeln!(f, "{} ({})", title, tasks.len())?;
    if tasks.is_empty() {
        return writeln!(f, "  {}", empty);
    }
    for task in tasks {
        write!(f, "  [{}] {} ({} Priority)", task.id, task.title, task.priority)?;
        match task.completed_at {
            Some(at) => writeln!(f, " completed {}", at.format("%Y-%m-%d %H:%M"))?,
            None => writeln!(f, " created {}", task.created_at.format("%Y-%m-%d %H:%M"))?,
        }
        if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(f, "      {}", description)?;
        }
    }
    Ok(())
}

impl fmt::Display for TaskBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.error {
            writeln!(f, "! {}", error)?;
        }
        if self.loading {
            return writeln!(f, "Loading tasks...");
        }
        write_section(f, "Pending Tasks", "No pending tasks. Great job!", &self.pending())?;
        writeln!(f)?;
        write_section(f, "Completed Tasks", "No tasks completed yet.", &self.completed())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::{GET, POST, PUT};
    use httpmock::MockServer;
    use serde_json::{json, Value};
    use std::sync::Arc;

    use super::*;
    use crate::controller::{ServerConfig, TaskService};
    use crate::datastore::MemoryTaskStorage;

    const ID: &str = "b7b054ca-0d37-418b-ab16-ebe8aa409285";

    fn overview(tasks: Vec<Value>) -> Value {
        json!({
            "success": true,
            "message": "Tasks retrieved successfully",
            "data": {"allTasks": tasks, "pendingTasks": [], "completedTasks": []}
        })
    }

    #[tokio::test]
    async fn test_loading_only_gates_first_fetch() {
        // GIVEN
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/tasks");
            then.status(200).json_body(overview(vec![]));
        });
        let mut board = TaskBoard::new(TaskClient::new(&server.base_url()));
        assert!(board.is_loading());
        assert_eq!(board.to_string(), "Loading tasks...\n");

        // WHEN
        board.load().await;

        // THEN
        assert!(!board.is_loading());
        assert!(board.error().is_none());
        assert!(board.to_string().contains("No pending tasks. Great job!"));
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_list_and_sets_error() {
        // GIVEN
        let server = MockServer::start();
        let list = server.mock(|when, then| {
            when.method(GET).path("/api/tasks");
            then.status(200).json_body(overview(vec![json!({
                "_id": ID,
                "title": "a",
                "priority": "Medium",
                "status": "pending",
                "createdAt": "2024-01-01T09:00:00Z"
            })]));
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/tasks");
            then.status(400).json_body(json!({
                "success": false,
                "message": "Validation Error",
                "errors": ["Please add a task title"]
            }));
        });
        server.mock(|when, then| {
            when.method(PUT).path(format!("/api/tasks/{}/complete", ID));
            then.status(500)
                .json_body(json!({"success": false, "message": "Server Error", "error": "db down"}));
        });
        let mut board = TaskBoard::new(TaskClient::new(&server.base_url()));
        board.load().await;

        // WHEN
        board.add(NewTask::new("", None, None)).await;

        // THEN no refetch happened and the banner holds the server text
        list.assert_hits(1);
        assert_eq!(board.tasks().len(), 1);
        assert_eq!(board.error(), Some("Validation Error"));
        assert!(board.to_string().starts_with("! Validation Error\n"));

        // WHEN another action starts, the old error is cleared first
        board.complete(ID).await;
        assert_eq!(board.error(), Some("Server Error"));

        board.dismiss_error();
        assert!(board.error().is_none());
    }

    #[tokio::test]
    async fn test_against_running_server() {
        // GIVEN
        let cfg = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        };
        let service = TaskService::new(Arc::new(MemoryTaskStorage::new()));
        let (addr, serving) = crate::controller::api::Server::new(cfg, service)
            .bind()
            .unwrap();
        tokio::spawn(serving);
        let mut board = TaskBoard::new(TaskClient::new(&format!("http://{}", addr)));
        board.load().await;
        assert!(board.tasks().is_empty());

        // WHEN
        board.add(NewTask::new("Buy milk", Some("2%"), None)).await;
        board.add(NewTask::new("Walk dog", None, None)).await;

        // THEN
        assert!(board.error().is_none());
        assert_eq!(board.pending().len(), 2);
        assert!(board.completed().is_empty());

        // WHEN
        let id = board
            .pending()
            .iter()
            .find(|t| t.title == "Buy milk")
            .map(|t| t.id.to_string())
            .unwrap();
        board.complete(&id).await;

        // THEN
        assert_eq!(board.pending().len(), 1);
        assert_eq!(board.completed()[0].title, "Buy milk");
        assert!(board.to_string().contains("Completed Tasks (1)"));

        // WHEN
        board.delete(&id).await;
        board.delete(&id).await;

        // THEN
        assert_eq!(board.tasks().len(), 1);
        assert_eq!(board.error(), Some("Task not found"));
    }
}
