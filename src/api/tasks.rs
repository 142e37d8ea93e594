//! Task endpoints

use super::client::ApiClient;
use crate::error::ClientError;
use crate::state::{Task, TaskMetrics, TaskRequest};

/// `/tasks` call bundle
#[derive(Debug, Clone, Copy)]
pub struct TasksApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TasksApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// POST /tasks - Submit a task for processing
    pub async fn submit(&self, request: &TaskRequest) -> Result<Task, ClientError> {
        self.client.post(&["tasks"], request).await
    }

    /// POST /tasks/batch - Submit several tasks at once
    pub async fn submit_batch(
        &self,
        requests: &[TaskRequest],
        user_id: Option<&str>,
    ) -> Result<Vec<Task>, ClientError> {
        let body = serde_json::json!({ "tasks": requests, "userId": user_id });
        self.client.post(&["tasks", "batch"], &body).await
    }

    /// GET /tasks/metrics - Task processing metrics
    pub async fn metrics(&self) -> Result<TaskMetrics, ClientError> {
        self.client.get(&["tasks", "metrics"]).await
    }
}
