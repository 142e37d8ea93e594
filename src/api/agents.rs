//! Agent endpoints

use super::client::ApiClient;
use crate::error::ClientError;
use crate::state::Agent;

/// `/agents` call bundle
#[derive(Debug, Clone, Copy)]
pub struct AgentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AgentsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// GET /agents - List all agents
    pub async fn list(&self) -> Result<Vec<Agent>, ClientError> {
        self.client.get(&["agents"]).await
    }

    /// GET /agents/:name - Get one agent
    pub async fn get(&self, name: &str) -> Result<Agent, ClientError> {
        self.client.get(&["agents", name]).await
    }

    /// GET /agents/capable/:taskType - Agents able to run a task type
    pub async fn capable_of(&self, task_type: &str) -> Result<Vec<Agent>, ClientError> {
        self.client.get(&["agents", "capable", task_type]).await
    }

    /// POST /agents/reload - Ask the backend to rescan its plugins
    ///
    /// The backend answers with a plain-text confirmation.
    pub async fn reload(&self) -> Result<String, ClientError> {
        let url = self.client.endpoint(&["agents", "reload"])?;
        self.client
            .execute(self.client.request(reqwest::Method::POST, url))
            .await
    }
}
