//! Context publish/subscribe passthroughs
//!
//! Server-side mirror of the store's agent contexts and shared data. These
//! calls do not touch the local store. Writes are acknowledged with a short
//! plain-text line, which is returned as-is.

use super::client::ApiClient;
use crate::error::ClientError;
use crate::state::{AgentId, CollaborativeWorkflow, ContextUpdate, DataShape, WorkflowStatus};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Body of POST /context/workflows
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowRequest<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    participating_agents: &'a [AgentId],
    data_flow: Map<String, Value>,
}

impl<'a> From<&'a CollaborativeWorkflow> for WorkflowRequest<'a> {
    fn from(workflow: &'a CollaborativeWorkflow) -> Self {
        // Steps are keyed by position; the backend stores an object
        let data_flow = workflow
            .data_flow
            .iter()
            .enumerate()
            .map(|(step, value)| (step.to_string(), value.clone()))
            .collect();
        Self {
            id: &workflow.id,
            name: &workflow.name,
            description: &workflow.description,
            participating_agents: &workflow.agents,
            data_flow,
        }
    }
}

/// `/context` call bundle
#[derive(Debug, Clone, Copy)]
pub struct ContextApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ContextApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// POST /context/agent/:id/context
    pub async fn set_agent_context(
        &self,
        agent_id: &str,
        context: &ContextUpdate,
    ) -> Result<String, ClientError> {
        self.client
            .send_json_text(
                Method::POST,
                &["context", "agent", agent_id, "context"],
                context,
            )
            .await
    }

    /// GET /context/agent/:id/context
    pub async fn agent_context(&self, agent_id: &str) -> Result<Value, ClientError> {
        self.client
            .get(&["context", "agent", agent_id, "context"])
            .await
    }

    /// GET /context/agent/:id/context/:key
    pub async fn agent_context_value(&self, agent_id: &str, key: &str) -> Result<Value, ClientError> {
        self.client
            .get(&["context", "agent", agent_id, "context", key])
            .await
    }

    /// DELETE /context/agent/:id/context
    pub async fn clear_agent_context(&self, agent_id: &str) -> Result<String, ClientError> {
        self.client
            .delete_text(&["context", "agent", agent_id, "context"])
            .await
    }

    /// POST /context/shared-data/:key
    pub async fn set_shared_data(
        &self,
        key: &str,
        data: &Value,
        source_agent: &str,
        metadata: &Map<String, Value>,
    ) -> Result<String, ClientError> {
        let body = json!({ "data": data, "sourceAgent": source_agent, "metadata": metadata });
        self.client
            .send_json_text(Method::POST, &["context", "shared-data", key], &body)
            .await
    }

    /// GET /context/shared-data/:key
    pub async fn shared_data(&self, key: &str) -> Result<Value, ClientError> {
        self.client.get(&["context", "shared-data", key]).await
    }

    /// GET /context/shared-data
    pub async fn all_shared_data(&self) -> Result<Value, ClientError> {
        self.client.get(&["context", "shared-data"]).await
    }

    /// DELETE /context/shared-data/:key
    pub async fn clear_shared_data(&self, key: &str) -> Result<String, ClientError> {
        self.client
            .delete_text(&["context", "shared-data", key])
            .await
    }

    /// POST /context/subscribe
    pub async fn subscribe(&self, subscriber: &str, context_key: &str) -> Result<String, ClientError> {
        let body = json!({ "subscriberAgent": subscriber, "contextKey": context_key });
        self.client
            .send_json_text(Method::POST, &["context", "subscribe"], &body)
            .await
    }

    /// DELETE /context/subscribe (with a JSON body)
    pub async fn unsubscribe(
        &self,
        subscriber: &str,
        context_key: &str,
    ) -> Result<String, ClientError> {
        let body = json!({ "subscriberAgent": subscriber, "contextKey": context_key });
        self.client
            .send_json_text(Method::DELETE, &["context", "subscribe"], &body)
            .await
    }

    /// GET /context/subscribers/:key
    pub async fn subscribers(&self, context_key: &str) -> Result<Value, ClientError> {
        self.client
            .get(&["context", "subscribers", context_key])
            .await
    }

    /// POST /context/workflows
    ///
    /// Registers a workflow created by the store under the same id.
    pub async fn create_workflow(
        &self,
        workflow: &CollaborativeWorkflow,
    ) -> Result<String, ClientError> {
        self.client
            .send_json_text(
                Method::POST,
                &["context", "workflows"],
                &WorkflowRequest::from(workflow),
            )
            .await
    }

    /// GET /context/workflows/:id
    pub async fn workflow(&self, workflow_id: &str) -> Result<Value, ClientError> {
        self.client
            .get(&["context", "workflows", workflow_id])
            .await
    }

    /// GET /context/workflows
    pub async fn active_workflows(&self) -> Result<Value, ClientError> {
        self.client.get(&["context", "workflows"]).await
    }

    /// PUT /context/workflows/:id/status
    pub async fn update_workflow_status(
        &self,
        workflow_id: &str,
        status: WorkflowStatus,
    ) -> Result<String, ClientError> {
        self.client
            .send_json_text(
                Method::PUT,
                &["context", "workflows", workflow_id, "status"],
                &json!({ "status": status }),
            )
            .await
    }

    /// GET /context/agent/:id/recommendations
    pub async fn recommendations(&self, agent_id: &str) -> Result<Value, ClientError> {
        self.client
            .get(&["context", "agent", agent_id, "recommendations"])
            .await
    }

    /// DELETE /context/agent/:id/recommendations
    pub async fn clear_recommendations(&self, agent_id: &str) -> Result<String, ClientError> {
        self.client
            .delete_text(&["context", "agent", agent_id, "recommendations"])
            .await
    }

    /// POST /context/agent/:id/execute-recommendation
    pub async fn execute_recommendation(
        &self,
        agent_id: &str,
        recommendation_id: &str,
        action: &str,
    ) -> Result<String, ClientError> {
        let body = json!({ "recommendationId": recommendation_id, "action": action });
        self.client
            .send_json_text(
                Method::POST,
                &["context", "agent", agent_id, "execute-recommendation"],
                &body,
            )
            .await
    }

    /// GET /context/agents/with-data-type/:dataType
    pub async fn agents_with_data_type(&self, data_type: &str) -> Result<Value, ClientError> {
        self.client
            .get(&["context", "agents", "with-data-type", data_type])
            .await
    }

    /// GET /context/agents/:source/compatible/:dataType
    pub async fn compatible_agents(
        &self,
        source_agent: &str,
        data_type: &str,
    ) -> Result<Value, ClientError> {
        self.client
            .get(&["context", "agents", source_agent, "compatible", data_type])
            .await
    }

    /// GET /context/agent/:id/collaboration-suggestions
    pub async fn collaboration_suggestions(&self, agent_id: &str) -> Result<Value, ClientError> {
        self.client
            .get(&["context", "agent", agent_id, "collaboration-suggestions"])
            .await
    }

    /// POST /context/chart-suggestions
    pub async fn chart_suggestions(
        &self,
        shape: DataShape,
        data_structure: &Value,
    ) -> Result<Value, ClientError> {
        let body = json!({ "dataType": shape, "dataStructure": data_structure });
        self.client
            .post(&["context", "chart-suggestions"], &body)
            .await
    }

    /// POST /context/trigger-collaboration
    pub async fn trigger_collaboration(
        &self,
        source_agent: &str,
        target_agent: &str,
        data_key: &str,
        action: &str,
    ) -> Result<String, ClientError> {
        let body = json!({
            "sourceAgent": source_agent,
            "targetAgent": target_agent,
            "dataKey": data_key,
            "action": action,
        });
        self.client
            .send_json_text(Method::POST, &["context", "trigger-collaboration"], &body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::persistence::MemoryStorage;
    use crate::state::{DataType, WorkflowDraft};
    use chrono::Utc;
    use mockito::{Matcher, Server};
    use std::sync::Arc;
    use std::time::Duration;

    fn client(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(
            &format!("{}/api", server.url()),
            Duration::from_secs(5),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_set_agent_context_returns_acknowledgement() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/context/agent/a1/context")
            .match_body(Matcher::PartialJson(
                json!({"dataType": "stock-analysis", "symbol": "AAPL"}),
            ))
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("Context updated for agent: a1")
            .create_async()
            .await;

        let api = client(&server);
        let update = ContextUpdate::new(DataType::StockAnalysis).with_field("symbol", json!("AAPL"));
        let reply = api.context().set_agent_context("a1", &update).await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "Context updated for agent: a1");
    }

    #[tokio::test]
    async fn test_set_shared_data_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/context/shared-data/stockData")
            .match_body(Matcher::PartialJson(json!({
                "data": {"price": 187.5},
                "sourceAgent": "stock-agent",
                "metadata": {"symbol": "AAPL"}
            })))
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("Shared data stored: stockData")
            .create_async()
            .await;

        let api = client(&server);
        let mut metadata = Map::new();
        metadata.insert("symbol".to_string(), json!("AAPL"));
        let reply = api
            .context()
            .set_shared_data("stockData", &json!({"price": 187.5}), "stock-agent", &metadata)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "Shared data stored: stockData");
    }

    #[tokio::test]
    async fn test_unsubscribe_is_delete_with_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/context/subscribe")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(
                json!({"subscriberAgent": "chart-agent", "contextKey": "stockData"}),
            ))
            .with_status(200)
            .with_body("chart-agent unsubscribed from stockData")
            .create_async()
            .await;

        let api = client(&server);
        let reply = api
            .context()
            .unsubscribe("chart-agent", "stockData")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "chart-agent unsubscribed from stockData");
    }

    #[tokio::test]
    async fn test_update_workflow_status_is_put() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/context/workflows/1700000000000/status")
            .match_body(Matcher::Json(json!({"status": "paused"})))
            .with_status(200)
            .with_body("Workflow status updated: 1700000000000")
            .create_async()
            .await;

        let api = client(&server);
        let reply = api
            .context()
            .update_workflow_status("1700000000000", WorkflowStatus::Paused)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "Workflow status updated: 1700000000000");
    }

    #[tokio::test]
    async fn test_create_workflow_sends_id_and_participants() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/context/workflows")
            .match_body(Matcher::PartialJson(json!({
                "id": "1700000000000",
                "name": "Morning analysis",
                "participatingAgents": ["stock-agent", "chart-agent"],
                "dataFlow": {"0": {"from": "stock-agent", "to": "chart-agent"}}
            })))
            .with_status(200)
            .with_body("Workflow created: 1700000000000")
            .create_async()
            .await;

        let draft = WorkflowDraft {
            name: "Morning analysis".to_string(),
            description: "Quotes into charts".to_string(),
            agents: vec!["stock-agent".to_string(), "chart-agent".to_string()],
            data_flow: vec![json!({"from": "stock-agent", "to": "chart-agent"})],
        };
        let workflow =
            CollaborativeWorkflow::from_draft("1700000000000".to_string(), draft, Utc::now());

        let api = client(&server);
        let reply = api.context().create_workflow(&workflow).await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "Workflow created: 1700000000000");
    }

    #[test]
    fn test_empty_data_flow_is_an_object() {
        let workflow = CollaborativeWorkflow::from_draft(
            "1".to_string(),
            WorkflowDraft {
                name: "Solo".to_string(),
                ..WorkflowDraft::default()
            },
            Utc::now(),
        );
        let body = serde_json::to_value(WorkflowRequest::from(&workflow)).unwrap();
        assert_eq!(body["dataFlow"], json!({}));
        assert_eq!(body["participatingAgents"], json!([]));
    }

    #[tokio::test]
    async fn test_clear_and_trigger_acknowledgements() {
        let mut server = Server::new_async().await;
        let clear = server
            .mock("DELETE", "/api/context/agent/a1/recommendations")
            .with_status(200)
            .with_body("Recommendations cleared for agent: a1")
            .create_async()
            .await;
        let trigger = server
            .mock("POST", "/api/context/trigger-collaboration")
            .match_body(Matcher::PartialJson(json!({
                "sourceAgent": "stock-agent",
                "targetAgent": "chart-agent",
                "dataKey": "stockData"
            })))
            .with_status(200)
            .with_body("Collaboration triggered between stock-agent and chart-agent")
            .create_async()
            .await;

        let api = client(&server);
        let context = api.context();
        assert_eq!(
            context.clear_recommendations("a1").await.unwrap(),
            "Recommendations cleared for agent: a1"
        );
        assert!(context
            .trigger_collaboration("stock-agent", "chart-agent", "stockData", "visualize")
            .await
            .unwrap()
            .starts_with("Collaboration triggered"));

        clear.assert_async().await;
        trigger.assert_async().await;
    }

    #[tokio::test]
    async fn test_reads_still_decode_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/context/subscribers/stockData")
            .with_status(200)
            .with_body(r#"["chart-agent"]"#)
            .create_async()
            .await;

        let api = client(&server);
        let subscribers = api.context().subscribers("stockData").await.unwrap();
        assert_eq!(subscribers, json!(["chart-agent"]));
    }

    #[tokio::test]
    async fn test_execute_recommendation_rejection() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/context/agent/a1/execute-recommendation")
            .with_status(400)
            .with_body("Recommendation not found: r9")
            .create_async()
            .await;

        let api = client(&server);
        let err = api
            .context()
            .execute_recommendation("a1", "r9", "create-chart")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
    }
}
