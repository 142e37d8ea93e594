//! Backend-sourced data models
//!
//! Agents, tasks, metrics and the authenticated session. Wire names are
//! camelCase to match the backend JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier for an agent
pub type AgentId = String;

/// Unique identifier for a task
pub type TaskId = String;

/// Agent status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentStatus {
    /// Agent is running and accepting tasks
    Active,
    /// Agent is registered but not running
    Inactive,
    /// Agent reported a failure
    Error,
    /// Agent is starting up or being toggled
    Loading,
}

impl AgentStatus {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Inactive => "inactive",
            AgentStatus::Error => "error",
            AgentStatus::Loading => "loading",
        }
    }
}

// The backend sends Java enum names (ACTIVE, ...), so matching is
// case-insensitive. Unknown values read as inactive.
impl From<String> for AgentStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "active" => AgentStatus::Active,
            "error" => AgentStatus::Error,
            "loading" => AgentStatus::Loading,
            _ => AgentStatus::Inactive,
        }
    }
}

impl From<AgentStatus> for String {
    fn from(status: AgentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Agent as reported by `GET /api/agents`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Unique identifier for the agent
    #[serde(default)]
    pub id: AgentId,
    /// Display name of the agent
    pub name: String,
    /// Agent type tag (e.g. "stock-analyzer", "chart-agent")
    #[serde(rename = "type", default)]
    pub agent_type: String,
    /// Current status of the agent
    pub status: AgentStatus,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Task types the agent can handle
    #[serde(default, alias = "supportedTaskTypes")]
    pub capabilities: Vec<String>,
}

impl Agent {
    /// Create an agent with the given ID, name and type
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>, agent_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            agent_type: agent_type.into(),
            status: AgentStatus::Inactive,
            description: String::new(),
            capabilities: Vec::new(),
        }
    }

    /// Identifier used as a map key; falls back to the name when the backend omits `id`
    pub fn key(&self) -> &str {
        if self.id.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }
}

/// Task status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Submitted but not started
    #[default]
    Pending,
    /// Being processed by an agent
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

/// A task tracked by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier; the only key used for update-in-place
    pub task_id: TaskId,
    /// Task type (e.g. "stock-analysis")
    #[serde(rename = "type", default)]
    pub task_type: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Free-form task parameters
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Current status
    #[serde(default)]
    pub status: TaskStatus,
    /// Result payload once available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
    /// Name of the agent that handled the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Message returned with the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /api/tasks`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    /// Task type
    #[serde(rename = "type")]
    pub task_type: String,
    /// Human-readable description
    pub description: String,
    /// Free-form parameters
    pub parameters: Map<String, Value>,
    /// Priority hint ("low", "medium", "high")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Submitting user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Backend session to run the task in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl TaskRequest {
    /// Create a request with no parameters
    pub fn new(task_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Add a parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// Task processing metrics from `GET /api/tasks/metrics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskMetrics {
    /// Tasks received
    pub total_tasks: u64,
    /// Tasks completed successfully
    pub completed_tasks: u64,
    /// Tasks that failed
    pub failed_tasks: u64,
    /// Mean processing time (milliseconds)
    pub average_processing_time: f64,
    /// Agents currently active
    pub active_agents: u64,
    /// Server-side timestamp of the snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Authenticated user profile, as returned in `AuthResponse.user`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Login name
    pub username: String,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Full display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Role name (e.g. "USER", "ADMIN")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    /// Last login time as sent by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

impl UserProfile {
    /// Create a profile with only a username
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    /// Name to show in the UI
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

/// Authentication session
///
/// Fields are private so a token can only exist on an authenticated session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<UserProfile>,
    token: Option<String>,
    is_authenticated: bool,
}

impl Session {
    /// Logged-out session
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Logged-in session holding `token`
    pub fn authenticated(user: Option<UserProfile>, token: String) -> Self {
        Self {
            user,
            token: Some(token),
            is_authenticated: true,
        }
    }

    /// Current user, if known
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Bearer token, if logged in
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether a token is held
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }
}
