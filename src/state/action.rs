//! Typed actions and post-commit effects
//!
//! Every state change is one `Action`. Timestamps and generated ids are
//! already inside the action when it reaches the reducer.

use super::app_state::{Theme, UserPreferences};
use super::context::{AgentContext, CollaborativeWorkflow, SharedDataEntry};
use super::models::{Agent, AgentId, AgentStatus, Task, TaskMetrics, UserProfile};
use super::recommendations::{CollaborationSuggestion, Recommendation};

/// A state transition request
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Toggle the global loading flag
    SetLoading(bool),
    /// Record (or clear) the global error; recording also ends loading
    SetError(Option<String>),
    /// Replace the agent list wholesale; ends loading
    SetAgents(Vec<Agent>),
    /// Optimistic status change for one agent
    SetAgentStatus {
        /// Agent to update
        agent_id: AgentId,
        /// New status
        status: AgentStatus,
    },
    /// Append a task (replaces a task with the same id)
    AddTask(Task),
    /// Replace the task with the same id; unknown ids are ignored
    UpdateTask(Task),
    /// Store the latest metrics
    SetMetrics(TaskMetrics),
    /// Start an authenticated session
    Login {
        /// Profile returned by the backend
        user: Option<UserProfile>,
        /// Bearer token
        token: String,
    },
    /// End the session
    Logout,
    /// Flip light/dark
    ToggleTheme,
    /// Set the theme explicitly
    SetTheme(Theme),
    /// Collapse or expand the sidebar
    SetSidebarCollapsed(bool),
    /// Replace user preferences
    SetPreferences(UserPreferences),
    /// Overwrite one agent's context slot
    SetAgentContext {
        /// Agent whose slot is written
        agent_id: AgentId,
        /// New, already stamped, context
        context: AgentContext,
    },
    /// Overwrite one shared-data slot
    UpdateSharedData {
        /// Slot name
        key: String,
        /// New, already stamped, entry
        entry: SharedDataEntry,
    },
    /// Remove one shared-data slot
    RemoveSharedData {
        /// Slot name
        key: String,
    },
    /// Append a workflow
    AddCollaborativeWorkflow(CollaborativeWorkflow),
    /// Record that `subscriber` follows `context_key`
    SubscribeToContext {
        /// Following agent
        subscriber: AgentId,
        /// Agent id or shared-data key being followed
        context_key: String,
    },
    /// Store derived recommendations for an agent
    SetAgentRecommendations {
        /// Target agent
        agent_id: AgentId,
        /// Replacement list
        recommendations: Vec<Recommendation>,
    },
    /// Store collaboration suggestions for an agent
    SetCollaborationSuggestions {
        /// Target agent
        agent_id: AgentId,
        /// Replacement list
        suggestions: Vec<CollaborationSuggestion>,
    },
    /// Reset one agent's context to empty
    ClearAgentContext {
        /// Agent whose slot is reset
        agent_id: AgentId,
    },
    /// Wipe contexts, shared data, workflows, subscriptions and derived data
    ClearAllContext,
}

impl Action {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetLoading(_) => "SET_LOADING",
            Action::SetError(_) => "SET_ERROR",
            Action::SetAgents(_) => "SET_AGENTS",
            Action::SetAgentStatus { .. } => "SET_AGENT_STATUS",
            Action::AddTask(_) => "ADD_TASK",
            Action::UpdateTask(_) => "UPDATE_TASK",
            Action::SetMetrics(_) => "SET_METRICS",
            Action::Login { .. } => "LOGIN",
            Action::Logout => "LOGOUT",
            Action::ToggleTheme => "TOGGLE_THEME",
            Action::SetTheme(_) => "SET_THEME",
            Action::SetSidebarCollapsed(_) => "SET_SIDEBAR_COLLAPSED",
            Action::SetPreferences(_) => "SET_PREFERENCES",
            Action::SetAgentContext { .. } => "SET_AGENT_CONTEXT",
            Action::UpdateSharedData { .. } => "UPDATE_SHARED_DATA",
            Action::RemoveSharedData { .. } => "REMOVE_SHARED_DATA",
            Action::AddCollaborativeWorkflow(_) => "ADD_COLLABORATIVE_WORKFLOW",
            Action::SubscribeToContext { .. } => "SUBSCRIBE_TO_CONTEXT",
            Action::SetAgentRecommendations { .. } => "SET_AGENT_RECOMMENDATIONS",
            Action::SetCollaborationSuggestions { .. } => "SET_COLLABORATION_SUGGESTIONS",
            Action::ClearAgentContext { .. } => "CLEAR_AGENT_CONTEXT",
            Action::ClearAllContext => "CLEAR_ALL_CONTEXT",
        }
    }
}

/// Work the store performs after the reducer has committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write a persisted key
    Persist {
        /// Storage key
        key: &'static str,
        /// Serialized value
        value: String,
    },
    /// Remove a persisted key
    Forget {
        /// Storage key
        key: &'static str,
    },
    /// Regenerate recommendations for agents following `context_key`
    NotifySubscribers {
        /// Agent id or shared-data key that changed
        context_key: String,
    },
    /// Derive collaboration suggestions for data published under `data_key`
    SuggestCollaboration {
        /// Shared-data key that changed
        data_key: String,
    },
}
