// Application state
// Normalized snapshot of everything the dashboard panels read

use super::context::{AgentContext, CollaborativeWorkflow, SharedDataEntry};
use super::models::{Agent, AgentId, Session, Task, TaskId, TaskMetrics};
use super::recommendations::{CollaborationSuggestion, Recommendation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background
    Light,
    /// Dark background
    #[default]
    Dark,
}

impl Theme {
    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Persisted representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse the persisted representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Default chart type for stock panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// OHLC candles
    #[default]
    Candlestick,
    /// Close price line
    Line,
    /// Filled line
    Area,
    /// OHLC bars
    Ohlc,
}

/// Persisted user preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    /// Symbol opened by default in the stock panel
    pub default_stock_symbol: String,
    /// Panel refresh interval (milliseconds)
    pub refresh_interval: u64,
    /// Default chart type
    pub chart_type: ChartType,
    /// Whether advanced metrics are shown
    pub show_advanced_metrics: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_stock_symbol: "AAPL".to_string(),
            refresh_interval: 30_000,
            chart_type: ChartType::Candlestick,
            show_advanced_metrics: false,
        }
    }
}

/// UI-specific state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    /// Current theme
    pub theme: Theme,
    /// Whether the sidebar is collapsed
    pub sidebar_collapsed: bool,
    /// User preferences
    pub preferences: UserPreferences,
}

/// Main application state
///
/// Only the reducer mutates this; everything else reads snapshots.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Agents in backend order
    pub agents: Vec<Agent>,
    /// Tasks in submission order
    pub tasks: Vec<Task>,
    /// Latest task metrics
    pub metrics: Option<TaskMetrics>,
    /// A network-backed operation is in flight
    pub loading: bool,
    /// Last request failure message (last write wins)
    pub error: Option<String>,
    /// Authentication session
    pub session: Session,
    /// UI state preferences
    pub ui_state: UiState,
    /// Per-agent context slots
    pub agent_contexts: HashMap<AgentId, AgentContext>,
    /// Named shared-data slots
    pub shared_data: HashMap<String, SharedDataEntry>,
    /// Workflows in creation order
    pub collaborative_workflows: Vec<CollaborativeWorkflow>,
    /// Subscriber agent -> context keys it follows
    pub context_subscriptions: HashMap<AgentId, Vec<String>>,
    /// Derived recommendations per agent
    pub agent_recommendations: HashMap<AgentId, Vec<Recommendation>>,
    /// Collaboration suggestions per agent
    pub collaboration_suggestions: HashMap<AgentId, Vec<CollaborationSuggestion>>,
}

impl AppState {
    /// Create a new application state with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an agent by ID (or by name for agents the backend sent without one)
    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.key() == id)
    }

    /// Get all agents sorted by name
    pub fn agents_list(&self) -> Vec<&Agent> {
        let mut agents: Vec<&Agent> = self.agents.iter().collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name));
        agents
    }

    /// Get a task by ID
    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.task_id == task_id)
    }

    /// Context for an agent, if one was ever set
    pub fn context_for_agent(&self, agent_id: &str) -> Option<&AgentContext> {
        self.agent_contexts.get(agent_id)
    }

    /// Agents subscribed to `context_key`, sorted
    pub fn subscribers_of(&self, context_key: &str) -> Vec<AgentId> {
        let mut subscribers: Vec<AgentId> = self
            .context_subscriptions
            .iter()
            .filter(|(_, keys)| keys.iter().any(|k| k == context_key))
            .map(|(agent, _)| agent.clone())
            .collect();
        subscribers.sort();
        subscribers
    }

    /// Recommendations last generated for an agent
    pub fn recommendations_for(&self, agent_id: &str) -> &[Recommendation] {
        self.agent_recommendations
            .get(agent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
