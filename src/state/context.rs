//! Cross-panel context types
//!
//! Agent contexts, shared data slots and collaborative workflows. These are
//! the loosely coupled channels panels use to pass hints to each other.

use super::models::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Known kinds of context payload
///
/// Anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    /// Output of the stock analyzer
    StockAnalysis,
    /// Financial statements / metrics
    FinancialData,
    /// News and social sentiment
    MarketSentiment,
    /// RSI, MACD, moving averages...
    TechnicalIndicators,
    /// Series prepared for a chart
    ChartData,
    /// Input or output of a risk assessment
    RiskAnalysis,
    /// Unrecognized data type tag
    Other(String),
}

impl DataType {
    /// Wire tag
    pub fn as_str(&self) -> &str {
        match self {
            DataType::StockAnalysis => "stock-analysis",
            DataType::FinancialData => "financial-data",
            DataType::MarketSentiment => "market-sentiment",
            DataType::TechnicalIndicators => "technical-indicators",
            DataType::ChartData => "chart-data",
            DataType::RiskAnalysis => "risk-analysis",
            DataType::Other(tag) => tag,
        }
    }
}

impl From<String> for DataType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "stock-analysis" => DataType::StockAnalysis,
            "financial-data" => DataType::FinancialData,
            "market-sentiment" => DataType::MarketSentiment,
            "technical-indicators" => DataType::TechnicalIndicators,
            "chart-data" => DataType::ChartData,
            "risk-analysis" => DataType::RiskAnalysis,
            _ => DataType::Other(s),
        }
    }
}

impl From<DataType> for String {
    fn from(data_type: DataType) -> Self {
        data_type.as_str().to_string()
    }
}

/// New context for an agent, as passed to `set_agent_context`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextUpdate {
    /// Kind of payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    /// Free-form fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ContextUpdate {
    /// Context of a known kind with no extra fields
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type: Some(data_type),
            fields: Map::new(),
        }
    }

    /// Add a free-form field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Build from an arbitrary JSON object, lifting out `dataType`
    pub fn from_map(mut fields: Map<String, Value>) -> Self {
        let data_type = match fields.remove("dataType") {
            Some(Value::String(tag)) => Some(DataType::from(tag)),
            Some(other) => {
                // Not a tag; keep it where the caller put it
                fields.insert("dataType".to_string(), other);
                None
            }
            None => None,
        };
        Self { data_type, fields }
    }
}

/// Per-agent context slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentContext {
    /// Kind of payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    /// Free-form fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    /// When the slot was last written; `None` for a cleared slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl AgentContext {
    /// Stamp an update with its write time
    pub fn from_update(update: ContextUpdate, at: DateTime<Utc>) -> Self {
        Self {
            data_type: update.data_type,
            fields: update.fields,
            last_updated: Some(at),
        }
    }

    /// Whether the slot holds nothing
    pub fn is_empty(&self) -> bool {
        self.data_type.is_none() && self.fields.is_empty()
    }

    /// Read a free-form field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// One named shared-data slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDataEntry {
    /// Published payload
    pub data: Value,
    /// Agent that wrote the slot
    pub source_agent: AgentId,
    /// Write time
    pub timestamp: DateTime<Utc>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Workflow lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    /// Created and coordinating agents
    #[default]
    Active,
    /// Temporarily halted
    Paused,
    /// Finished
    Completed,
}

/// User input for a new collaborative workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDraft {
    /// Workflow name
    pub name: String,
    /// What the workflow is for
    #[serde(default)]
    pub description: String,
    /// Participating agents
    #[serde(default)]
    pub agents: Vec<AgentId>,
    /// Free-form description of how data moves between agents
    #[serde(default)]
    pub data_flow: Vec<Value>,
}

/// A user-created grouping of agents; tracked, not executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborativeWorkflow {
    /// Millisecond-timestamp derived id
    pub id: String,
    /// Workflow name
    pub name: String,
    /// What the workflow is for
    pub description: String,
    /// Lifecycle status
    pub status: WorkflowStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Participating agents
    #[serde(default)]
    pub agents: Vec<AgentId>,
    /// Free-form data flow description
    #[serde(default)]
    pub data_flow: Vec<Value>,
}

impl CollaborativeWorkflow {
    /// Materialize a draft
    pub fn from_draft(id: String, draft: WorkflowDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            status: WorkflowStatus::Active,
            created_at,
            agents: draft.agents,
            data_flow: draft.data_flow,
        }
    }
}
