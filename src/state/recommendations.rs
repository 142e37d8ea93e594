//! Rule-based recommendations
//!
//! Everything here is a pure derivation over the current context and shared
//! data. Nothing is persisted; results are recomputed on demand.

use super::context::{AgentContext, DataType, SharedDataEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shared-data key the stock analyzer publishes to
pub const STOCK_DATA_KEY: &str = "stockData";
/// Shared-data key for financial metrics
pub const FINANCIAL_METRICS_KEY: &str = "financialMetrics";
/// Shared-data key for market sentiment
pub const MARKET_SENTIMENT_KEY: &str = "marketSentiment";

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Nice to have
    Low,
    /// Worth doing
    Medium,
    /// Do next
    High,
}

/// A suggestion derived from context and shared data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Stable rule id
    pub id: String,
    /// Always "agent-suggestion"
    #[serde(rename = "type")]
    pub kind: String,
    /// Short title
    pub title: String,
    /// One-line description
    pub description: String,
    /// How urgent the suggestion is
    pub priority: Priority,
    /// Action tag the UI dispatches on ("create-chart", "assess-risk")
    pub action: String,
    /// Agent type that should carry out the action
    pub suggested_agent: String,
    /// Shared-data keys the action consumes
    pub data_keys: Vec<String>,
}

/// Apply the rule table for one agent
///
/// Rules are independent and additive, evaluated in a fixed order, so the
/// same inputs always produce the same list.
pub fn recommend(
    context: Option<&AgentContext>,
    shared_data: &HashMap<String, SharedDataEntry>,
) -> Vec<Recommendation> {
    let data_type = context.and_then(|c| c.data_type.as_ref());
    let mut recommendations = Vec::new();

    if data_type == Some(&DataType::StockAnalysis) || shared_data.contains_key(STOCK_DATA_KEY) {
        recommendations.push(Recommendation {
            id: "chart-visualization".to_string(),
            kind: "agent-suggestion".to_string(),
            title: "Create Interactive Charts".to_string(),
            description: "Visualize stock data with interactive charts".to_string(),
            priority: Priority::High,
            action: "create-chart".to_string(),
            suggested_agent: "chart-visualizer".to_string(),
            data_keys: vec![STOCK_DATA_KEY.to_string()],
        });
    }

    if data_type == Some(&DataType::FinancialData)
        || shared_data.contains_key(FINANCIAL_METRICS_KEY)
    {
        recommendations.push(Recommendation {
            id: "risk-analysis".to_string(),
            kind: "agent-suggestion".to_string(),
            title: "Perform Risk Assessment".to_string(),
            description: "Analyze risk factors based on financial data".to_string(),
            priority: Priority::Medium,
            action: "assess-risk".to_string(),
            suggested_agent: "risk-assessor".to_string(),
            data_keys: vec![FINANCIAL_METRICS_KEY.to_string()],
        });
    }

    recommendations
}

/// Kind of collaboration suggested when data is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaborationKind {
    /// Chart the data
    Visualization,
    /// Correlate the data with other signals
    Analysis,
}

/// Suggestion attached to agents of the listed types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationSuggestion {
    /// What to do
    #[serde(rename = "type")]
    pub kind: CollaborationKind,
    /// Agent types that can act on it
    pub agents: Vec<String>,
    /// Chart types or analysis types to try
    pub variants: Vec<String>,
    /// One-line description
    pub description: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Suggestions triggered by publishing to `data_key`
pub fn collaboration_for_key(data_key: &str) -> Vec<CollaborationSuggestion> {
    let mut suggestions = Vec::new();

    if data_key == STOCK_DATA_KEY {
        suggestions.push(CollaborationSuggestion {
            kind: CollaborationKind::Visualization,
            agents: strings(&["chart-agent", "technical-analyzer"]),
            variants: strings(&["candlestick", "line", "volume", "bollinger-bands"]),
            description: "Create interactive charts for stock analysis".to_string(),
        });
    }

    if data_key == MARKET_SENTIMENT_KEY {
        suggestions.push(CollaborationSuggestion {
            kind: CollaborationKind::Analysis,
            agents: strings(&["sentiment-analyzer", "news-aggregator"]),
            variants: strings(&["trend-prediction", "sentiment-correlation"]),
            description: "Correlate sentiment with price movements".to_string(),
        });
    }

    suggestions
}

/// Shape of a data set, used to pick chart types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataShape {
    /// Values over time
    TimeSeries,
    /// Several series side by side
    Comparative,
    /// Pairs of variables
    Correlation,
}

/// Chart type fit for a data shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSuggestion {
    /// Chart type tag
    #[serde(rename = "type")]
    pub chart_type: String,
    /// Always true for returned suggestions
    pub suitable: bool,
    /// Why it fits
    pub description: String,
}

/// Chart types suited to `shape`
pub fn suggest_chart_types(shape: DataShape) -> Vec<ChartSuggestion> {
    let table: &[(&str, &str)] = match shape {
        DataShape::TimeSeries => &[
            ("line", "Best for trend analysis"),
            ("candlestick", "Ideal for OHLC data"),
            ("area", "Good for volume visualization"),
        ],
        DataShape::Comparative => &[
            ("bar", "Compare multiple stocks"),
            ("radar", "Multi-dimensional comparison"),
        ],
        DataShape::Correlation => &[
            ("scatter", "Show correlation patterns"),
            ("heatmap", "Correlation matrix"),
        ],
    };

    table
        .iter()
        .map(|(chart_type, description)| ChartSuggestion {
            chart_type: chart_type.to_string(),
            suitable: true,
            description: description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::context::ContextUpdate;
    use chrono::Utc;
    use serde_json::{json, Map};

    fn entry() -> SharedDataEntry {
        SharedDataEntry {
            data: json!({}),
            source_agent: "stock-analyzer".to_string(),
            timestamp: Utc::now(),
            metadata: Map::new(),
        }
    }

    fn context(data_type: DataType) -> AgentContext {
        AgentContext::from_update(ContextUpdate::new(data_type), Utc::now())
    }

    #[test]
    fn test_no_inputs_no_recommendations() {
        assert!(recommend(None, &HashMap::new()).is_empty());
    }

    #[test]
    fn test_stock_context_recommends_chart() {
        let recs = recommend(Some(&context(DataType::StockAnalysis)), &HashMap::new());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].action, "create-chart");
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].suggested_agent, "chart-visualizer");
    }

    #[test]
    fn test_financial_metrics_recommends_risk() {
        let mut shared = HashMap::new();
        shared.insert(FINANCIAL_METRICS_KEY.to_string(), entry());

        let recs = recommend(None, &shared);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].action, "assess-risk");
        assert_eq!(recs[0].priority, Priority::Medium);
    }

    #[test]
    fn test_rules_are_additive() {
        let mut shared = HashMap::new();
        shared.insert(STOCK_DATA_KEY.to_string(), entry());

        let recs = recommend(Some(&context(DataType::FinancialData)), &shared);
        let actions: Vec<&str> = recs.iter().map(|r| r.action.as_str()).collect();
        assert_eq!(actions, vec!["create-chart", "assess-risk"]);
    }

    #[test]
    fn test_unrelated_context_does_not_trigger() {
        let recs = recommend(Some(&context(DataType::MarketSentiment)), &HashMap::new());
        assert!(recs.is_empty());
    }

    #[test]
    fn test_collaboration_for_key() {
        let stock = collaboration_for_key(STOCK_DATA_KEY);
        assert_eq!(stock.len(), 1);
        assert_eq!(stock[0].kind, CollaborationKind::Visualization);
        assert!(stock[0].agents.contains(&"chart-agent".to_string()));

        let sentiment = collaboration_for_key(MARKET_SENTIMENT_KEY);
        assert_eq!(sentiment[0].kind, CollaborationKind::Analysis);

        assert!(collaboration_for_key("weather").is_empty());
    }

    #[test]
    fn test_chart_suggestions_by_shape() {
        let types: Vec<String> = suggest_chart_types(DataShape::TimeSeries)
            .into_iter()
            .map(|s| s.chart_type)
            .collect();
        assert_eq!(types, vec!["line", "candlestick", "area"]);
        assert_eq!(suggest_chart_types(DataShape::Correlation).len(), 2);
    }
}
