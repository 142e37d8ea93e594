//! Stock data endpoints
//!
//! Only the quote has a fixed schema worth typing; the analysis endpoints
//! return rich, evolving documents and are passed through as JSON.

use super::client::ApiClient;
use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Real-time quote from `GET /stocks/:symbol/quote`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StockQuote {
    /// Ticker symbol
    pub symbol: String,
    /// Last trade price
    pub price: f64,
    /// Absolute change since previous close
    pub change: f64,
    /// Percent change since previous close
    pub change_percent: f64,
    /// Traded volume
    pub volume: f64,
    /// Opening price
    pub open: f64,
    /// Session high
    pub high: f64,
    /// Session low
    pub low: f64,
    /// Previous close
    pub previous_close: f64,
    /// Quote time as sent by the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Market status at quote time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_status: Option<String>,
}

/// Portfolio position for `analyze_portfolio`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Ticker symbol
    pub symbol: String,
    /// Number of shares
    pub shares: f64,
    /// Average purchase price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
}

/// `/stocks` call bundle
#[derive(Debug, Clone, Copy)]
pub struct StocksApi<'a> {
    client: &'a ApiClient,
}

impl<'a> StocksApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// GET /stocks/:symbol/quote
    pub async fn quote(&self, symbol: &str) -> Result<StockQuote, ClientError> {
        self.client.get(&["stocks", symbol, "quote"]).await
    }

    /// GET /stocks/:symbol/history?period=
    pub async fn history(&self, symbol: &str, period: &str) -> Result<Value, ClientError> {
        self.client
            .get_with_query(&["stocks", symbol, "history"], &[("period", period)])
            .await
    }

    /// GET /stocks/:symbol/history/advanced?interval=&outputSize=
    pub async fn advanced_history(
        &self,
        symbol: &str,
        interval: &str,
        output_size: &str,
    ) -> Result<Value, ClientError> {
        self.client
            .get_with_query(
                &["stocks", symbol, "history", "advanced"],
                &[("interval", interval), ("outputSize", output_size)],
            )
            .await
    }

    /// GET /stocks/:symbol/indicators
    pub async fn indicators(&self, symbol: &str) -> Result<Value, ClientError> {
        self.client.get(&["stocks", symbol, "indicators"]).await
    }

    /// GET /stocks/:symbol/signal
    pub async fn signal(&self, symbol: &str) -> Result<Value, ClientError> {
        self.client.get(&["stocks", symbol, "signal"]).await
    }

    /// GET /stocks/:symbol/info
    pub async fn info(&self, symbol: &str) -> Result<Value, ClientError> {
        self.client.get(&["stocks", symbol, "info"]).await
    }

    /// GET /stocks/:symbol/patterns
    pub async fn patterns(&self, symbol: &str) -> Result<Value, ClientError> {
        self.client.get(&["stocks", symbol, "patterns"]).await
    }

    /// GET /stocks/:symbol/risk
    pub async fn risk(&self, symbol: &str) -> Result<Value, ClientError> {
        self.client.get(&["stocks", symbol, "risk"]).await
    }

    /// GET /stocks/:symbol/prediction
    pub async fn prediction(&self, symbol: &str) -> Result<Value, ClientError> {
        self.client.get(&["stocks", symbol, "prediction"]).await
    }

    /// GET /stocks/:symbol/analysis/complete
    pub async fn complete_analysis(&self, symbol: &str) -> Result<Value, ClientError> {
        self.client
            .get(&["stocks", symbol, "analysis", "complete"])
            .await
    }

    /// GET /stocks/:symbol/comparison?benchmarkSymbol=
    pub async fn comparison(&self, symbol: &str, benchmark: &str) -> Result<Value, ClientError> {
        self.client
            .get_with_query(
                &["stocks", symbol, "comparison"],
                &[("benchmarkSymbol", benchmark)],
            )
            .await
    }

    /// POST /stocks/watchlist
    pub async fn add_to_watchlist(&self, symbol: &str) -> Result<Value, ClientError> {
        self.client
            .post(&["stocks", "watchlist"], &json!({ "symbol": symbol }))
            .await
    }

    /// GET /stocks/market/status
    pub async fn market_status(&self) -> Result<Value, ClientError> {
        self.client.get(&["stocks", "market", "status"]).await
    }

    /// POST /stocks/:symbol/alerts
    pub async fn create_alert(&self, symbol: &str, alert: &Value) -> Result<Value, ClientError> {
        self.client.post(&["stocks", symbol, "alerts"], alert).await
    }

    /// GET /stocks/:symbol/alerts
    pub async fn active_alerts(&self, symbol: &str) -> Result<Value, ClientError> {
        self.client.get(&["stocks", symbol, "alerts"]).await
    }

    /// DELETE /stocks/alerts/:alertId
    pub async fn remove_alert(&self, alert_id: &str) -> Result<Value, ClientError> {
        self.client.delete(&["stocks", "alerts", alert_id]).await
    }

    /// POST /stocks/portfolio/analyze
    pub async fn analyze_portfolio(&self, holdings: &[Holding]) -> Result<Value, ClientError> {
        self.client
            .post(
                &["stocks", "portfolio", "analyze"],
                &json!({ "holdings": holdings }),
            )
            .await
    }
}
