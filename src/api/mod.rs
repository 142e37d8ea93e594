//! Backend REST API wrapper
//!
//! [`ApiClient`] owns request construction and error normalization; the
//! per-resource bundles borrow it and expose one method per endpoint.

mod agents;
mod auth;
mod client;
mod context;
mod plugins;
mod stocks;
mod tasks;

pub use agents::AgentsApi;
pub use auth::{AuthApi, AuthResponse, LoginRequest, RegisterRequest};
pub use client::ApiClient;
pub use context::ContextApi;
pub use plugins::{PluginInfo, PluginsApi};
pub use stocks::{Holding, StockQuote, StocksApi};
pub use tasks::TasksApi;
