//! Agent Dashboard Client Library
//!
//! State store, REST client and supporting timers for the AI agent
//! dashboard. The monitoring binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
pub mod notifications;
pub mod scope;
/// Application state management
///
/// Handles the state model, the reducer contract, and client-side persistence.
pub mod state;
pub mod store;
pub mod timers;
pub mod validation;

pub use api::ApiClient;
pub use config::Config;
pub use error::ClientError;
pub use store::Store;
