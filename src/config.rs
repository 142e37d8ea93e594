//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default backend API root
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Timer configuration
    pub timers: TimerConfig,
}

/// Backend API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every request path is appended to (no trailing slash)
    pub base_url: String,
    /// Per-request timeout (in milliseconds)
    pub request_timeout_ms: u64,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Directory holding the client-side storage file
    pub data_dir: String,
}

/// Timer configuration
#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// Interval of the live metrics poll (in seconds)
    pub poll_interval_secs: u64,
    /// How long error toasts stay visible (in milliseconds)
    pub notification_timeout_ms: u64,
    /// Debounce delay for search suggestions (in milliseconds)
    pub search_debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                request_timeout_ms: 30_000,
            },
            persistence: PersistenceConfig {
                data_dir: default_data_dir(),
            },
            timers: TimerConfig {
                poll_interval_secs: 5,
                notification_timeout_ms: 5_000,
                search_debounce_ms: 300,
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api: ApiConfig {
                base_url: env::var("API_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.api.base_url),
                request_timeout_ms: parse_env("REQUEST_TIMEOUT_MS")
                    .unwrap_or(defaults.api.request_timeout_ms),
            },
            persistence: PersistenceConfig {
                data_dir: env::var("DATA_DIR").unwrap_or(defaults.persistence.data_dir),
            },
            timers: TimerConfig {
                poll_interval_secs: parse_env("POLL_INTERVAL_SECS")
                    .unwrap_or(defaults.timers.poll_interval_secs),
                notification_timeout_ms: parse_env("NOTIFICATION_TIMEOUT_MS")
                    .unwrap_or(defaults.timers.notification_timeout_ms),
                search_debounce_ms: parse_env("SEARCH_DEBOUNCE_MS")
                    .unwrap_or(defaults.timers.search_debounce_ms),
            },
        }
    }

    /// Path of the persisted key/value storage file
    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(&self.persistence.data_dir).join("storage.json")
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.api.request_timeout_ms)
    }

    /// Live poll interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.timers.poll_interval_secs)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn default_data_dir() -> String {
    // Default to ~/.agent-dashboard or current directory
    if let Some(home) = env::var_os("HOME") {
        format!("{}/.agent-dashboard", home.to_string_lossy())
    } else {
        ".agent-dashboard".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        env::remove_var("API_BASE_URL");
        env::remove_var("REQUEST_TIMEOUT_MS");
        env::remove_var("POLL_INTERVAL_SECS");

        let config = Config::from_env();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.timers.search_debounce_ms, 300);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        env::set_var("API_BASE_URL", "http://backend:9000/api/");
        env::set_var("REQUEST_TIMEOUT_MS", "1500");
        env::set_var("DATA_DIR", "/tmp/dashboard-test");

        let config = Config::from_env();
        assert_eq!(config.api.base_url, "http://backend:9000/api");
        assert_eq!(config.api.request_timeout_ms, 1500);
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/tmp/dashboard-test/storage.json")
        );

        env::remove_var("API_BASE_URL");
        env::remove_var("REQUEST_TIMEOUT_MS");
        env::remove_var("DATA_DIR");
    }

    #[test]
    #[serial]
    fn test_invalid_numbers_fall_back() {
        env::set_var("POLL_INTERVAL_SECS", "often");
        let config = Config::from_env();
        assert_eq!(config.timers.poll_interval_secs, 5);
        env::remove_var("POLL_INTERVAL_SECS");
    }
}
