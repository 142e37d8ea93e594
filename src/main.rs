//! Agent Dashboard monitor
//!
//! Boots a store from environment configuration, restores the persisted
//! session, loads agents and metrics, then keeps metrics live until
//! Ctrl+C or SIGTERM.

use agent_dashboard_client::state::{FileStorage, MemoryStorage, Storage};
use agent_dashboard_client::timers::Poller;
use agent_dashboard_client::{Config, Store};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    // Open persisted storage, falling back to memory for this run
    let storage_path = config.storage_path();
    let storage: Arc<dyn Storage> = match FileStorage::open(&storage_path) {
        Ok(storage) => {
            info!("Using storage at {}", storage_path.display());
            Arc::new(storage)
        }
        Err(e) => {
            warn!(
                "Failed to open storage at {}: {}; settings will not persist",
                storage_path.display(),
                e
            );
            Arc::new(MemoryStorage::new())
        }
    };

    let store = Arc::new(Store::from_config(&config, storage)?);
    let session = store.session();
    match session.user() {
        Some(user) => info!("Restored session for {}", user.display_name()),
        None if session.is_authenticated() => info!("Restored session"),
        None => info!("No saved session; requests go out anonymous"),
    }

    store.fetch_agents().await;
    store.load_metrics().await;
    report(&store);

    info!(
        "📈 Polling {} every {:?}",
        config.api.base_url,
        config.poll_interval()
    );
    let poll_store = store.clone();
    let poller = Poller::start(config.poll_interval(), move || {
        let store = poll_store.clone();
        async move {
            store.load_metrics().await;
            report(&store);
        }
    });

    shutdown_signal().await;
    poller.stop();

    info!("Monitor shutdown complete");
    Ok(())
}

fn report(store: &Store) {
    let agents = store.agents();
    let active = agents
        .iter()
        .filter(|a| a.status == agent_dashboard_client::state::AgentStatus::Active)
        .count();
    match store.metrics() {
        Some(m) => info!(
            agents = agents.len(),
            active_agents = active,
            total_tasks = m.total_tasks,
            completed_tasks = m.completed_tasks,
            failed_tasks = m.failed_tasks,
            average_processing_time = m.average_processing_time,
            "Dashboard status"
        ),
        None => info!(
            agents = agents.len(),
            active_agents = active,
            "Dashboard status (metrics unavailable)"
        ),
    }
    if let Some(error) = store.error() {
        warn!("Last error: {}", error);
    }
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
