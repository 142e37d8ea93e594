//! Racing fetches against a fake backend
//!
//! The backend holds the first `/api/agents` request open while answering
//! the second immediately. Responses are applied in arrival order, so the
//! held-back response is the one left standing.

use agent_dashboard_client::api::ApiClient;
use agent_dashboard_client::state::{MemoryStorage, Storage};
use agent_dashboard_client::Store;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
struct FakeBackend {
    hits: AtomicUsize,
    first_received: Notify,
}

async fn list_agents(State(backend): State<Arc<FakeBackend>>) -> Json<Value> {
    if backend.hits.fetch_add(1, Ordering::SeqCst) == 0 {
        backend.first_received.notify_one();
        tokio::time::sleep(Duration::from_millis(300)).await;
        Json(json!([{"id": "slow", "name": "Issued First", "status": "active"}]))
    } else {
        Json(json!([{"id": "fast", "name": "Issued Second", "status": "active"}]))
    }
}

async fn spawn_backend(backend: Arc<FakeBackend>) -> SocketAddr {
    let app = Router::new()
        .route("/api/agents", get(list_agents))
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_last_resolved_response_wins() {
    let backend = Arc::new(FakeBackend::default());
    let addr = spawn_backend(backend.clone()).await;

    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let api = ApiClient::new(
        &format!("http://{}/api", addr),
        Duration::from_secs(5),
        storage.clone(),
    )
    .unwrap();
    let store = Arc::new(Store::new(api, storage));

    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.fetch_agents().await })
    };
    backend.first_received.notified().await;

    store.fetch_agents().await;
    assert_eq!(store.agents()[0].id, "fast");

    first.await.unwrap();
    let agents = store.agents();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].id, "slow");
    assert_eq!(backend.hits.load(Ordering::SeqCst), 2);
    assert!(!store.is_loading());
}
