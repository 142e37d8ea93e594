//! Plugin management endpoints

use super::client::ApiClient;
use crate::error::ClientError;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Installed or marketplace plugin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginInfo {
    /// Plugin id
    pub id: String,
    /// Display name
    pub name: String,
    /// Installed (or offered) version
    pub version: String,
    /// Marketplace category
    pub category: String,
    /// Short description
    pub description: String,
    /// Publisher
    pub author: String,
    /// "active", "inactive" or "available"
    pub status: String,
    /// Human-readable package size
    pub size: String,
    /// Release date as sent by the server
    pub last_updated: String,
    /// Plugin ids this plugin needs
    pub dependencies: Vec<String>,
    /// Requested permissions
    pub permissions: Vec<String>,
    /// Average rating
    pub rating: f64,
    /// Download count
    pub downloads: u64,
    /// Whether a newer version exists
    pub has_update: bool,
    /// The newer version, if any
    pub new_version: Option<String>,
    /// Marketplace price label
    pub price: Option<String>,
    /// Compatibility note
    pub compatibility: Option<String>,
    /// Feature list
    pub features: Vec<String>,
    /// Saved configuration
    pub configuration: Map<String, Value>,
}

/// `/plugins` call bundle
#[derive(Debug, Clone, Copy)]
pub struct PluginsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PluginsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// GET /plugins/installed
    pub async fn installed(&self) -> Result<Vec<PluginInfo>, ClientError> {
        self.client.get(&["plugins", "installed"]).await
    }

    /// GET /plugins/available
    pub async fn available(&self) -> Result<Vec<PluginInfo>, ClientError> {
        self.client.get(&["plugins", "available"]).await
    }

    /// GET /plugins/:id
    pub async fn get(&self, plugin_id: &str) -> Result<PluginInfo, ClientError> {
        self.client.get(&["plugins", plugin_id]).await
    }

    /// POST /plugins/:id/install
    pub async fn install(&self, plugin_id: &str) -> Result<Value, ClientError> {
        self.client.post_empty(&["plugins", plugin_id, "install"]).await
    }

    /// POST /plugins/:id/toggle
    pub async fn toggle(&self, plugin_id: &str) -> Result<Value, ClientError> {
        self.client.post_empty(&["plugins", plugin_id, "toggle"]).await
    }

    /// DELETE /plugins/:id
    pub async fn uninstall(&self, plugin_id: &str) -> Result<Value, ClientError> {
        self.client.delete(&["plugins", plugin_id]).await
    }

    /// POST /plugins/:id/update
    pub async fn update(&self, plugin_id: &str) -> Result<Value, ClientError> {
        self.client.post_empty(&["plugins", plugin_id, "update"]).await
    }

    /// POST /plugins/:id/configure
    pub async fn configure(
        &self,
        plugin_id: &str,
        configuration: &Map<String, Value>,
    ) -> Result<Value, ClientError> {
        self.client
            .post(&["plugins", plugin_id, "configure"], configuration)
            .await
    }

    /// GET /plugins/:id/configuration
    pub async fn configuration(&self, plugin_id: &str) -> Result<Value, ClientError> {
        self.client
            .get(&["plugins", plugin_id, "configuration"])
            .await
    }

    /// POST /plugins/upload as multipart with a `file` part
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<Value, ClientError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let url = self.client.endpoint(&["plugins", "upload"])?;
        self.client
            .send(self.client.request(Method::POST, url).multipart(form))
            .await
    }

    /// GET /plugins/:id/dependencies
    pub async fn dependencies(&self, plugin_id: &str) -> Result<Value, ClientError> {
        self.client
            .get(&["plugins", plugin_id, "dependencies"])
            .await
    }

    /// POST /plugins/check-updates
    pub async fn check_updates(&self) -> Result<Value, ClientError> {
        self.client.post_empty(&["plugins", "check-updates"]).await
    }

    /// GET /plugins/marketplace/featured
    pub async fn featured(&self) -> Result<Value, ClientError> {
        self.client
            .get(&["plugins", "marketplace", "featured"])
            .await
    }

    /// GET /plugins/search?query=&category=
    pub async fn search(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> Result<Vec<PluginInfo>, ClientError> {
        let mut params = vec![("query", query)];
        if let Some(category) = category {
            params.push(("category", category));
        }
        self.client
            .get_with_query(&["plugins", "search"], &params)
            .await
    }
}
