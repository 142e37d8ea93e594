//! Authentication endpoints

use super::client::ApiClient;
use crate::error::ClientError;
use crate::state::UserProfile;
use serde::{Deserialize, Serialize};

/// Body for `POST /auth/login`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username or email address
    pub username_or_email: String,
    /// Plain-text password
    pub password: String,
    /// Ask for a long-lived token
    #[serde(default)]
    pub remember_me: bool,
}

impl LoginRequest {
    /// Create a login request without `remember_me`
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
            remember_me: false,
        }
    }
}

/// Body for `POST /auth/register`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Desired username
    pub username: String,
    /// Email address
    pub email: String,
    /// Plain-text password
    pub password: String,
    /// Client-side confirmation, never sent
    #[serde(skip)]
    pub confirm_password: String,
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Response of login and register
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthResponse {
    /// Issued JWT, absent on failure
    pub token: Option<String>,
    /// Token scheme, normally `Bearer`
    pub token_type: Option<String>,
    /// Authenticated user
    pub user: Option<UserProfile>,
    /// Whether the backend accepted the credentials
    pub success: bool,
    /// Human-readable outcome
    pub message: Option<String>,
    /// Server time of the response
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Availability {
    available: bool,
}

/// `/auth` call bundle
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// POST /auth/login
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.client.post(&["auth", "login"], request).await
    }

    /// POST /auth/register
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.client.post(&["auth", "register"], request).await
    }

    /// GET /auth/check-username - true when the name is free
    pub async fn check_username(&self, username: &str) -> Result<bool, ClientError> {
        let availability: Availability = self
            .client
            .get_with_query(&["auth", "check-username"], &[("username", username)])
            .await?;
        Ok(availability.available)
    }

    /// GET /auth/check-email - true when the address is free
    pub async fn check_email(&self, email: &str) -> Result<bool, ClientError> {
        let availability: Availability = self
            .client
            .get_with_query(&["auth", "check-email"], &[("email", email)])
            .await?;
        Ok(availability.available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::persistence::MemoryStorage;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_register_request_omits_confirmation() {
        let request = RegisterRequest {
            username: "trader".to_string(),
            email: "trader@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({ "username": "trader", "email": "trader@example.com", "password": "secret1" })
        );
    }

    #[tokio::test]
    async fn test_login_parses_auth_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/login")
            .match_body(Matcher::PartialJson(json!({ "usernameOrEmail": "trader" })))
            .with_status(200)
            .with_body(
                r#"{"token": "jwt", "tokenType": "Bearer", "success": true,
                    "user": {"id": 7, "username": "trader", "email": "trader@example.com"}}"#,
            )
            .create_async()
            .await;

        let api = ApiClient::new(
            &format!("{}/api", server.url()),
            Duration::from_secs(5),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();
        let response = api
            .auth()
            .login(&LoginRequest::new("trader", "secret1"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.success);
        assert_eq!(response.token.as_deref(), Some("jwt"));
        assert_eq!(response.user.unwrap().username, "trader");
    }

    #[tokio::test]
    async fn test_check_username_reads_availability() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/auth/check-username")
            .match_query(Matcher::UrlEncoded("username".into(), "taken".into()))
            .with_status(200)
            .with_body(r#"{"available": false}"#)
            .create_async()
            .await;

        let api = ApiClient::new(
            &format!("{}/api", server.url()),
            Duration::from_secs(5),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();
        assert!(!api.auth().check_username("taken").await.unwrap());
        mock.assert_async().await;
    }
}
