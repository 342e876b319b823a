//! Token exchanges. These never carry a bearer token and never touch the
//! session; `SessionManager` calls them and persists the result.

use reqwest::Method;

use super::client::{ApiClient, AuthMode, Payload};
use super::ApiError;
use crate::models::{AuthResponse, Credentials, RefreshRequest, RegisterRequest};

pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.exchange("auth/login", credentials).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.exchange("auth/register", request).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, ApiError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.exchange("auth/refresh", &body).await
    }

    async fn exchange<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<AuthResponse, ApiError> {
        self.client
            .request_json(Method::POST, path, Payload::Json(body), AuthMode::Public)
            .await
    }
}
