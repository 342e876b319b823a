//! Health check.

use reqwest::Method;

use super::client::{ApiClient, AuthMode, Payload};
use super::ApiError;

pub struct HealthApi {
    client: ApiClient,
}

impl HealthApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Whatever the service reports about itself. Needs no session.
    pub async fn check(&self) -> Result<serde_json::Value, ApiError> {
        self.client
            .request_json(Method::GET, "health", Payload::<()>::Empty, AuthMode::Public)
            .await
    }

    /// `true` when the service answers with a success status, JSON or not.
    pub async fn is_healthy(&self) -> bool {
        matches!(self.check().await, Ok(_) | Err(ApiError::InvalidResponse(_)))
    }
}
