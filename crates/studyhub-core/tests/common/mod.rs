//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use wiremock::MockServer;

use studyhub_core::auth::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
use studyhub_core::{ApiClient, MemoryStore, SessionManager};

pub const CLIENT_ID: &str = "web-app";

/// Unsigned token whose `exp` is `hours` from now.
pub fn token_expiring_in(hours: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let exp = (Utc::now() + Duration::hours(hours)).timestamp();
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u1","exp":{}}}"#, exp));
    format!("{}.{}.sig", header, payload)
}

pub fn user_json() -> Value {
    json!({
        "id": "u1",
        "email": "a@b.com",
        "name": "Ana"
    })
}

pub fn auth_body(access_token: &str, refresh_token: &str) -> Value {
    json!({
        "user": user_json(),
        "access_token": access_token,
        "refresh_token": refresh_token
    })
}

/// A mock service plus a client pointed at it.
pub struct TestContext {
    pub server: MockServer,
    pub session: Arc<SessionManager>,
    pub api: ApiClient,
}

impl TestContext {
    /// Nobody logged in.
    pub async fn start() -> Self {
        Self::with_store(MemoryStore::new()).await
    }

    /// A live session restored from storage, as after a restart.
    pub async fn logged_in(token: &str) -> Self {
        let store = MemoryStore::with_entries([
            (ACCESS_TOKEN_KEY, token.to_string()),
            (REFRESH_TOKEN_KEY, "r1".to_string()),
            (USER_KEY, user_json().to_string()),
        ]);
        Self::with_store(store).await
    }

    async fn with_store(store: MemoryStore) -> Self {
        let server = MockServer::start().await;
        let session = SessionManager::shared(store);
        session.restore();
        let api = ApiClient::builder()
            .api_url(format!("{}/api/v1", server.uri()))
            .client_id(CLIENT_ID)
            .build(session.clone())
            .expect("client should build");
        Self {
            server,
            session,
            api,
        }
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}

pub fn subject_json(id: &str, name: &str) -> Value {
    json!({ "id": id, "student_id": "st1", "name": name, "description": "" })
}

pub fn exam_json(id: &str, subject_id: &str, due: &str, status: &str) -> Value {
    json!({
        "id": id,
        "subject_id": subject_id,
        "title": format!("Prova {}", id),
        "description": "",
        "due_date": due,
        "type": "exam",
        "status": status
    })
}
