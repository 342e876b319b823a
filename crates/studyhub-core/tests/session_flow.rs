//! Session lifecycle against a mock service: login, register, refresh and
//! logout on a rejected token.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{auth_body, token_expiring_in, TestContext};
use studyhub_core::api::messages;
use studyhub_core::models::{Credentials, RegistrationForm};
use studyhub_core::{ApiError, SessionEvent};

#[tokio::test]
async fn login_round_trip_needs_no_extra_call() {
    let ctx = TestContext::start().await;
    let token = token_expiring_in(1);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({ "email": "a@b.com", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(&token, "r1")))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let user = ctx
        .session
        .login(&ctx.api, &Credentials::new("a@b.com", "secret1"))
        .await
        .unwrap();

    assert_eq!(user.email, "a@b.com");
    assert_eq!(ctx.session.current_user(), Some(user.clone()));
    assert_eq!(ctx.session.token(), Some(token));
    assert_eq!(ctx.session.refresh_token().as_deref(), Some("r1"));
    assert!(ctx.session.is_authenticated());
    assert_eq!(ctx.session.last_event(), SessionEvent::LoggedIn(user));
    assert_eq!(ctx.request_count().await, 1);
}

#[tokio::test]
async fn login_does_not_send_bearer_token() {
    let old_token = token_expiring_in(1);
    let ctx = TestContext::logged_in(&old_token).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("t2", "r2")))
        .mount(&ctx.server)
        .await;

    ctx.session
        .login(&ctx.api, &Credentials::new("a@b.com", "secret1"))
        .await
        .unwrap();

    let requests = ctx.server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(ctx.session.token().as_deref(), Some("t2"));
}

#[tokio::test]
async fn rejected_login_keeps_state_and_reports_bad_credentials() {
    let ctx = TestContext::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid credentials" })))
        .mount(&ctx.server)
        .await;

    let result = ctx
        .session
        .login(&ctx.api, &Credentials::new("a@b.com", "wrong"))
        .await;

    assert!(matches!(result, Err(ApiError::Unauthorized { status: 401, .. })));
    assert_eq!(ctx.session.current_user(), None);
    assert_eq!(
        ctx.session.status().error().as_deref(),
        Some(messages::INVALID_CREDENTIALS)
    );
    assert!(!ctx.session.status().is_loading());

    ctx.session.clear_error();
    assert_eq!(ctx.session.status().error(), None);
}

#[tokio::test]
async fn register_remaps_password_validation_message() {
    let ctx = TestContext::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Key: 'RegisterRequest.Password' Error:Field validation for 'Password' failed on the 'min' tag"
        })))
        .mount(&ctx.server)
        .await;

    let form = RegistrationForm {
        name: "Ana".to_string(),
        email: "a@b.com".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
    };
    let request = form.validate().unwrap();
    let err = ctx.session.register(&ctx.api, &request).await.unwrap_err();

    assert_eq!(err.user_message(), "A senha deve ter pelo menos 6 caracteres");
    assert_eq!(
        ctx.session.status().error().as_deref(),
        Some("A senha deve ter pelo menos 6 caracteres")
    );
}

#[tokio::test]
async fn register_establishes_session() {
    let ctx = TestContext::start().await;
    let token = token_expiring_in(2);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .and(body_json(json!({ "name": "Ana", "email": "a@b.com", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_body(&token, "r1")))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let form = RegistrationForm {
        name: "Ana".to_string(),
        email: "a@b.com".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
    };
    let user = ctx
        .session
        .register(&ctx.api, &form.validate().unwrap())
        .await
        .unwrap();

    assert_eq!(ctx.session.last_event(), SessionEvent::Registered(user));
    assert!(ctx.session.is_authenticated());
}

#[tokio::test]
async fn refresh_without_refresh_token_makes_no_call() {
    let ctx = TestContext::start().await;

    let result = ctx.session.refresh(&ctx.api).await;

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert_eq!(ctx.request_count().await, 0);
}

#[tokio::test]
async fn refresh_replaces_token_pair() {
    let expired = token_expiring_in(-1);
    let ctx = TestContext::logged_in(&expired).await;
    assert!(!ctx.session.is_authenticated());
    let fresh = token_expiring_in(1);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(&fresh, "r2")))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let user = ctx.session.refresh(&ctx.api).await.unwrap();

    assert_eq!(ctx.session.token(), Some(fresh));
    assert_eq!(ctx.session.refresh_token().as_deref(), Some("r2"));
    assert!(ctx.session.is_authenticated());
    assert_eq!(ctx.session.last_event(), SessionEvent::Refreshed(user));
}

#[tokio::test]
async fn rejected_refresh_token_ends_session() {
    let ctx = TestContext::logged_in(&token_expiring_in(-1)).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&ctx.server)
        .await;

    assert!(ctx.session.refresh(&ctx.api).await.is_err());
    assert_eq!(ctx.session.current_user(), None);
    assert_eq!(ctx.session.last_event(), SessionEvent::LoggedOut);
}

#[tokio::test]
async fn unauthorized_data_call_logs_out() {
    let token = token_expiring_in(1);
    let ctx = TestContext::logged_in(&token).await;
    let mut events = ctx.session.subscribe();

    Mock::given(method("GET"))
        .and(path("/api/v1/subjects"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "token expired" })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let err = ctx.api.subjects().list().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(ctx.session.current_user(), None);
    assert_eq!(ctx.session.token(), None);
    assert!(events.has_changed().unwrap());
    assert_eq!(*events.borrow_and_update(), SessionEvent::LoggedOut);
    assert_eq!(ctx.api.status().error().as_deref(), Some(messages::SESSION_EXPIRED));
}

#[tokio::test]
async fn forbidden_data_call_logs_out() {
    let ctx = TestContext::logged_in(&token_expiring_in(1)).await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/exams/e1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&ctx.server)
        .await;

    assert!(ctx.api.exams().delete("e1").await.is_err());
    assert_eq!(ctx.session.session(), None);
}

#[tokio::test]
async fn late_rejection_of_replaced_token_keeps_refreshed_session() {
    let old_token = token_expiring_in(1);
    let ctx = TestContext::logged_in(&old_token).await;
    let new_token = token_expiring_in(2);

    Mock::given(method("GET"))
        .and(path("/api/v1/subjects"))
        .and(header("authorization", format!("Bearer {}", old_token).as_str()))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(&new_token, "r2")))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let api = ctx.api.clone();
    let slow = tokio::spawn(async move { api.subjects().list().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    ctx.session.refresh(&ctx.api).await.unwrap();
    assert_eq!(ctx.session.token(), Some(new_token.clone()));

    let err = slow.await.unwrap().unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(ctx.session.token(), Some(new_token));
    assert_eq!(ctx.session.refresh_token().as_deref(), Some("r2"));
    assert!(matches!(ctx.session.last_event(), SessionEvent::Refreshed(_)));
}
