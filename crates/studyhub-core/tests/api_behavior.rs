//! Header shaping, error classification and endpoint routing.

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{exam_json, subject_json, token_expiring_in, TestContext, CLIENT_ID};
use studyhub_core::api::messages;
use studyhub_core::models::{
    CreateExamReferenceRequest, CreateStudentRequest, CreateSubjectRequest, ReferenceKind,
    ReorderRequest, UpdateExamRequest, ExamStatus,
};
use studyhub_core::{ApiClient, ApiError, MemoryStore, SessionManager};

#[tokio::test]
async fn authenticated_calls_carry_standard_headers() {
    let token = token_expiring_in(1);
    let ctx = TestContext::logged_in(&token).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/subjects"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .and(header("x-client-id", CLIENT_ID))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            subject_json("s1", "Cálculo"),
            subject_json("s2", "Física"),
        ])))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let subjects = ctx.api.subjects().list().await.unwrap();

    assert_eq!(subjects.len(), 2);
    assert_eq!(subjects[0].name, "Cálculo");
    assert!(!ctx.api.status().is_loading());
    assert_eq!(ctx.api.status().error(), None);
}

#[tokio::test]
async fn validation_error_passes_server_message_through() {
    let ctx = TestContext::logged_in(&token_expiring_in(1)).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/subjects"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "error": "bad", "message": "subject already exists" })),
        )
        .mount(&ctx.server)
        .await;

    let request = CreateSubjectRequest {
        name: "Cálculo".to_string(),
        description: String::new(),
    };
    let err = ctx.api.subjects().create(&request).await.unwrap_err();

    match &err {
        ApiError::Validation { status, message } => {
            assert_eq!(*status, 422);
            assert_eq!(message, "subject already exists");
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(ctx.api.status().error().as_deref(), Some("subject already exists"));
    // Not an auth failure: the session survives
    assert!(ctx.session.current_user().is_some());
}

#[tokio::test]
async fn server_error_is_classified_and_not_retried() {
    let ctx = TestContext::logged_in(&token_expiring_in(1)).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/exams"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let err = ctx.api.exams().list().await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 503, .. }));
    assert_eq!(err.user_message(), messages::SERVER_FAILURE);
    assert!(ctx.session.current_user().is_some());
    assert_eq!(ctx.request_count().await, 1);
}

#[tokio::test]
async fn unparseable_success_body_is_invalid_response() {
    let ctx = TestContext::logged_in(&token_expiring_in(1)).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/subjects/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&ctx.server)
        .await;

    let err = ctx.api.subjects().get("s1").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn unreachable_service_is_transport_failure() {
    let session = SessionManager::shared(MemoryStore::new());
    // Port 1 is never listening
    let api = ApiClient::builder()
        .api_url("http://127.0.0.1:1/api/v1")
        .build(session)
        .unwrap();

    let err = api.subjects().list().await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(api.status().error().as_deref(), Some(messages::TRANSPORT_FAILURE));
}

#[tokio::test]
async fn student_creation_identifies_user_by_email() {
    let ctx = TestContext::logged_in(&token_expiring_in(1)).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/students"))
        .and(header("x-user-id", "a@b.com"))
        .and(body_json(json!({ "name": "Ana", "email": "a@b.com" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "st1", "name": "Ana", "email": "a@b.com", "user_id": "u1"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let student = ctx
        .api
        .students()
        .create(&CreateStudentRequest {
            name: "Ana".to_string(),
            email: "a@b.com".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(student.user_id, "u1");
    let requests = ctx.server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn partial_update_sends_only_set_fields() {
    let ctx = TestContext::logged_in(&token_expiring_in(1)).await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/exams/e1"))
        .and(body_json(json!({ "status": "completed" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(exam_json("e1", "s1", "2024-06-01", "completed")),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let update = UpdateExamRequest {
        status: Some(ExamStatus::Completed),
        ..Default::default()
    };
    let exam = ctx.api.exams().update("e1", &update).await.unwrap();
    assert!(exam.is_completed());
}

#[tokio::test]
async fn reorder_and_complete_study_contents() {
    let ctx = TestContext::logged_in(&token_expiring_in(1)).await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/study-contents/reorder"))
        .and(body_json(json!({
            "contents": [ { "id": "c2", "order": 1 }, { "id": "c1", "order": 2 } ]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/study-contents/c1/complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c1", "subject_id": "s1", "title": "Limites", "is_completed": true, "order": 2
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    ctx.api
        .study_contents()
        .reorder(&ReorderRequest::from_ids(["c2", "c1"]))
        .await
        .unwrap();
    let content = ctx.api.study_contents().complete("c1").await.unwrap();
    assert!(content.is_completed);
}

#[tokio::test]
async fn reference_is_created_under_its_exam() {
    let ctx = TestContext::logged_in(&token_expiring_in(1)).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/exams/e1/references"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "r1", "exam_id": "e1", "title": "Cálculo Vol. 1", "author": "Stewart",
            "publisher": "Cengage", "year": 2013, "type": "book"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let request = CreateExamReferenceRequest {
        exam_id: "e1".to_string(),
        title: "Cálculo Vol. 1".to_string(),
        author: "Stewart".to_string(),
        publisher: "Cengage".to_string(),
        year: 2013,
        isbn: None,
        url: None,
        description: None,
        kind: Some(ReferenceKind::Book),
    };
    let reference = ctx.api.references().create(&request).await.unwrap();
    assert_eq!(reference.kind, ReferenceKind::Book);
}

#[tokio::test]
async fn subject_exams_and_details() {
    let ctx = TestContext::logged_in(&token_expiring_in(1)).await;

    let mut subject = subject_json("s1", "Cálculo");
    subject["exams"] = json!([exam_json("e1", "s1", "2024-06-01", "pending")]);
    Mock::given(method("GET"))
        .and(path("/api/v1/subjects/s1/exams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(subject))
        .mount(&ctx.server)
        .await;

    let mut details = exam_json("e1", "s1", "2024-06-01", "pending");
    details["attachments"] = json!([]);
    details["references"] = json!([]);
    details["study_contents"] = json!([
        { "id": "c1", "subject_id": "s1", "exam_id": "e1", "title": "Limites" }
    ]);
    Mock::given(method("GET"))
        .and(path("/api/v1/exams/e1/details"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details))
        .mount(&ctx.server)
        .await;

    let with_exams = ctx.api.subjects().with_exams("s1").await.unwrap();
    assert_eq!(with_exams.subject.name, "Cálculo");
    assert_eq!(with_exams.exams.len(), 1);
    assert_eq!(ctx.api.subjects().exams("s1").await.unwrap()[0].id, "e1");

    let details = ctx.api.exams().details("e1").await.unwrap();
    assert_eq!(details.exam.id, "e1");
    assert_eq!(details.study_contents[0].title, "Limites");
}

#[tokio::test]
async fn health_needs_no_session() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let body = ctx.api.health().check().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn bearer_is_omitted_without_session() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/exams"))
        .and(header_exists("x-client-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&ctx.server)
        .await;

    ctx.api.exams().list().await.unwrap();
    let requests = ctx.server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn ids_are_sent_as_a_single_encoded_segment() {
    let ctx = TestContext::logged_in(&token_expiring_in(1)).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/subjects/..%2Fstudents%2Fx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(subject_json("s1", "Cálculo")))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let subject = ctx.api.subjects().get("../students/x").await.unwrap();
    assert_eq!(subject.id, "s1");

    let err = ctx.api.subjects().delete("..").await.unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
    assert_eq!(ctx.request_count().await, 1);
}
