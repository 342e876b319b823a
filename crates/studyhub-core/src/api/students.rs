//! Student profiles.

use reqwest::Method;

use super::client::{segment, ApiClient, AuthMode, Payload};
use super::ApiError;
use crate::models::{CreateStudentRequest, Student, UpdateStudentRequest};

pub struct StudentsApi {
    client: ApiClient,
}

impl StudentsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create the profile for the logged-in account. The service identifies
    /// the account by the `X-User-ID` header (its email), not by token.
    pub async fn create(&self, request: &CreateStudentRequest) -> Result<Student, ApiError> {
        self.client
            .request_json(Method::POST, "students", Payload::Json(request), AuthMode::UserId)
            .await
    }

    pub async fn list(&self) -> Result<Vec<Student>, ApiError> {
        self.client.get("students").await
    }

    pub async fn get(&self, id: &str) -> Result<Student, ApiError> {
        self.client.get(&format!("students/{}", segment(id)?)).await
    }

    pub async fn by_user(&self, user_id: &str) -> Result<Student, ApiError> {
        self.client.get(&format!("students/user/{}", segment(user_id)?)).await
    }

    pub async fn update(&self, id: &str, request: &UpdateStudentRequest) -> Result<Student, ApiError> {
        self.client.put(&format!("students/{}", segment(id)?), request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("students/{}", segment(id)?)).await
    }
}
