//! Exam references (bibliography).

use super::client::{segment, ApiClient};
use super::ApiError;
use crate::models::{CreateExamReferenceRequest, ExamReference, UpdateExamReferenceRequest};

pub struct ReferencesApi {
    client: ApiClient,
}

impl ReferencesApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Every reference visible to the account.
    pub async fn list(&self) -> Result<Vec<ExamReference>, ApiError> {
        self.client.get("references").await
    }

    pub async fn list_for_exam(&self, exam_id: &str) -> Result<Vec<ExamReference>, ApiError> {
        self.client.exams().references(exam_id).await
    }

    pub async fn get(&self, id: &str) -> Result<ExamReference, ApiError> {
        self.client.get(&format!("references/{}", segment(id)?)).await
    }

    /// Created under the exam named in the request.
    pub async fn create(&self, request: &CreateExamReferenceRequest) -> Result<ExamReference, ApiError> {
        self.client
            .post(&format!("exams/{}/references", segment(&request.exam_id)?), request)
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        request: &UpdateExamReferenceRequest,
    ) -> Result<ExamReference, ApiError> {
        self.client.put(&format!("references/{}", segment(id)?), request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("references/{}", segment(id)?)).await
    }
}
