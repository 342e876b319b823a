//! Study contents API.

use super::client::{segment, ApiClient};
use super::ApiError;
use crate::models::{
    CreateStudyContentRequest, ReorderRequest, StudyContent, UpdateStudyContentRequest,
};

pub struct StudyContentsApi {
    client: ApiClient,
}

impl StudyContentsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Every content visible to the account.
    pub async fn list(&self) -> Result<Vec<StudyContent>, ApiError> {
        self.client.get("study-contents").await
    }

    pub async fn get(&self, id: &str) -> Result<StudyContent, ApiError> {
        self.client.get(&format!("study-contents/{}", segment(id)?)).await
    }

    pub async fn create(&self, request: &CreateStudyContentRequest) -> Result<StudyContent, ApiError> {
        self.client.post("study-contents", request).await
    }

    pub async fn update(
        &self,
        id: &str,
        request: &UpdateStudyContentRequest,
    ) -> Result<StudyContent, ApiError> {
        self.client.put(&format!("study-contents/{}", segment(id)?), request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("study-contents/{}", segment(id)?)).await
    }

    /// Mark as done. Returns the content as the server now has it.
    pub async fn complete(&self, id: &str) -> Result<StudyContent, ApiError> {
        self.client
            .put(&format!("study-contents/{}/complete", segment(id)?), &serde_json::json!({}))
            .await
    }

    /// Persist a new ordering. Positions are taken from the request as-is.
    pub async fn reorder(&self, request: &ReorderRequest) -> Result<(), ApiError> {
        self.client.put_unit("study-contents/reorder", request).await
    }
}
