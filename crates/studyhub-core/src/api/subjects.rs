//! Subjects API.

use super::client::{segment, ApiClient};
use super::ApiError;
use crate::models::{
    CreateSubjectRequest, Exam, StudyContent, Subject, SubjectWithExams, UpdateSubjectRequest,
};

pub struct SubjectsApi {
    client: ApiClient,
}

impl SubjectsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Subject>, ApiError> {
        self.client.get("subjects").await
    }

    pub async fn get(&self, id: &str) -> Result<Subject, ApiError> {
        self.client.get(&format!("subjects/{}", segment(id)?)).await
    }

    /// The subject together with its exams.
    pub async fn with_exams(&self, id: &str) -> Result<SubjectWithExams, ApiError> {
        self.client.get(&format!("subjects/{}/exams", segment(id)?)).await
    }

    /// Just the exams of a subject.
    pub async fn exams(&self, id: &str) -> Result<Vec<Exam>, ApiError> {
        self.client.exams().by_subject(id).await
    }

    pub async fn study_contents(&self, id: &str) -> Result<Vec<StudyContent>, ApiError> {
        self.client.get(&format!("subjects/{}/study-contents", segment(id)?)).await
    }

    pub async fn create(&self, request: &CreateSubjectRequest) -> Result<Subject, ApiError> {
        self.client.post("subjects", request).await
    }

    pub async fn update(&self, id: &str, request: &UpdateSubjectRequest) -> Result<Subject, ApiError> {
        self.client.put(&format!("subjects/{}", segment(id)?), request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("subjects/{}", segment(id)?)).await
    }
}
