//! Exams API.

use super::client::{segment, ApiClient};
use super::ApiError;
use crate::models::{
    Attachment, CreateExamRequest, Exam, ExamDetails, ExamReference, StudyContent,
    UpdateExamRequest,
};

pub struct ExamsApi {
    client: ApiClient,
}

impl ExamsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Exam>, ApiError> {
        self.client.get("exams").await
    }

    pub async fn get(&self, id: &str) -> Result<Exam, ApiError> {
        self.client.get(&format!("exams/{}", segment(id)?)).await
    }

    /// The exam with its attachments, references and study contents.
    pub async fn details(&self, id: &str) -> Result<ExamDetails, ApiError> {
        self.client.get(&format!("exams/{}/details", segment(id)?)).await
    }

    /// Exams of one subject (`GET subjects/{id}/exams`). The service answers
    /// either with a bare list or with the subject carrying an `exams` list.
    pub async fn by_subject(&self, subject_id: &str) -> Result<Vec<Exam>, ApiError> {
        let body: SubjectExams = self
            .client
            .get(&format!("subjects/{}/exams", segment(subject_id)?))
            .await?;
        Ok(body.into_exams())
    }

    pub async fn study_contents(&self, id: &str) -> Result<Vec<StudyContent>, ApiError> {
        self.client.get(&format!("exams/{}/study-contents", segment(id)?)).await
    }

    pub async fn attachments(&self, id: &str) -> Result<Vec<Attachment>, ApiError> {
        self.client.get(&format!("exams/{}/attachments", segment(id)?)).await
    }

    pub async fn references(&self, id: &str) -> Result<Vec<ExamReference>, ApiError> {
        self.client.get(&format!("exams/{}/references", segment(id)?)).await
    }

    pub async fn create(&self, request: &CreateExamRequest) -> Result<Exam, ApiError> {
        self.client.post("exams", request).await
    }

    pub async fn update(&self, id: &str, request: &UpdateExamRequest) -> Result<Exam, ApiError> {
        self.client.put(&format!("exams/{}", segment(id)?), request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("exams/{}", segment(id)?)).await
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum SubjectExams {
    List(Vec<Exam>),
    Subject { exams: Vec<Exam> },
}

impl SubjectExams {
    fn into_exams(self) -> Vec<Exam> {
        match self {
            SubjectExams::List(exams) | SubjectExams::Subject { exams } => exams,
        }
    }
}
