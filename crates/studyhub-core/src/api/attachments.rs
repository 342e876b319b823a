//! Attachments API: multipart upload and raw download.

use reqwest::multipart::{Form, Part};

use super::client::{segment, ApiClient};
use super::ApiError;
use crate::models::{Attachment, UploadFile};

pub struct AttachmentsApi {
    client: ApiClient,
}

impl AttachmentsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Every attachment visible to the account.
    pub async fn list(&self) -> Result<Vec<Attachment>, ApiError> {
        self.client.get("attachments").await
    }

    pub async fn list_for_exam(&self, exam_id: &str) -> Result<Vec<Attachment>, ApiError> {
        self.client.exams().attachments(exam_id).await
    }

    pub async fn get(&self, id: &str) -> Result<Attachment, ApiError> {
        self.client.get(&format!("attachments/{}", segment(id)?)).await
    }

    /// Upload a file against an exam. Sent once; a failed upload is reported,
    /// not repeated.
    pub async fn upload(
        &self,
        exam_id: &str,
        file: UploadFile,
        description: Option<&str>,
    ) -> Result<Attachment, ApiError> {
        let form = upload_form(file, description)?;
        self.client
            .post_multipart(&format!("exams/{}/attachments", segment(exam_id)?), form)
            .await
    }

    /// File contents as stored by the service.
    pub async fn download(&self, id: &str) -> Result<Vec<u8>, ApiError> {
        self.client.get_bytes(&format!("attachments/{}/download", segment(id)?)).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("attachments/{}", segment(id)?)).await
    }
}

/// `file` part, plus a `description` text part when one is given.
fn upload_form(file: UploadFile, description: Option<&str>) -> Result<Form, ApiError> {
    let UploadFile {
        file_name,
        mime_type,
        bytes,
    } = file;
    let mut part = Part::bytes(bytes).file_name(file_name);
    if let Some(mime) = mime_type {
        part = part
            .mime_str(&mime)
            .map_err(|_| ApiError::Config(format!("Invalid MIME type '{}'", mime)))?;
    }

    let mut form = Form::new().part("file", part);
    if let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) {
        form = form.text("description", description.to_string());
    }
    Ok(form)
}
