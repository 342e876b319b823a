use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

/// A file uploaded against an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Attachment {
    pub id: String,
    pub exam_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Attachment {
    /// Name to show and to save downloads under.
    pub fn display_name(&self) -> &str {
        if self.original_name.is_empty() {
            &self.file_name
        } else {
            &self.original_name
        }
    }
}

/// The "files" screen lists attachments.
pub type StudyFile = Attachment;

/// Binary payload for a multipart upload.
#[derive(Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Resource for Attachment {
    fn id(&self) -> &str {
        &self.id
    }
}
