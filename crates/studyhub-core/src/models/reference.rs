use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Book,
    Article,
    Website,
    Video,
    #[default]
    Other,
}

impl ReferenceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Book => "Livro",
            ReferenceKind::Article => "Artigo",
            ReferenceKind::Website => "Site",
            ReferenceKind::Video => "Vídeo",
            ReferenceKind::Other => "Outro",
        }
    }
}

impl std::str::FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "book" => Ok(ReferenceKind::Book),
            "article" => Ok(ReferenceKind::Article),
            "website" => Ok(ReferenceKind::Website),
            "video" => Ok(ReferenceKind::Video),
            "other" => Ok(ReferenceKind::Other),
            _ => Err(format!("unknown reference type: {}", s)),
        }
    }
}

/// Bibliography entry attached to an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ExamReference {
    pub id: String,
    pub exam_id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: ReferenceKind,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ExamReference {
    /// `Author (Year). Title. Publisher.` with empty parts left out.
    pub fn citation(&self) -> String {
        let mut out = String::new();
        if !self.author.is_empty() {
            out.push_str(&self.author);
            if let Some(year) = self.year {
                out.push_str(&format!(" ({})", year));
            }
            out.push_str(". ");
        }
        out.push_str(&self.title);
        out.push('.');
        if !self.publisher.is_empty() {
            out.push(' ');
            out.push_str(&self.publisher);
            out.push('.');
        }
        out
    }
}

pub type BibliographyItem = ExamReference;

#[derive(Debug, Clone, Serialize)]
pub struct CreateExamReferenceRequest {
    pub exam_id: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReferenceKind>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateExamReferenceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReferenceKind>,
}

impl Resource for ExamReference {
    fn id(&self) -> &str {
        &self.id
    }
}
