use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

/// A topic to study for a subject, optionally tied to one exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct StudyContent {
    pub id: String,
    pub subject_id: String,
    #[serde(default)]
    pub exam_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateStudyContentRequest {
    pub subject_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateStudyContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// One entry of `PUT study-contents/reorder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPosition {
    pub id: String,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReorderRequest {
    pub contents: Vec<ContentPosition>,
}

impl ReorderRequest {
    /// Positions follow the order of `ids`, starting at 1.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let contents = ids
            .into_iter()
            .zip(1..)
            .map(|(id, order)| ContentPosition {
                id: id.into(),
                order,
            })
            .collect();
        Self { contents }
    }
}

impl Resource for StudyContent {
    fn id(&self) -> &str {
        &self.id
    }
}
