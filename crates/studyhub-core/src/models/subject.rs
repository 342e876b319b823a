use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Exam, Resource};

/// Student profile linked to a user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateStudentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Subject {
    pub id: String,
    #[serde(default)]
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `GET subjects/{id}/exams` in its expanded form: the subject plus its exams.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SubjectWithExams {
    #[serde(flatten)]
    pub subject: Subject,
    #[serde(default)]
    pub exams: Vec<Exam>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSubjectRequest {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateSubjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Student {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for Subject {
    fn id(&self) -> &str {
        &self.id
    }
}
