use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Attachment, ExamReference, Resource, StudyContent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ExamKind {
    #[default]
    Exam,
    Assignment,
    Project,
    Quiz,
}

impl ExamKind {
    pub const ALL: [ExamKind; 4] = [
        ExamKind::Exam,
        ExamKind::Assignment,
        ExamKind::Project,
        ExamKind::Quiz,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExamKind::Exam => "Prova",
            ExamKind::Assignment => "Trabalho",
            ExamKind::Project => "Projeto",
            ExamKind::Quiz => "Quiz",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamKind::Exam => "exam",
            ExamKind::Assignment => "assignment",
            ExamKind::Project => "project",
            ExamKind::Quiz => "quiz",
        }
    }
}

impl std::str::FromStr for ExamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown exam type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl ExamStatus {
    pub const ALL: [ExamStatus; 3] = [
        ExamStatus::Pending,
        ExamStatus::InProgress,
        ExamStatus::Completed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExamStatus::Pending => "Pendente",
            ExamStatus::InProgress => "Em Progresso",
            ExamStatus::Completed => "Concluído",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::Pending => "pending",
            ExamStatus::InProgress => "in_progress",
            ExamStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for ExamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| format!("unknown exam status: {}", s))
    }
}

/// An exam, assignment, project or quiz belonging to a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Exam {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    // Free-form on the wire: RFC 3339 timestamp, plain date, or empty
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ExamKind,
    #[serde(default)]
    pub status: ExamStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Exam {
    /// Parsed due date, if the server sent one we understand.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        parse_due_date(self.due_date.as_deref()?)
    }

    pub fn is_completed(&self) -> bool {
        self.status == ExamStatus::Completed
    }

    /// Not completed and due strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.due_at().map(|due| due < now).unwrap_or(false)
    }
}

/// Accepts RFC 3339 (`2024-06-01T10:00:00Z`) or a bare date (`2024-06-01`,
/// taken as midnight UTC).
pub fn parse_due_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `GET exams/{id}/details`: the exam with everything hanging off it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ExamDetails {
    #[serde(flatten)]
    pub exam: Exam,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub references: Vec<ExamReference>,
    #[serde(default)]
    pub study_contents: Vec<StudyContent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateExamRequest {
    pub subject_id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ExamKind>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateExamRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ExamKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExamStatus>,
}

impl Resource for Exam {
    fn id(&self) -> &str {
        &self.id
    }
}
