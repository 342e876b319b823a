//! Dashboard aggregation.
//!
//! `DashboardData::load` fetches the five resource lists concurrently and
//! never fails as a whole: a list that could not be fetched is empty and
//! named in `missing`. `DashboardStats` is computed from whatever arrived.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Attachment, Exam, ExamReference, ExamStatus, StudyContent, Subject};

/// How many upcoming exams the overview lists.
pub const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Subjects,
    Exams,
    StudyContents,
    Attachments,
    References,
}

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::Subjects,
        Dataset::Exams,
        Dataset::StudyContents,
        Dataset::Attachments,
        Dataset::References,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Dataset::Subjects => "Disciplinas",
            Dataset::Exams => "Avaliações",
            Dataset::StudyContents => "Conteúdos",
            Dataset::Attachments => "Arquivos",
            Dataset::References => "Bibliografia",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub subjects: Vec<Subject>,
    pub exams: Vec<Exam>,
    pub study_contents: Vec<StudyContent>,
    pub attachments: Vec<Attachment>,
    pub references: Vec<ExamReference>,
    /// Datasets whose fetch failed, in `Dataset::ALL` order.
    pub missing: Vec<Dataset>,
}

impl DashboardData {
    /// Fetch everything at once. Waits for all five calls; a failure only
    /// blanks its own list.
    pub async fn load(api: &ApiClient) -> Self {
        let subjects_api = api.subjects();
        let exams_api = api.exams();
        let contents_api = api.study_contents();
        let attachments_api = api.attachments();
        let references_api = api.references();

        let (subjects, exams, study_contents, attachments, references) = tokio::join!(
            subjects_api.list(),
            exams_api.list(),
            contents_api.list(),
            attachments_api.list(),
            references_api.list(),
        );

        let mut missing = Vec::new();
        let data = Self {
            subjects: or_empty(Dataset::Subjects, subjects, &mut missing),
            exams: or_empty(Dataset::Exams, exams, &mut missing),
            study_contents: or_empty(Dataset::StudyContents, study_contents, &mut missing),
            attachments: or_empty(Dataset::Attachments, attachments, &mut missing),
            references: or_empty(Dataset::References, references, &mut missing),
            missing,
        };
        debug!(missing = data.missing.len(), "Dashboard loaded");
        data
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn is_missing(&self, dataset: Dataset) -> bool {
        self.missing.contains(&dataset)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> DashboardStats {
        DashboardStats::compute(self, now)
    }
}

fn or_empty<T>(
    dataset: Dataset,
    result: Result<Vec<T>, ApiError>,
    missing: &mut Vec<Dataset>,
) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!(dataset = ?dataset, error = %e, "Dashboard fetch failed, using empty list");
            missing.push(dataset);
            Vec::new()
        }
    }
}

/// Per-subject line of the overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSummary {
    pub subject_id: String,
    pub name: String,
    pub exams: usize,
    pub open_exams: usize,
    pub contents: usize,
    pub completed_contents: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub subjects: usize,
    pub exams: usize,
    pub pending_exams: usize,
    pub in_progress_exams: usize,
    pub completed_exams: usize,
    pub overdue_exams: usize,
    /// Open exams due from `now` on, soonest first.
    pub upcoming: Vec<Exam>,
    pub contents: usize,
    pub completed_contents: usize,
    /// Attachment count (the "files" card).
    pub files: usize,
    pub file_bytes: u64,
    /// Reference count (the "bibliography" card).
    pub bibliography: usize,
    /// Sorted by subject name.
    pub by_subject: Vec<SubjectSummary>,
}

impl DashboardStats {
    pub fn compute(data: &DashboardData, now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            subjects: data.subjects.len(),
            exams: data.exams.len(),
            contents: data.study_contents.len(),
            files: data.attachments.len(),
            file_bytes: data.attachments.iter().map(|a| a.file_size).sum(),
            bibliography: data.references.len(),
            ..Default::default()
        };

        for exam in &data.exams {
            match exam.status {
                ExamStatus::Pending => stats.pending_exams += 1,
                ExamStatus::InProgress => stats.in_progress_exams += 1,
                ExamStatus::Completed => stats.completed_exams += 1,
            }
            if exam.is_overdue(now) {
                stats.overdue_exams += 1;
            }
        }
        stats.completed_contents = data.study_contents.iter().filter(|c| c.is_completed).count();

        let mut upcoming: Vec<(DateTime<Utc>, &Exam)> = data
            .exams
            .iter()
            .filter(|e| !e.is_completed())
            .filter_map(|e| e.due_at().map(|due| (due, e)))
            .filter(|(due, _)| *due >= now)
            .collect();
        upcoming.sort_by(|(a_due, a), (b_due, b)| a_due.cmp(b_due).then_with(|| a.title.cmp(&b.title)));
        stats.upcoming = upcoming
            .into_iter()
            .take(UPCOMING_LIMIT)
            .map(|(_, e)| e.clone())
            .collect();

        stats.by_subject = summarize_subjects(data);
        stats
    }

    /// Whole-number share of completed contents; 0 when there are none.
    pub fn completion_percent(&self) -> u8 {
        if self.contents == 0 {
            return 0;
        }
        ((self.completed_contents * 100) / self.contents) as u8
    }

    pub fn open_exams(&self) -> usize {
        self.pending_exams + self.in_progress_exams
    }
}

fn summarize_subjects(data: &DashboardData) -> Vec<SubjectSummary> {
    let mut summaries: Vec<SubjectSummary> = data
        .subjects
        .iter()
        .map(|s| SubjectSummary {
            subject_id: s.id.clone(),
            name: s.name.clone(),
            exams: 0,
            open_exams: 0,
            contents: 0,
            completed_contents: 0,
        })
        .collect();
    let index: HashMap<&str, usize> = data
        .subjects
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();

    for exam in &data.exams {
        if let Some(&i) = index.get(exam.subject_id.as_str()) {
            summaries[i].exams += 1;
            if !exam.is_completed() {
                summaries[i].open_exams += 1;
            }
        }
    }
    for content in &data.study_contents {
        if let Some(&i) = index.get(content.subject_id.as_str()) {
            summaries[i].contents += 1;
            if content.is_completed {
                summaries[i].completed_contents += 1;
            }
        }
    }

    summaries.sort_by(|a, b| compare_names(&a.name, &b.name));
    summaries
}

/// Case-insensitive, ties broken by the exact text.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
