//! Data models for the study manager API.
//!
//! This module contains the structures exchanged with the remote service:
//!
//! - `User`, `AuthResponse`, `Credentials`: accounts and authentication
//! - `Student`, `Subject`: who studies what
//! - `Exam`, `ExamDetails`: exams, assignments, projects and quizzes
//! - `StudyContent`: per-subject study topics with completion and ordering
//! - `Attachment`: files uploaded against an exam
//! - `ExamReference`: bibliography entries
//!
//! All of these are transient copies. The remote service owns the data.

pub mod attachment;
pub mod exam;
pub mod reference;
pub mod study_content;
pub mod subject;
pub mod user;

pub use attachment::{Attachment, StudyFile, UploadFile};
pub use exam::{CreateExamRequest, Exam, ExamDetails, ExamKind, ExamStatus, UpdateExamRequest};
pub use reference::{
    BibliographyItem, CreateExamReferenceRequest, ExamReference, ReferenceKind,
    UpdateExamReferenceRequest,
};
pub use study_content::{
    ContentPosition, CreateStudyContentRequest, ReorderRequest, StudyContent,
    UpdateStudyContentRequest,
};
pub use subject::{
    CreateStudentRequest, CreateSubjectRequest, Student, Subject, SubjectWithExams,
    UpdateStudentRequest, UpdateSubjectRequest,
};
pub use user::{AuthResponse, Credentials, RefreshRequest, RegisterRequest, RegistrationForm, User};

/// Entities addressed by an opaque server-assigned id.
pub trait Resource {
    fn id(&self) -> &str;
}
