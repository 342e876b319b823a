//! REST API access.
//!
//! - `ApiClient`: transport, headers, base URL, error classification
//! - `ApiError`: transport / unauthorized / validation / server failures
//! - `messages`: localized text for the views
//! - one endpoint group per resource family

pub mod client;
pub mod error;
pub mod messages;

mod attachments;
mod auth;
mod exams;
mod health;
mod references;
mod students;
mod study_contents;
mod subjects;

pub use attachments::AttachmentsApi;
pub use auth::AuthApi;
pub use client::{ApiClient, ClientBuilder};
pub use error::ApiError;
pub use exams::ExamsApi;
pub use health::HealthApi;
pub use references::ReferencesApi;
pub use students::StudentsApi;
pub use study_contents::StudyContentsApi;
pub use subjects::SubjectsApi;
