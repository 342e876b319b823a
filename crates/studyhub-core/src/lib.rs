//! studyhub core library.
//!
//! A typed client for the study manager REST API:
//!
//! - `auth`: the `SessionManager` (who is logged in, persisted across runs)
//!   and advisory JWT expiry checks
//! - `api`: the `ApiClient` and one endpoint group per resource family
//! - `models`: entities and request bodies exchanged with the service
//! - `dashboard`: concurrent overview loading and statistics
//! - `view`: stale-result guards and list/state holders for front ends
//! - `storage`: where the session lives between runs
//! - `config`: on-disk configuration and base URL resolution

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod status;
pub mod storage;
pub mod view;

pub use api::{ApiClient, ApiError};
pub use auth::{RestoreOutcome, SessionEvent, SessionManager};
pub use config::{ApiEndpoint, Config, StorageBackend};
pub use dashboard::{DashboardData, DashboardStats, Dataset};
pub use status::{ServiceStatus, StatusSnapshot};
pub use storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore, StoreError};
pub use view::{LoadTicket, ResourceList, ViewScope, ViewState};
