//! CLI command handlers.

pub mod attachments;
pub mod auth;
pub mod contents;
pub mod dashboard;
pub mod exams;
pub mod references;
pub mod students;
pub mod subjects;

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use tracing::debug;

use studyhub_core::api::messages;
use studyhub_core::{ApiClient, ApiError, Config, SessionManager, ViewScope, ViewState};

/// Shared context for all commands.
pub struct Context {
    pub config: Config,
    pub session: Arc<SessionManager>,
    pub api: ApiClient,
    /// Output as JSON for scripting.
    pub json_output: bool,
}

impl Context {
    /// Make sure there is a usable session, refreshing an expired one when a
    /// refresh token is stored.
    pub async fn require_session(&self) -> Result<()> {
        if self.session.is_authenticated() {
            return Ok(());
        }
        if self.session.refresh_token().is_some() {
            debug!("Access token expired, trying refresh");
            if self.session.refresh(&self.api).await.is_ok() {
                return Ok(());
            }
        }
        bail!(messages::SESSION_EXPIRED)
    }

    pub fn print<T, F>(&self, value: &T, human: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce(&T),
    {
        if self.json_output {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Turn an API failure into the message a user should read.
pub trait UserFacing<T> {
    fn or_user_message(self) -> Result<T>;
}

impl<T> UserFacing<T> for std::result::Result<T, ApiError> {
    fn or_user_message(self) -> Result<T> {
        self.map_err(|e| {
            debug!(error = %e, "Command failed");
            anyhow!(e.user_message())
        })
    }
}

/// Run one load the way a screen does: through a `ViewState` guarded by a
/// fresh `ViewScope`.
pub async fn load_view<T, F>(load: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, ApiError>>,
{
    let scope = ViewScope::new();
    let mut state = ViewState::new();
    let ticket = state.start(&scope);
    state.apply(&ticket, load.await);
    match (state.data, state.error) {
        (Some(data), _) => Ok(data),
        (None, Some(error)) => Err(anyhow!(error)),
        (None, None) => Err(anyhow!(messages::UNEXPECTED_RESPONSE)),
    }
}

pub async fn health(ctx: &Context) -> Result<()> {
    let body = ctx.api.health().check().await.or_user_message()?;
    ctx.print(&body, |body| {
        println!("Serviço disponível em {}", ctx.api.base_url());
        if let Some(status) = body.get("status").and_then(|s| s.as_str()) {
            println!("Status: {}", status);
        }
    })
}

/// Read one line from stdin after printing `label`.
pub fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
