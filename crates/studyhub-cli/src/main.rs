//! studyhub - command-line front end for the study manager service.
//!
//! Each command is one screen of the web client: it restores the stored
//! session, makes its REST calls through `studyhub-core` and prints the
//! result.

mod commands;
mod format;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{attachments, auth, contents, dashboard, exams, references, students, subjects};
use studyhub_core::{
    ApiClient, Config, FileStore, KeyValueStore, KeyringStore, MemoryStore, RestoreOutcome,
    SessionManager, StorageBackend,
};

/// Log file prefix inside `<cache_dir>/logs`
const LOG_FILE: &str = "studyhub.log";

/// Study manager client
#[derive(Parser)]
#[command(name = "studyhub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API address, including the version path
    #[arg(long, global = true, env = "STUDYHUB_API_URL")]
    pub api_url: Option<String>,

    /// Identifier sent as X-Client-ID
    #[arg(long, global = true, env = "STUDYHUB_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Keep the session in memory only (nothing is written to disk)
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with email and password
    Login(auth::LoginArgs),

    /// Create an account and log in
    Register(auth::RegisterArgs),

    /// Forget the stored session
    Logout,

    /// Show who is logged in and until when
    Whoami,

    /// Exchange the refresh token for a new session
    Refresh,

    /// Check that the service is reachable
    Health,

    /// Overview of subjects, exams, contents, files and bibliography
    Dashboard,

    /// Subjects
    Subjects(subjects::SubjectsArgs),

    /// Exams, assignments, projects and quizzes
    Exams(exams::ExamsArgs),

    /// Study contents
    Contents(contents::ContentsArgs),

    /// Files attached to exams
    Attachments(attachments::AttachmentsArgs),

    /// Bibliography of exams
    References(references::ReferencesArgs),

    /// Student profiles
    Students(students::StudentsArgs),
}

/// Stderr (RUST_LOG, default `warn`) plus a daily log file in the cache dir.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("studyhub=debug,studyhub_core=debug,warn"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

fn open_store(config: &Config, ephemeral: bool) -> Result<Box<dyn KeyValueStore>> {
    if ephemeral {
        return Ok(Box::new(MemoryStore::new()));
    }
    Ok(match config.storage {
        StorageBackend::File => Box::new(FileStore::new(&config.cache_dir()?)),
        StorageBackend::Keyring => Box::new(KeyringStore::default()),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    config.apply_env();
    if let Some(url) = cli.api_url.clone() {
        config.api_url = Some(url);
    }
    if let Some(id) = cli.client_id.clone() {
        config.client_id = Some(id);
    }

    let log_dir = config.cache_dir().ok().map(|d| d.join("logs"));
    let _log_guard = init_tracing(log_dir.as_deref());
    info!("studyhub starting");

    let session = Arc::new(SessionManager::with_boxed_store(open_store(&config, cli.ephemeral)?));
    match session.restore() {
        RestoreOutcome::Restored(user) => debug!(user_id = %user.id, "Resuming stored session"),
        RestoreOutcome::Empty => debug!("No stored session"),
        RestoreOutcome::Purged(reason) => {
            warn!(%reason, "Discarded stored session");
            eprintln!("A sessão salva estava corrompida e foi removida. Faça login novamente.");
        }
    }

    let api = ApiClient::from_config(&config, session.clone())
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let mut ctx = commands::Context {
        config,
        session,
        api,
        json_output: cli.json,
    };

    match cli.command {
        Commands::Login(args) => auth::login(args, &mut ctx).await,
        Commands::Register(args) => auth::register(args, &mut ctx).await,
        Commands::Logout => auth::logout(&ctx),
        Commands::Whoami => auth::whoami(&ctx),
        Commands::Refresh => auth::refresh(&ctx).await,
        Commands::Health => commands::health(&ctx).await,
        Commands::Dashboard => dashboard::run(&ctx).await,
        Commands::Subjects(args) => subjects::run(args, &ctx).await,
        Commands::Exams(args) => exams::run(args, &ctx).await,
        Commands::Contents(args) => contents::run(args, &ctx).await,
        Commands::Attachments(args) => attachments::run(args, &ctx).await,
        Commands::References(args) => references::run(args, &ctx).await,
        Commands::Students(args) => students::run(args, &ctx).await,
    }
}
