//! The single owner of "who is logged in".
//!
//! `SessionManager` keeps the in-memory session and the durable store in
//! step. All mutation goes through `restore`, `login`, `register`,
//! `refresh` and `logout`; every one of them publishes a `SessionEvent`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::token;
use crate::api::{messages, ApiClient, ApiError};
use crate::models::{AuthResponse, Credentials, RegisterRequest, User};
use crate::status::ServiceStatus;
use crate::storage::{KeyValueStore, StoreError};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

/// Artifacts of careless persistence that mean "nothing stored".
const PLACEHOLDER_VALUES: [&str; 2] = ["undefined", "null"];

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl Session {
    /// Expiry from the token's `exp` claim, if it has a readable one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        token::decode_claims(&self.access_token)?.expires_at()
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        token::is_live_at(&self.access_token, now)
    }
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self {
            user: response.user,
            access_token: response.access_token,
            refresh_token: Some(response.refresh_token).filter(|t| !t.is_empty()),
        }
    }
}

/// Published on every session change. Subscribers always see the latest.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Nothing has happened yet (before `restore`).
    Initial,
    Restored(Option<User>),
    LoggedIn(User),
    Registered(User),
    Refreshed(User),
    LoggedOut,
}

impl SessionEvent {
    /// The user this event leaves logged in, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionEvent::Restored(user) => user.as_ref(),
            SessionEvent::LoggedIn(user)
            | SessionEvent::Registered(user)
            | SessionEvent::Refreshed(user) => Some(user),
            SessionEvent::Initial | SessionEvent::LoggedOut => None,
        }
    }
}

/// What `restore` found.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    Restored(User),
    /// Nothing stored.
    Empty,
    /// Stored state was partial or unreadable and has been removed.
    Purged(String),
}

pub struct SessionManager {
    store: Box<dyn KeyValueStore>,
    session: RwLock<Option<Session>>,
    // Held across store writes plus the in-memory swap
    write_lock: Mutex<()>,
    events: watch::Sender<SessionEvent>,
    status: ServiceStatus,
}

impl SessionManager {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self::with_boxed_store(Box::new(store))
    }

    pub fn with_boxed_store(store: Box<dyn KeyValueStore>) -> Self {
        let (events, _rx) = watch::channel(SessionEvent::Initial);
        Self {
            store,
            session: RwLock::new(None),
            write_lock: Mutex::new(()),
            events,
            status: ServiceStatus::new(),
        }
    }

    pub fn shared(store: impl KeyValueStore + 'static) -> Arc<Self> {
        Arc::new(Self::new(store))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Load the persisted session. Call once at startup.
    ///
    /// Never fails: missing, placeholder or unparseable entries leave the
    /// manager logged out with every session key removed.
    pub fn restore(&self) -> RestoreOutcome {
        let _write = self.write_lock.lock();

        let outcome = match self.read_persisted() {
            Ok(Some(session)) => {
                debug!(
                    user_id = %session.user.id,
                    live = session.is_live_at(Utc::now()),
                    "Session restored"
                );
                let user = session.user.clone();
                *self.session.write() = Some(session);
                RestoreOutcome::Restored(user)
            }
            Ok(None) => {
                *self.session.write() = None;
                RestoreOutcome::Empty
            }
            Err(reason) => {
                warn!(%reason, "Stored session is corrupt, purging");
                self.purge_persisted();
                *self.session.write() = None;
                RestoreOutcome::Purged(reason)
            }
        };

        let user = match &outcome {
            RestoreOutcome::Restored(user) => Some(user.clone()),
            _ => None,
        };
        self.events.send_replace(SessionEvent::Restored(user));
        outcome
    }

    /// `Ok(None)` when nothing is stored, `Err(reason)` for anything partial
    /// or unreadable.
    fn read_persisted(&self) -> Result<Option<Session>, String> {
        let mut raw = Vec::with_capacity(SESSION_KEYS.len());
        for key in SESSION_KEYS {
            let value = self
                .store
                .get(key)
                .map_err(|e| format!("cannot read '{}': {}", key, e))?;
            raw.push(value);
        }
        let any_stored = raw.iter().any(Option::is_some);
        let mut values = raw.into_iter().map(meaningful);
        let (token, refresh, user_json) = (
            values.next().flatten(),
            values.next().flatten(),
            values.next().flatten(),
        );

        let (token, user_json) = match (token, user_json) {
            (Some(token), Some(user_json)) => (token, user_json),
            _ if any_stored => return Err("incomplete session entries".to_string()),
            _ => return Ok(None),
        };

        let user: User = serde_json::from_str(&user_json)
            .map_err(|e| format!("user record unreadable: {}", e))?;

        if refresh.is_none() {
            // Placeholder refresh tokens are dropped; the session stands without one
            if let Err(e) = self.store.remove(REFRESH_TOKEN_KEY) {
                debug!(error = %e, "Failed to drop empty refresh token entry");
            }
        }

        Ok(Some(Session {
            user,
            access_token: token,
            refresh_token: refresh,
        }))
    }

    /// Exchange credentials for a session.
    ///
    /// On failure nothing persisted changes and the error is also published
    /// on `status()` as a form message.
    pub async fn login(&self, api: &ApiClient, credentials: &Credentials) -> Result<User, ApiError> {
        let _loading = self.status.begin();
        let result = match api.auth().login(credentials).await {
            Ok(response) => self.establish(response, SessionEvent::LoggedIn),
            Err(e) => Err(e),
        };
        self.record(result, messages::LOGIN_FAILED)
    }

    pub async fn register(&self, api: &ApiClient, request: &RegisterRequest) -> Result<User, ApiError> {
        let _loading = self.status.begin();
        let result = match api.auth().register(request).await {
            Ok(response) => self.establish(response, SessionEvent::Registered),
            Err(e) => Err(e),
        };
        self.record(result, messages::REGISTER_FAILED)
    }

    /// Trade the stored refresh token for a new token pair. A rejected
    /// refresh token ends the session.
    pub async fn refresh(&self, api: &ApiClient) -> Result<User, ApiError> {
        let Some(refresh_token) = self.refresh_token() else {
            return Err(ApiError::Unauthorized {
                status: 401,
                message: "no refresh token stored".to_string(),
            });
        };

        let _loading = self.status.begin();
        let result = match api.auth().refresh(&refresh_token).await {
            Ok(response) => self.establish(response, SessionEvent::Refreshed),
            Err(e) => {
                if e.is_unauthorized() {
                    info!("Refresh token rejected, logging out");
                    self.logout_if_refresh_token(&refresh_token);
                }
                Err(e)
            }
        };
        match result {
            Ok(user) => Ok(user),
            Err(e) => {
                self.status.set_error(e.user_message());
                Err(e)
            }
        }
    }

    fn record(&self, result: Result<User, ApiError>, fallback: &str) -> Result<User, ApiError> {
        if let Err(ref e) = result {
            error!(error = %e, "Authentication failed");
            self.status.set_error(e.auth_message(fallback));
        }
        result
    }

    /// Persist a fresh token pair and user, then swap the in-memory session.
    pub(crate) fn establish(
        &self,
        response: AuthResponse,
        event: fn(User) -> SessionEvent,
    ) -> Result<User, ApiError> {
        let user_json = serde_json::to_string(&response.user).map_err(StoreError::from)?;
        let session = Session::from(response);

        let _write = self.write_lock.lock();
        let entries = [
            (ACCESS_TOKEN_KEY, Some(session.access_token.as_str())),
            (REFRESH_TOKEN_KEY, session.refresh_token.as_deref()),
            (USER_KEY, Some(user_json.as_str())),
        ];
        self.persist_all(&entries)?;

        let user = session.user.clone();
        *self.session.write() = Some(session);
        info!(user_id = %user.id, "Session established");
        self.events.send_replace(event(user.clone()));
        Ok(user)
    }

    /// Write every entry or none of them. On failure each key goes back to
    /// the value it had before the call.
    fn persist_all(&self, entries: &[(&str, Option<&str>)]) -> Result<(), StoreError> {
        let snapshot: Vec<(&str, Option<String>)> = entries
            .iter()
            .map(|(key, _)| (*key, self.store.get(key).ok().flatten()))
            .collect();

        for (key, value) in entries {
            let written = match value {
                Some(value) => self.store.set(key, value),
                None => self.store.remove(key),
            };
            if let Err(e) = written {
                warn!(key = *key, error = %e, "Session write failed, rolling back");
                self.roll_back(&snapshot);
                return Err(e);
            }
        }
        Ok(())
    }

    fn roll_back(&self, snapshot: &[(&str, Option<String>)]) {
        for (key, previous) in snapshot {
            let restored = match previous {
                Some(value) => self.store.set(key, value),
                None => self.store.remove(key),
            };
            if let Err(e) = restored {
                error!(key = *key, error = %e, "Failed to roll back session entry");
            }
        }
    }

    /// Forget the session everywhere. Safe to call any number of times.
    pub fn logout(&self) {
        let _write = self.write_lock.lock();
        self.clear_locked();
    }

    /// Log out only if `token` is still the access token in use. A rejection
    /// of a token that a refresh or new login has already replaced leaves
    /// the newer session alone. Returns whether the session was ended.
    pub fn logout_if_token(&self, token: &str) -> bool {
        let _write = self.write_lock.lock();
        let current = self
            .session
            .read()
            .as_ref()
            .is_some_and(|s| s.access_token == token);
        if !current {
            debug!("Ignoring rejection of a superseded token");
            return false;
        }
        self.clear_locked();
        true
    }

    /// Same guard for a rejected refresh token.
    fn logout_if_refresh_token(&self, refresh_token: &str) {
        let _write = self.write_lock.lock();
        let current = self
            .session
            .read()
            .as_ref()
            .is_some_and(|s| s.refresh_token.as_deref() == Some(refresh_token));
        if current {
            self.clear_locked();
        }
    }

    // Caller holds `write_lock`
    fn clear_locked(&self) {
        self.purge_persisted();
        let had_session = self.session.write().take().is_some();
        if had_session {
            info!("Logged out");
        }
        self.events.send_replace(SessionEvent::LoggedOut);
    }

    fn purge_persisted(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to remove session entry");
            }
        }
    }

    // =========================================================================
    // Queries (no I/O)
    // =========================================================================

    pub fn session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.read().as_ref().map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.session.read().as_ref().and_then(|s| s.refresh_token.clone())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.session.read().as_ref().and_then(Session::expires_at)
    }

    /// Advisory: the server may still reject a token we think is live.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.session
            .read()
            .as_ref()
            .map(|s| s.is_live_at(now))
            .unwrap_or(false)
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn last_event(&self) -> SessionEvent {
        self.events.borrow().clone()
    }

    pub fn status(&self) -> &ServiceStatus {
        &self.status
    }

    pub fn clear_error(&self) {
        self.status.clear_error();
    }
}

/// Drop empty and placeholder values.
fn meaningful(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        let trimmed = v.trim();
        !trimmed.is_empty() && !PLACEHOLDER_VALUES.contains(&trimmed)
    })
}
