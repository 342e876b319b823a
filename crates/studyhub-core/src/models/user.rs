//! Account and authentication models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum password length accepted by the registration form.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum (trimmed) name length accepted by the registration form.
pub const MIN_NAME_LEN: usize = 2;

/// The authenticated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body returned by every auth endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Login credentials. Only lives for the duration of one submission.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST auth/register`.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST auth/refresh`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Registration input as typed by the user, including the confirmation field
/// that never leaves the client.
#[derive(Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Run the local checks and produce the request body, or the localized
    /// message to show next to the form.
    pub fn validate(&self) -> Result<RegisterRequest, String> {
        if self.name.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err("Todos os campos são obrigatórios".to_string());
        }
        if self.password != self.confirm_password {
            return Err("As senhas não coincidem".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "A senha deve ter pelo menos {} caracteres",
                MIN_PASSWORD_LEN
            ));
        }
        if !looks_like_email(&self.email) {
            return Err("Digite um email válido".to_string());
        }
        if self.name.trim().chars().count() < MIN_NAME_LEN {
            return Err(format!(
                "O nome deve ter pelo menos {} caracteres",
                MIN_NAME_LEN
            ));
        }

        Ok(RegisterRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

/// `local@host.tld` with no whitespace and exactly one `@`.
pub fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Some dot with text on both sides; further dots anywhere are fine
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
