//! User-facing (pt-BR) messages for API failures.
//!
//! The service does not send stable error codes, so known validation
//! messages are recognized by substring. This is best-effort: an unmatched
//! message is shown as the server wrote it.

/// Ordered `(all of these substrings, message)` pairs. First match wins.
const VALIDATION_REMAPS: &[(&[&str], &str)] = &[
    (&["Password", "min"], "A senha deve ter pelo menos 6 caracteres"),
    (&["Email"], "Digite um email válido"),
    (&["Name"], "O nome deve ter pelo menos 2 caracteres"),
];

pub const TRANSPORT_FAILURE: &str =
    "Não foi possível conectar ao servidor. Verifique sua conexão.";
pub const SESSION_EXPIRED: &str = "Sessão expirada. Faça login novamente.";
pub const SERVER_FAILURE: &str = "Erro no servidor. Tente novamente mais tarde.";
pub const INVALID_REQUEST: &str = "Requisição inválida.";
pub const UNEXPECTED_RESPONSE: &str = "Resposta inesperada do servidor.";
pub const STORAGE_FAILURE: &str = "Não foi possível salvar a sessão neste dispositivo.";
pub const LOGIN_FAILED: &str = "Erro ao fazer login";
pub const REGISTER_FAILED: &str = "Erro ao fazer cadastro";
pub const INVALID_CREDENTIALS: &str = "Email ou senha inválidos";

/// Map a server validation message to the localized text for known cases.
pub fn remap_validation_message(raw: &str) -> String {
    VALIDATION_REMAPS
        .iter()
        .find(|(needles, _)| needles.iter().all(|n| raw.contains(n)))
        .map(|(_, message)| (*message).to_string())
        .unwrap_or_else(|| raw.to_string())
}
