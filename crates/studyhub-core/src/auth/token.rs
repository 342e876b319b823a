//! Client-side JWT inspection.
//!
//! Only the payload segment is decoded; the signature is never checked. The
//! result is a UX hint (skip the login screen, warn before expiry). The
//! server enforces authorization.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The claims we look at. Everything else in the payload is ignored.
///
/// Only `exp` decides validity; `iat` and `sub` of an unexpected type read
/// as absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claims {
    /// Expiry as seconds since the epoch (may be fractional).
    pub exp: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub iat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_subject")]
    pub sub: Option<String>,
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64())
}

/// Integer user ids are common; keep them as their decimal text.
fn lenient_subject<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt((self.exp * 1000.0) as i64).single()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        let iat = self.iat?;
        Utc.timestamp_millis_opt((iat * 1000.0) as i64).single()
    }
}

/// Decode the payload of a `header.payload.signature` token.
///
/// Returns `None` for anything malformed: wrong segment count, bad base64,
/// non-JSON payload, or a missing/non-numeric `exp`.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }
    let payload = segments[1].trim_end_matches('=');
    if payload.is_empty() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    claims.exp.is_finite().then_some(claims)
}

/// True when the token's `exp` lies after `now` (millisecond precision).
pub fn is_live_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Some(claims) => claims.exp * 1000.0 > now.timestamp_millis() as f64,
        None => false,
    }
}

pub fn is_live(token: &str) -> bool {
    is_live_at(token, Utc::now())
}
