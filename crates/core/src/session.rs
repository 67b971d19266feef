//! Advisory session check performed before submitting an order.
//!
//! This only decides whether the client should attempt the call or send the
//! customer to the login page first. The platform validates the token; the
//! signature is never checked here.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::types::Timestamp;

/// Source of the locally stored session token.
pub trait SessionProvider: Send + Sync {
    /// The stored token, if any.
    fn token(&self) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT without verifying it. `None` for opaque
/// tokens and for JWTs without an expiry.
fn token_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()?
        .claims
        .exp
}

/// A token counts as live when it is non-blank and, if it carries an `exp`
/// claim, that expiry is still in the future.
pub fn is_token_live(token: &str, now: Timestamp) -> bool {
    let token = token.trim();
    if token.is_empty() {
        return false;
    }
    match token_expiry(token) {
        Some(exp) => exp > now.timestamp(),
        None => true,
    }
}

/// The stored token when it is live, `None` otherwise.
pub fn live_token<S: SessionProvider + ?Sized>(sessions: &S, now: Timestamp) -> Option<String> {
    sessions
        .token()
        .map(|t| t.trim().to_string())
        .filter(|t| is_token_live(t, now))
}

/// Whether a live session is present.
pub fn has_live_session<S: SessionProvider + ?Sized>(sessions: &S, now: Timestamp) -> bool {
    live_token(sessions, now).is_some()
}
