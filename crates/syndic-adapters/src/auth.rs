//! Authorization-code state machine support.
//!
//! ```text
//! Unauthenticated ──redirect──▶ AwaitingCallback ──code + state ok──▶ Authenticated
//!                                      │
//!                                      └──token endpoint rejects──▶ AuthenticationFailed
//! ```
//!
//! The transitions themselves live in [`crate::oauth::OAuthAdapter`]; this
//! module holds the state enum and the anti-forgery token helpers.

use std::fmt::{Display, Formatter, Result as FmtResult};
use subtle::ConstantTimeEq;

use crate::error::{AdapterError, AdapterResult, StateSide};

/// Authentication state of one adapter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    /// A redirect to the authorization endpoint was issued.
    AwaitingCallback,
    Authenticated,
    /// The token endpoint rejected the code (terminal).
    AuthenticationFailed,
}

impl AuthState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuthState::AuthenticationFailed)
    }
}

impl Display for AuthState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AuthState::Unauthenticated => write!(f, "unauthenticated"),
            AuthState::AwaitingCallback => write!(f, "awaiting_callback"),
            AuthState::Authenticated => write!(f, "authenticated"),
            AuthState::AuthenticationFailed => write!(f, "authentication_failed"),
        }
    }
}

/// Session key holding a vendor's pending anti-forgery token.
pub fn state_session_key(vendor: &str) -> String {
    format!("{}_state", vendor.to_lowercase())
}

/// Fresh single-use anti-forgery token (128 random bits, hex).
pub fn generate_state() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

/// Check the callback's `state` against the one stored before the redirect.
///
/// Both must be present and byte-for-byte equal.
pub fn verify_state(
    vendor: &str,
    request_state: Option<&str>,
    session_state: Option<&str>,
) -> AdapterResult<()> {
    let request_state = request_state
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AdapterError::MissingState {
            vendor: vendor.to_string(),
            side: StateSide::Request,
        })?;

    let session_state = session_state
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AdapterError::MissingState {
            vendor: vendor.to_string(),
            side: StateSide::Session,
        })?;

    if !bool::from(request_state.as_bytes().ct_eq(session_state.as_bytes())) {
        return Err(AdapterError::StateMismatch {
            vendor: vendor.to_string(),
        });
    }

    Ok(())
}
