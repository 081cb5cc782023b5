//! Adapter error taxonomy
//!
//! Every variant is fatal to the current operation; nothing here is retried
//! internally.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

use syndic_core::{AssetKind, CoreError};
use syndic_store::StoreError;
use thiserror::Error;

/// Which side of the callback lacked the anti-forgery token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSide {
    Request,
    Session,
}

impl Display for StateSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StateSide::Request => write!(f, "request"),
            StateSide::Session => write!(f, "session"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{vendor} adapter does not handle {kind} asset '{asset}'")]
    UnsupportedAsset {
        vendor: String,
        asset: String,
        kind: AssetKind,
    },

    #[error("Missing state from {vendor} {side}")]
    MissingState { vendor: String, side: StateSide },

    #[error("{vendor} session state and request state don't match")]
    StateMismatch { vendor: String },

    #[error("{vendor} authentication failed ({status}): {body}")]
    Authentication {
        vendor: String,
        status: u16,
        body: String,
    },

    #[error("{vendor} authentication already failed for this adapter")]
    AuthenticationLocked { vendor: String },

    #[error("Impossible to redirect to {location} from a non-interactive context")]
    RedirectUnavailable { location: String },

    /// The user-agent was sent to the vendor's authorization endpoint; the
    /// current call chain ends here and resumes on the callback request.
    #[error("{vendor} authorization pending, user-agent redirected to {location}")]
    AuthorizationPending { vendor: String, location: String },

    #[error("{vendor} API error ({status}): {message}")]
    Vendor {
        vendor: String,
        status: u16,
        message: String,
    },

    #[error("Failed to read asset content {path}: {source}")]
    AssetContent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CoreError> for AdapterError {
    fn from(err: CoreError) -> Self {
        AdapterError::Config(err.to_string())
    }
}

impl AdapterError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            AdapterError::UnsupportedAsset { .. } => "UNSUPPORTED_ASSET",
            AdapterError::MissingState { .. } => "MISSING_STATE",
            AdapterError::StateMismatch { .. } => "STATE_MISMATCH",
            AdapterError::Authentication { .. } => "AUTHENTICATION_FAILED",
            AdapterError::AuthenticationLocked { .. } => "AUTHENTICATION_LOCKED",
            AdapterError::RedirectUnavailable { .. } => "REDIRECT_UNAVAILABLE",
            AdapterError::AuthorizationPending { .. } => "AUTHORIZATION_PENDING",
            AdapterError::Vendor { .. } => "VENDOR_ERROR",
            AdapterError::AssetContent { .. } => "ASSET_CONTENT_ERROR",
            AdapterError::Http(_) => "HTTP_ERROR",
            AdapterError::Store(_) => "STORE_ERROR",
            AdapterError::Session(_) => "SESSION_ERROR",
            AdapterError::Config(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Whether the error means the call chain has to stop for user interaction.
    pub fn interrupts_chain(&self) -> bool {
        matches!(
            self,
            AdapterError::AuthorizationPending { .. } | AdapterError::RedirectUnavailable { .. }
        )
    }

    /// Whether the error came from the callback's anti-forgery check.
    pub fn is_csrf_failure(&self) -> bool {
        matches!(
            self,
            AdapterError::MissingState { .. } | AdapterError::StateMismatch { .. }
        )
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;
