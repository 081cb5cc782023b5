//! Store abstraction traits
//!
//! Absent entries are `Ok(None)`, never errors; only real I/O or decoding
//! failures surface as `StoreError`.

use async_trait::async_trait;
use syndic_core::{CoreError, Credential, IdentifierMap, StoreBackend};
use thiserror::Error;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Invalid store key: {0}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Encryption(msg) => StoreError::Encryption(msg),
            CoreError::Serialization(e) => StoreError::Serialization(e),
            CoreError::Config(msg) | CoreError::InvalidInput(msg) => StoreError::ConfigError(msg),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Per-owner, per-vendor credential persistence.
///
/// Keys are opaque to the store; callers derive them with
/// [`crate::keys::credential_key`]. `set` replaces any previous credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<Credential>>;

    async fn set(&self, key: &str, credential: &Credential) -> StoreResult<()>;

    fn backend_type(&self) -> StoreBackend;
}

/// Per-asset identifier map persistence.
///
/// `save` writes the whole map; there is no partial update, so a
/// read-modify-write from two processes is last-writer-wins.
#[async_trait]
pub trait IdentifierCache: Send + Sync {
    async fn fetch(&self, key: &str) -> StoreResult<Option<IdentifierMap>>;

    async fn save(&self, key: &str, map: &IdentifierMap) -> StoreResult<()>;

    fn backend_type(&self) -> StoreBackend;
}
