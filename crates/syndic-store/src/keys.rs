//! Shared key generation for store backends.

use crate::{StoreError, StoreResult};
use syndic_core::Asset;

/// Credential key for an (owner, vendor) pair: `accounts/{owner}/{vendor}`.
pub fn credential_key(owner: &str, vendor: &str) -> String {
    format!(
        "accounts/{}/{}",
        urlencoding::encode(owner),
        urlencoding::encode(vendor)
    )
}

/// Identifier cache key for an asset: its identity.
pub fn identifier_key(asset: &Asset) -> String {
    asset.id().to_string()
}

/// Reject keys that are empty or could escape a base directory.
///
/// Empty and `.` segments are rejected as well: a filesystem backend would
/// collapse them, so `accounts/./Vimeo` and `accounts//Vimeo` would share a file.
pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    if key.trim().is_empty() {
        return Err(StoreError::InvalidKey("Store key cannot be empty".to_string()));
    }

    if key.contains('\\')
        || key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StoreError::InvalidKey(format!(
            "Store key contains invalid segments: {}",
            key
        )));
    }

    Ok(())
}
