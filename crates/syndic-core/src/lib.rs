//! Syndic Core Library
//!
//! This crate provides the domain models, error types, vendor configuration and
//! encryption helpers shared by every Syndic component.

pub mod config;
pub mod encryption;
pub mod error;
pub mod models;
pub mod store_types;

// Re-export commonly used types
pub use config::{StoreConfig, VendorConfig, VendorEndpoints};
pub use encryption::EncryptionService;
pub use error::{CoreError, CoreResult};
pub use models::{Asset, AssetKind, Credential, IdentifierMap};
pub use store_types::StoreBackend;
