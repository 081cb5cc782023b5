//! Syndic Store Library
//!
//! Persistence for the two collaborators the adapters consume: the credential
//! store (one credential per owner and vendor) and the identifier cache (one
//! vendor-to-identifier map per asset).
//!
//! # Key format
//!
//! - **Credentials**: `accounts/{owner}/{vendor}`, both segments percent-encoded.
//! - **Identifier maps**: the asset identity, verbatim.
//!
//! Key generation is centralized in the `keys` module so all backends stay consistent.

pub mod encrypted;
pub mod factory;
pub mod keys;
#[cfg(feature = "store-local")]
pub mod local;
pub mod memory;
pub mod owner;
pub mod traits;

// Re-export commonly used types
pub use encrypted::EncryptedCredentialStore;
pub use factory::{create_stores, Stores};
#[cfg(feature = "store-local")]
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use owner::Owner;
pub use syndic_core::StoreBackend;
pub use traits::{CredentialStore, IdentifierCache, StoreError, StoreResult};
