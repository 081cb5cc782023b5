#[cfg(feature = "store-local")]
use crate::LocalStore;
use crate::{
    CredentialStore, EncryptedCredentialStore, IdentifierCache, MemoryStore, StoreBackend,
    StoreResult,
};
#[cfg(not(feature = "store-local"))]
use crate::StoreError;
use std::sync::Arc;
use syndic_core::{EncryptionService, StoreConfig};

/// The two collaborators handed to an [`crate::Owner`].
#[derive(Clone)]
pub struct Stores {
    pub credentials: Arc<dyn CredentialStore>,
    pub identifiers: Arc<dyn IdentifierCache>,
}

/// Create the credential store and identifier cache based on configuration.
///
/// When an encryption service is given, credentials are sealed at rest.
pub async fn create_stores(
    config: &StoreConfig,
    encryption: Option<EncryptionService>,
) -> StoreResult<Stores> {
    let stores = match config.backend {
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            Stores {
                credentials: Arc::new(store.clone()),
                identifiers: Arc::new(store),
            }
        }

        #[cfg(feature = "store-local")]
        StoreBackend::Local => {
            let store = LocalStore::new(&config.local_path).await?;
            Stores {
                credentials: Arc::new(store.clone()),
                identifiers: Arc::new(store),
            }
        }

        #[cfg(not(feature = "store-local"))]
        StoreBackend::Local => {
            return Err(StoreError::ConfigError(
                "Local store backend not available (store-local feature not enabled)".to_string(),
            ))
        }
    };

    tracing::debug!(
        backend = %config.backend,
        encrypted = encryption.is_some(),
        "Stores created"
    );

    Ok(match encryption {
        Some(encryption) => Stores {
            credentials: Arc::new(EncryptedCredentialStore::new(stores.credentials, encryption)),
            identifiers: stores.identifiers,
        },
        None => stores,
    })
}
