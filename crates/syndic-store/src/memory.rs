use crate::keys::validate_key;
use crate::traits::{CredentialStore, IdentifierCache, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use syndic_core::{Credential, IdentifierMap, StoreBackend};
use tokio::sync::RwLock;

/// In-process store backing both collaborators.
///
/// Clones share the same maps, so one instance can be handed to several
/// owners and adapters within a process.
#[derive(Clone, Default)]
pub struct MemoryStore {
    credentials: Arc<RwLock<HashMap<String, Credential>>>,
    identifiers: Arc<RwLock<HashMap<String, IdentifierMap>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Credential>> {
        validate_key(key)?;
        Ok(self.credentials.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, credential: &Credential) -> StoreResult<()> {
        validate_key(key)?;
        self.credentials
            .write()
            .await
            .insert(key.to_string(), credential.clone());
        Ok(())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Memory
    }
}

#[async_trait]
impl IdentifierCache for MemoryStore {
    async fn fetch(&self, key: &str) -> StoreResult<Option<IdentifierMap>> {
        Ok(self.identifiers.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, map: &IdentifierMap) -> StoreResult<()> {
        self.identifiers
            .write()
            .await
            .insert(key.to_string(), map.clone());
        Ok(())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Memory
    }
}
