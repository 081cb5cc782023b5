//! Credential store wrapper that seals token fields at rest.

use crate::traits::{CredentialStore, StoreResult};
use async_trait::async_trait;
use std::sync::Arc;
use syndic_core::{Credential, EncryptionService, StoreBackend};

/// Wraps any credential store and seals `access_token` / `refresh_token`
/// before they reach the backend. Tokens are bound to their store key.
#[derive(Clone)]
pub struct EncryptedCredentialStore {
    inner: Arc<dyn CredentialStore>,
    encryption: EncryptionService,
}

impl EncryptedCredentialStore {
    pub fn new(inner: Arc<dyn CredentialStore>, encryption: EncryptionService) -> Self {
        Self { inner, encryption }
    }
}

#[async_trait]
impl CredentialStore for EncryptedCredentialStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Credential>> {
        let Some(mut credential) = self.inner.get(key).await? else {
            return Ok(None);
        };

        credential.access_token = self.encryption.open(&credential.access_token, key)?;
        if let Some(refresh) = credential.refresh_token.take() {
            credential.refresh_token = Some(self.encryption.open(&refresh, key)?);
        }

        Ok(Some(credential))
    }

    async fn set(&self, key: &str, credential: &Credential) -> StoreResult<()> {
        let mut sealed = credential.clone();
        sealed.access_token = self.encryption.seal(&credential.access_token, key)?;
        if let Some(refresh) = &credential.refresh_token {
            sealed.refresh_token = Some(self.encryption.seal(refresh, key)?);
        }

        self.inner.set(key, &sealed).await
    }

    fn backend_type(&self) -> StoreBackend {
        self.inner.backend_type()
    }
}
