use crate::keys::credential_key;
use crate::traits::{CredentialStore, IdentifierCache, StoreResult};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use syndic_core::Credential;

/// Principal on whose behalf assets are distributed.
///
/// Holds the handles to the credential store (its vendor accounts) and the
/// identifier cache. Lifecycle is managed by the host; adapters receive a
/// clone at construction.
#[derive(Clone)]
pub struct Owner {
    id: String,
    accounts: Arc<dyn CredentialStore>,
    cache: Arc<dyn IdentifierCache>,
}

impl Owner {
    pub fn new(
        id: impl Into<String>,
        accounts: Arc<dyn CredentialStore>,
        cache: Arc<dyn IdentifierCache>,
    ) -> Self {
        Self {
            id: id.into(),
            accounts,
            cache,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stored credential for a vendor, if the owner ever authorized it.
    pub async fn account(&self, vendor: &str) -> StoreResult<Option<Credential>> {
        self.accounts.get(&credential_key(&self.id, vendor)).await
    }

    /// Store (or replace) the owner's credential for a vendor.
    pub async fn set_account(&self, vendor: &str, credential: &Credential) -> StoreResult<()> {
        self.accounts
            .set(&credential_key(&self.id, vendor), credential)
            .await
    }

    pub fn cache(&self) -> &Arc<dyn IdentifierCache> {
        &self.cache
    }
}

impl Debug for Owner {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Owner")
            .field("id", &self.id)
            .field("accounts", &self.accounts.backend_type())
            .field("cache", &self.cache.backend_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, StoreError};

    fn owner(id: &str, store: &MemoryStore) -> Owner {
        Owner::new(id, Arc::new(store.clone()), Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn accounts_are_isolated_per_owner_and_vendor() {
        let store = MemoryStore::new();
        let alice = owner("alice", &store);
        let bob = owner("bob", &store);

        alice
            .set_account("Vimeo", &Credential::bearer("alice-vimeo"))
            .await
            .unwrap();

        assert_eq!(
            alice.account("Vimeo").await.unwrap().unwrap().access_token,
            "alice-vimeo"
        );
        assert!(alice.account("YouTube").await.unwrap().is_none());
        assert!(bob.account("Vimeo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dot_and_empty_owner_ids_cannot_hold_accounts() {
        let store = MemoryStore::new();
        let dot = owner(".", &store);
        let empty = owner("", &store);

        let result = dot.set_account("Vimeo", &Credential::bearer("dot-token")).await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));
        assert!(matches!(
            empty.account("Vimeo").await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
