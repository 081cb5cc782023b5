use crate::keys::validate_key;
use crate::traits::{CredentialStore, IdentifierCache, StoreError, StoreResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use syndic_core::{Credential, IdentifierMap, StoreBackend};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem store, one JSON document per key.
///
/// Layout under the base directory:
/// - `accounts/{owner}/{vendor}.json`
/// - `identifiers/{percent-encoded asset identity}.json`
#[derive(Clone, Debug)]
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at `base_path`, creating it if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StoreError::ConfigError(format!(
                "Failed to create store directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStore { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_to_path(&self, relative: &str) -> StoreResult<PathBuf> {
        validate_key(relative)?;
        Ok(self.base_path.join(relative))
    }

    fn credential_path(&self, key: &str) -> StoreResult<PathBuf> {
        self.key_to_path(&format!("{}.json", key))
    }

    fn identifier_path(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(
                "Identifier key cannot be empty".to_string(),
            ));
        }
        self.key_to_path(&format!("identifiers/{}.json", urlencoding::encode(key)))
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> StoreResult<Option<T>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::ReadFailed(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Write through a sibling temp file and rename, so readers never see a
    /// half-written document.
    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&tmp).await.map_err(|e| {
            StoreError::WriteFailed(format!("Failed to create file {}: {}", tmp.display(), e))
        })?;
        file.write_all(&data).await.map_err(|e| {
            StoreError::WriteFailed(format!("Failed to write file {}: {}", tmp.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StoreError::WriteFailed(format!("Failed to sync file {}: {}", tmp.display(), e))
        })?;
        drop(file);

        fs::rename(&tmp, path).await.map_err(|e| {
            StoreError::WriteFailed(format!(
                "Failed to move {} into place: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local store write successful"
        );

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for LocalStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Credential>> {
        let path = self.credential_path(key)?;
        self.read_json(&path).await
    }

    async fn set(&self, key: &str, credential: &Credential) -> StoreResult<()> {
        let path = self.credential_path(key)?;
        self.write_json(&path, credential).await
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Local
    }
}

#[async_trait]
impl IdentifierCache for LocalStore {
    async fn fetch(&self, key: &str) -> StoreResult<Option<IdentifierMap>> {
        let path = self.identifier_path(key)?;
        self.read_json(&path).await
    }

    async fn save(&self, key: &str, map: &IdentifierMap) -> StoreResult<()> {
        let path = self.identifier_path(key)?;
        self.write_json(&path, map).await
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Local
    }
}

#[cfg(all(test, feature = "store-local"))]
mod tests {
    use super::*;
    use crate::keys::credential_key;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_credentials_persist_across_instances() {
        let dir = tempdir().unwrap();
        let key = credential_key("alice", "Vimeo");

        let store = LocalStore::new(dir.path()).await.unwrap();
        store.set(&key, &Credential::bearer("token-1")).await.unwrap();

        let reopened = LocalStore::new(dir.path()).await.unwrap();
        let credential = reopened.get(&key).await.unwrap().unwrap();
        assert_eq!(credential.access_token, "token-1");
        assert!(dir.path().join("accounts/alice/Vimeo.json").exists());
    }

    #[tokio::test]
    async fn test_missing_entries_are_none() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        assert!(store.get("accounts/nobody/Vimeo").await.unwrap().is_none());
        assert!(store.fetch("never-uploaded").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identifier_keys_with_slashes_stay_in_one_file() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        let mut map = IdentifierMap::new();
        map.insert("Vimeo", "/videos/1");
        store.save("catalog/../video-42", &map).await.unwrap();

        assert_eq!(store.fetch("catalog/../video-42").await.unwrap(), Some(map));
        assert!(dir
            .path()
            .join("identifiers/catalog%2F..%2Fvideo-42.json")
            .exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        let result = store.get("../../../etc/passwd").await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));

        let result = store.set("/etc/passwd", &Credential::bearer("x")).await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_dot_and_empty_owners_do_not_share_a_file() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        let result = store
            .set(&credential_key(".", "Vimeo"), &Credential::bearer("dot-token"))
            .await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));

        let result = store.get(&credential_key("", "Vimeo")).await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));

        assert!(!dir.path().join("accounts/Vimeo.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error_not_absent() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        std::fs::create_dir_all(dir.path().join("identifiers")).unwrap();
        std::fs::write(dir.path().join("identifiers/broken.json"), b"{not json").unwrap();

        let result = store.fetch("broken").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
