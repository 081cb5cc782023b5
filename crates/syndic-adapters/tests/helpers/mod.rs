#![allow(dead_code)]

use mockito::{Mock, ServerGuard};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use syndic_adapters::{OAuthAdapter, Vendor};
use syndic_core::{Asset, Credential, IdentifierMap};
use syndic_store::{IdentifierCache, MemoryStore, Owner};
use tempfile::TempDir;

pub const OWNER: &str = "alice";

/// Mock vendor server, in-memory stores and a scratch directory with media files.
pub struct Harness {
    pub server: ServerGuard,
    pub store: MemoryStore,
    pub dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        Self {
            server: mockito::Server::new_async().await,
            store: MemoryStore::new(),
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn owner(&self) -> Owner {
        Owner::new(
            OWNER,
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
        )
    }

    /// Adapter whose vendor endpoints all live under `/{vendor}` on the mock server.
    pub fn adapter<V: Vendor>(&self) -> OAuthAdapter<V> {
        let base = format!("{}/{}", self.server.url(), slug::<V>());
        OAuthAdapter::from_value(
            self.owner(),
            &json!({
                "id": "client-id",
                "secret": "client-secret",
                "redirectUri": "https://app.test/callback",
                "authorizeUrl": format!("{}/authorize", base),
                "tokenUrl": format!("{}/token", base),
                "createUrl": format!("{}/videos", base),
                "resourceUrl": format!("{}/videos/{{id}}", base),
            }),
        )
        .expect("adapter configuration")
    }

    pub async fn authorize<V: Vendor>(&self, token: &str) {
        self.owner()
            .set_account(V::NAME, &Credential::bearer(token))
            .await
            .expect("store credential");
    }

    pub fn file(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, b"\x00\x00\x00\x18ftypmp42").expect("write media file");
        path
    }

    pub fn video(&self, id: &str) -> Asset {
        Asset::video(id, self.file(&format!("{}.mp4", id)))
            .expect("video asset")
            .with_title("Launch video")
    }

    pub async fn identifiers(&self, asset: &Asset) -> IdentifierMap {
        self.store
            .fetch(asset.id())
            .await
            .expect("fetch identifiers")
            .unwrap_or_default()
    }

    pub async fn mock_token<V: Vendor>(&mut self, access_token: &str, hits: usize) -> Mock {
        self.server
            .mock("POST", format!("/{}/token", slug::<V>()).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"access_token": access_token, "token_type": "bearer"}).to_string())
            .expect(hits)
            .create_async()
            .await
    }

    pub async fn mock_create<V: Vendor>(&mut self, body: serde_json::Value, hits: usize) -> Mock {
        self.server
            .mock("POST", format!("/{}/videos", slug::<V>()).as_str())
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await
    }

    pub async fn mock_resource<V: Vendor>(
        &mut self,
        method: &str,
        identifier: &str,
        hits: usize,
    ) -> Mock {
        self.server
            .mock(method, format!("/{}/videos/{}", slug::<V>(), identifier).as_str())
            .with_status(200)
            .with_body("{}")
            .expect(hits)
            .create_async()
            .await
    }
}

pub fn slug<V: Vendor>() -> String {
    V::NAME.to_lowercase()
}
