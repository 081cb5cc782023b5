//! OAuth-backed adapter, generic over a vendor tag
//!
//! The adapter memoizes its vendor client, attaches the owner's stored
//! credential when one is usable, and otherwise drives the authorization-code
//! flow through the [`AuthContext`] of the current request. The check-then-act
//! on the client slot is not safe under concurrent first access; an adapter
//! belongs to one request.

use async_trait::async_trait;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use syndic_core::{Asset, Credential, VendorConfig};
use syndic_store::keys::identifier_key;
use syndic_store::Owner;

use crate::adapter::{Adapter, Distribution, DistributionAction};
use crate::auth::{generate_state, state_session_key, verify_state, AuthState};
use crate::client::VendorClient;
use crate::context::AuthContext;
use crate::error::{AdapterError, AdapterResult};
use crate::vendors::Vendor;

pub struct OAuthAdapter<V: Vendor> {
    owner: Owner,
    config: VendorConfig,
    client: Option<VendorClient>,
    credentials: Option<Credential>,
    state: AuthState,
    _vendor: PhantomData<fn() -> V>,
}

impl<V: Vendor> Debug for OAuthAdapter<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OAuthAdapter")
            .field("vendor", &V::NAME)
            .field("owner", &self.owner.id())
            .field("state", &self.state)
            .field("client_built", &self.client.is_some())
            .finish()
    }
}

impl<V: Vendor> OAuthAdapter<V> {
    pub fn new(owner: Owner, config: VendorConfig) -> AdapterResult<Self> {
        if !config.vendor.eq_ignore_ascii_case(V::NAME) {
            return Err(AdapterError::Config(format!(
                "Configuration for '{}' given to the {} adapter",
                config.vendor,
                V::NAME
            )));
        }
        config.validate()?;

        Ok(Self {
            owner,
            config,
            client: None,
            credentials: None,
            state: AuthState::Unauthenticated,
            _vendor: PhantomData,
        })
    }

    /// Build from a host-supplied JSON object (`id`, `secret`, `redirectUri`, ...).
    pub fn from_value(owner: Owner, value: &serde_json::Value) -> AdapterResult<Self> {
        let config = VendorConfig::from_value(V::NAME, &V::ENDPOINTS, value)?;
        Self::new(owner, config)
    }

    /// Build from `{VENDOR}_CLIENT_ID`, `{VENDOR}_CLIENT_SECRET`, ... variables.
    pub fn from_env(owner: Owner) -> AdapterResult<Self> {
        let config = VendorConfig::from_env(V::NAME, &V::ENDPOINTS)?;
        Self::new(owner, config)
    }

    pub fn configuration(&self) -> &VendorConfig {
        &self.config
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Owner's credential for this vendor, read from the store at most once.
    pub async fn credentials(&mut self) -> AdapterResult<Option<Credential>> {
        if self.credentials.is_none() {
            self.credentials = self.owner.account(V::NAME).await?;
            tracing::debug!(
                vendor = V::NAME,
                owner = %self.owner.id(),
                found = self.credentials.is_some(),
                "Credential read from owner accounts"
            );
        }
        Ok(self.credentials.clone())
    }

    /// Persist a credential for this (owner, vendor) pair and keep it cached.
    pub async fn set_credentials(&mut self, credential: Credential) -> AdapterResult<()> {
        self.owner.set_account(V::NAME, &credential).await?;
        self.credentials = Some(credential);

        tracing::debug!(
            vendor = V::NAME,
            owner = %self.owner.id(),
            "Credential saved"
        );
        Ok(())
    }

    /// The vendor client, built on first use.
    ///
    /// Runs the authorization flow unless a usable credential is attached. Once
    /// authenticated, later calls return the same client without any network
    /// round-trip.
    pub async fn client(&mut self, ctx: &mut AuthContext<'_>) -> AdapterResult<&VendorClient> {
        if self.state.is_terminal() {
            return Err(AdapterError::AuthenticationLocked {
                vendor: V::NAME.to_string(),
            });
        }

        if self.client.is_none() {
            let mut client = VendorClient::new(self.config.clone())?;
            match self.credentials().await? {
                Some(credential) if credential.is_usable() => {
                    client.set_token(credential.access_token);
                    self.state = AuthState::Authenticated;
                }
                Some(_) => {
                    tracing::debug!(
                        vendor = V::NAME,
                        owner = %self.owner.id(),
                        "Stored credential unusable, re-authorizing"
                    );
                }
                None => {}
            }
            self.client = Some(client);
        }

        if self.state != AuthState::Authenticated {
            self.run_authentication(ctx).await?;
        }

        self.built_client()
    }

    fn built_client(&self) -> AdapterResult<&VendorClient> {
        self.client.as_ref().ok_or_else(|| {
            AdapterError::Config(format!("{} client was not initialized", V::NAME))
        })
    }

    async fn run_authentication(&mut self, ctx: &mut AuthContext<'_>) -> AdapterResult<()> {
        let session_key = state_session_key(V::NAME);

        if let Some(code) = ctx.request.query("code").map(str::to_string) {
            let session_state = ctx.session.get(&session_key).await?;
            if let Err(err) = verify_state(
                V::NAME,
                ctx.request.query("state"),
                session_state.as_deref(),
            ) {
                tracing::warn!(
                    vendor = V::NAME,
                    owner = %self.owner.id(),
                    error = %err,
                    "Rejected authorization callback"
                );
                return Err(err);
            }

            let credential = match self.built_client()?.exchange_code(&code).await {
                Ok(credential) => credential,
                Err(err @ AdapterError::Authentication { .. }) => {
                    self.state = AuthState::AuthenticationFailed;
                    tracing::error!(
                        vendor = V::NAME,
                        owner = %self.owner.id(),
                        error = %err,
                        "Authorization code exchange rejected"
                    );
                    return Err(err);
                }
                Err(err) => return Err(err),
            };

            // Consume the state only after the credential is stored.
            let access_token = credential.access_token.clone();
            self.set_credentials(credential).await?;
            if let Some(client) = self.client.as_mut() {
                client.set_token(access_token);
            }
            ctx.session.remove(&session_key).await?;
        }

        let has_token = self.client.as_ref().is_some_and(VendorClient::has_token);
        if !has_token {
            let state = generate_state();
            ctx.session.set(&session_key, &state).await?;
            let location = self.built_client()?.authorization_url(&state)?;

            ctx.redirect.redirect(&location, ctx.mode)?;
            self.state = AuthState::AwaitingCallback;

            tracing::info!(
                vendor = V::NAME,
                owner = %self.owner.id(),
                "Redirected to vendor authorization endpoint"
            );

            return Err(AdapterError::AuthorizationPending {
                vendor: V::NAME.to_string(),
                location,
            });
        }

        ctx.request.clear("code");
        ctx.request.clear("state");
        self.state = AuthState::Authenticated;

        tracing::info!(
            vendor = V::NAME,
            owner = %self.owner.id(),
            "Authenticated with vendor"
        );

        Ok(())
    }

    /// Record the vendor identifier of an asset, keeping other vendors' entries.
    pub async fn remember(&self, asset: &Asset, identifier: &str) -> AdapterResult<()> {
        let key = identifier_key(asset);
        let cache = self.owner.cache();
        let mut map = cache.fetch(&key).await?.unwrap_or_default();
        map.insert(V::NAME, identifier);
        cache.save(&key, &map).await?;

        tracing::debug!(
            vendor = V::NAME,
            asset = %asset,
            identifier = %identifier,
            "Identifier remembered"
        );
        Ok(())
    }

    /// This vendor's identifier for the asset, if it was ever distributed.
    pub async fn retrieve(&self, asset: &Asset) -> AdapterResult<Option<String>> {
        let map = self.owner.cache().fetch(&identifier_key(asset)).await?;
        let identifier = map.and_then(|m| m.get(V::NAME).map(String::from));

        tracing::debug!(
            vendor = V::NAME,
            asset = %asset,
            found = identifier.is_some(),
            "Identifier retrieved"
        );
        Ok(identifier)
    }

    /// Drop this vendor's entry for the asset. The map is written back even
    /// when there was nothing to drop.
    pub async fn forget(&self, asset: &Asset) -> AdapterResult<()> {
        let key = identifier_key(asset);
        let cache = self.owner.cache();
        let mut map = cache.fetch(&key).await?.unwrap_or_default();
        let removed = map.remove(V::NAME);
        cache.save(&key, &map).await?;

        tracing::debug!(
            vendor = V::NAME,
            asset = %asset,
            removed = removed.is_some(),
            "Identifier forgotten"
        );
        Ok(())
    }

    fn ensure_supported(&self, asset: &Asset) -> AdapterResult<()> {
        if V::supports(asset) {
            return Ok(());
        }
        Err(AdapterError::UnsupportedAsset {
            vendor: V::NAME.to_string(),
            asset: asset.id().to_string(),
            kind: asset.kind(),
        })
    }

    async fn create(
        &mut self,
        asset: &Asset,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<Distribution> {
        let identifier = self.client(ctx).await?.create(asset).await?;
        self.remember(asset, &identifier).await?;

        Ok(Distribution::new(
            V::NAME,
            asset,
            Some(identifier),
            DistributionAction::Created,
        ))
    }

    async fn update_existing(
        &mut self,
        asset: &Asset,
        identifier: String,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<Distribution> {
        self.client(ctx).await?.update(&identifier, asset).await?;

        Ok(Distribution::new(
            V::NAME,
            asset,
            Some(identifier),
            DistributionAction::Updated,
        ))
    }
}

#[async_trait]
impl<V: Vendor> Adapter for OAuthAdapter<V> {
    fn vendor(&self) -> &str {
        V::NAME
    }

    fn support(&self, asset: &Asset) -> bool {
        V::supports(asset)
    }

    fn auth_state(&self) -> AuthState {
        self.state
    }

    async fn authenticate(&mut self, ctx: &mut AuthContext<'_>) -> AdapterResult<()> {
        self.client(ctx).await.map(|_| ())
    }

    async fn upload(
        &mut self,
        asset: &Asset,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<Distribution> {
        self.ensure_supported(asset)?;

        match self.retrieve(asset).await? {
            Some(identifier) => {
                tracing::debug!(
                    vendor = V::NAME,
                    asset = %asset,
                    identifier = %identifier,
                    "Asset already distributed, updating"
                );
                self.update_existing(asset, identifier, ctx).await
            }
            None => self.create(asset, ctx).await,
        }
    }

    /// Falls back to creating the resource when nothing is cached.
    async fn update(
        &mut self,
        asset: &Asset,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<Distribution> {
        self.ensure_supported(asset)?;

        match self.retrieve(asset).await? {
            Some(identifier) => self.update_existing(asset, identifier, ctx).await,
            None => {
                tracing::info!(
                    vendor = V::NAME,
                    asset = %asset,
                    "No identifier cached, creating instead of updating"
                );
                self.create(asset, ctx).await
            }
        }
    }

    /// No-op (and no authentication) when nothing is cached.
    async fn remove(
        &mut self,
        asset: &Asset,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<Distribution> {
        let Some(identifier) = self.retrieve(asset).await? else {
            return Ok(Distribution::new(
                V::NAME,
                asset,
                None,
                DistributionAction::NotDistributed,
            ));
        };

        self.client(ctx).await?.delete(&identifier).await?;
        self.forget(asset).await?;

        Ok(Distribution::new(
            V::NAME,
            asset,
            Some(identifier),
            DistributionAction::Removed,
        ))
    }
}
