//! Distribution contract shared by every vendor adapter
//!
//! Callers hold adapters as `Box<dyn Adapter>`, filter them with
//! [`Adapter::support`] and drive them with `upload`/`update`/`remove`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use syndic_core::Asset;

use crate::auth::AuthState;
use crate::context::AuthContext;
use crate::error::AdapterResult;

/// What an adapter call did at the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionAction {
    /// A new remote resource was created.
    Created,
    /// An existing remote resource was updated in place.
    Updated,
    /// The remote resource was deleted (or was already gone).
    Removed,
    /// Nothing was distributed to this vendor, so nothing was done.
    NotDistributed,
}

impl Display for DistributionAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DistributionAction::Created => write!(f, "created"),
            DistributionAction::Updated => write!(f, "updated"),
            DistributionAction::Removed => write!(f, "removed"),
            DistributionAction::NotDistributed => write!(f, "not_distributed"),
        }
    }
}

/// Result of one adapter call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub vendor: String,
    pub asset: String,
    /// Vendor-assigned identifier involved in the call, if any.
    pub identifier: Option<String>,
    pub action: DistributionAction,
}

impl Distribution {
    pub fn new(
        vendor: impl Into<String>,
        asset: &Asset,
        identifier: Option<String>,
        action: DistributionAction,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            asset: asset.id().to_string(),
            identifier,
            action,
        }
    }
}

/// A vendor-specific implementation of the distribution contract.
///
/// One instance is scoped to one (owner, vendor) pair. Every operation that
/// may need the vendor client takes the [`AuthContext`] of the current
/// request, since building the client can trigger the authorization flow.
#[async_trait]
pub trait Adapter: Send + Sync + Debug {
    /// Vendor name, also the key in identifier maps.
    fn vendor(&self) -> &str;

    /// Whether this adapter handles the asset. Pure: no network, no auth.
    fn support(&self, asset: &Asset) -> bool;

    fn auth_state(&self) -> AuthState;

    fn is_authenticated(&self) -> bool {
        self.auth_state() == AuthState::Authenticated
    }

    /// Make sure a vendor client with a usable credential exists.
    async fn authenticate(&mut self, ctx: &mut AuthContext<'_>) -> AdapterResult<()>;

    /// Create the asset at the vendor, or update it if it was already distributed.
    async fn upload(
        &mut self,
        asset: &Asset,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<Distribution>;

    async fn update(
        &mut self,
        asset: &Asset,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<Distribution>;

    async fn remove(
        &mut self,
        asset: &Asset,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<Distribution>;
}
