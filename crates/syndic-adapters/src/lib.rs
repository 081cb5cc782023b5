//! Syndic Adapters
//!
//! The distribution contract (`Adapter`), the OAuth authorization-code state
//! machine every vendor adapter embeds, the request/session/redirect
//! collaborators it consumes, and the vendor presets.
//!
//! An adapter is scoped to one (owner, vendor) pair. It builds its vendor
//! client lazily, attaches the owner's stored credential if there is one, and
//! only runs the authorization flow when no usable credential exists.

pub mod adapter;
pub mod auth;
pub mod client;
pub mod context;
pub mod distributor;
pub mod error;
pub mod oauth;
pub mod vendors;

pub use adapter::{Adapter, Distribution, DistributionAction};
pub use auth::AuthState;
pub use client::VendorClient;
pub use context::{
    AuthContext, CallbackRequest, MemorySession, NonInteractive, Redirect, RedirectMode,
    RedirectSink, ResponseRedirect, Session,
};
pub use distributor::{DistributionReport, Distributor, Interruption, VendorOutcome};
pub use error::{AdapterError, AdapterResult, StateSide};
pub use oauth::OAuthAdapter;
pub use vendors::Vendor;
#[cfg(feature = "vendor-soundcloud")]
pub use vendors::{SoundCloud, SoundCloudAdapter};
#[cfg(feature = "vendor-vimeo")]
pub use vendors::{Vimeo, VimeoAdapter};
#[cfg(feature = "vendor-youtube")]
pub use vendors::{YouTube, YouTubeAdapter};
