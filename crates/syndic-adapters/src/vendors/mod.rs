//! Vendor presets
//!
//! A vendor is a zero-sized tag type: its name, endpoint defaults and the
//! asset kinds it accepts. [`crate::OAuthAdapter`] is generic over it.

use syndic_core::{Asset, AssetKind, VendorEndpoints};

#[cfg(feature = "vendor-soundcloud")]
mod soundcloud;
#[cfg(feature = "vendor-vimeo")]
mod vimeo;
#[cfg(feature = "vendor-youtube")]
mod youtube;

#[cfg(feature = "vendor-soundcloud")]
pub use soundcloud::{SoundCloud, SoundCloudAdapter};
#[cfg(feature = "vendor-vimeo")]
pub use vimeo::{Vimeo, VimeoAdapter};
#[cfg(feature = "vendor-youtube")]
pub use youtube::{YouTube, YouTubeAdapter};

pub trait Vendor: Send + Sync + 'static {
    /// Vendor name; keys identifier maps, credentials and session state.
    const NAME: &'static str;

    const ENDPOINTS: VendorEndpoints;

    const SUPPORTED_KINDS: &'static [AssetKind];

    fn supports(asset: &Asset) -> bool {
        Self::SUPPORTED_KINDS.contains(&asset.kind())
    }
}

/// Name and accepted kinds of every compiled-in vendor.
pub fn available() -> Vec<(&'static str, &'static [AssetKind])> {
    #[allow(unused_mut)]
    let mut vendors: Vec<(&'static str, &'static [AssetKind])> = Vec::new();
    #[cfg(feature = "vendor-vimeo")]
    vendors.push((Vimeo::NAME, Vimeo::SUPPORTED_KINDS));
    #[cfg(feature = "vendor-youtube")]
    vendors.push((YouTube::NAME, YouTube::SUPPORTED_KINDS));
    #[cfg(feature = "vendor-soundcloud")]
    vendors.push((SoundCloud::NAME, SoundCloud::SUPPORTED_KINDS));
    vendors
}
