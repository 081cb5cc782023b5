use syndic_core::{AssetKind, VendorEndpoints};

use super::Vendor;
use crate::oauth::OAuthAdapter;

/// SoundCloud: audio tracks. The create response carries a numeric `id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoundCloud;

impl Vendor for SoundCloud {
    const NAME: &'static str = "SoundCloud";

    const ENDPOINTS: VendorEndpoints = VendorEndpoints {
        authorize_url: "https://secure.soundcloud.com/authorize",
        token_url: "https://secure.soundcloud.com/oauth/token",
        create_url: "https://api.soundcloud.com/tracks",
        resource_url: "https://api.soundcloud.com/tracks/{id}",
        identifier_field: "id",
        scopes: &[],
    };

    const SUPPORTED_KINDS: &'static [AssetKind] = &[AssetKind::Audio];
}

pub type SoundCloudAdapter = OAuthAdapter<SoundCloud>;
