use syndic_core::{AssetKind, VendorEndpoints};

use super::Vendor;
use crate::oauth::OAuthAdapter;

/// Vimeo: videos only. Identifiers are resource URIs (`/videos/{n}`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Vimeo;

impl Vendor for Vimeo {
    const NAME: &'static str = "Vimeo";

    const ENDPOINTS: VendorEndpoints = VendorEndpoints {
        authorize_url: "https://api.vimeo.com/oauth/authorize",
        token_url: "https://api.vimeo.com/oauth/access_token",
        create_url: "https://api.vimeo.com/me/videos",
        resource_url: "https://api.vimeo.com{id}",
        identifier_field: "uri",
        scopes: &["public", "private", "upload", "edit", "delete"],
    };

    const SUPPORTED_KINDS: &'static [AssetKind] = &[AssetKind::Video];
}

pub type VimeoAdapter = OAuthAdapter<Vimeo>;
