use syndic_core::{AssetKind, VendorEndpoints};

use super::Vendor;
use crate::oauth::OAuthAdapter;

#[derive(Debug, Clone, Copy, Default)]
pub struct YouTube;

impl Vendor for YouTube {
    const NAME: &'static str = "YouTube";

    const ENDPOINTS: VendorEndpoints = VendorEndpoints {
        authorize_url: "https://accounts.google.com/o/oauth2/v2/auth",
        token_url: "https://oauth2.googleapis.com/token",
        create_url: "https://www.googleapis.com/upload/youtube/v3/videos?part=snippet,status",
        resource_url: "https://www.googleapis.com/youtube/v3/videos?id={id}",
        identifier_field: "id",
        scopes: &["https://www.googleapis.com/auth/youtube.upload"],
    };

    const SUPPORTED_KINDS: &'static [AssetKind] = &[AssetKind::Video];
}

pub type YouTubeAdapter = OAuthAdapter<YouTube>;
