//! Helpers shared by the `syndic` binary.

use anyhow::Context;
use serde_json::{json, Value as JsonValue};
use std::path::Path;
use syndic_adapters::vendors::available;
use syndic_adapters::{
    AdapterError, DistributionReport, Distributor, OAuthAdapter, SoundCloud, Vendor, Vimeo,
    YouTube,
};
use syndic_core::{Asset, AssetKind};
use syndic_store::Owner;

/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Vendor name as the adapters spell it, matched case-insensitively.
pub fn canonical_vendor(name: &str) -> Option<&'static str> {
    available()
        .into_iter()
        .map(|(vendor, _)| vendor)
        .find(|vendor| vendor.eq_ignore_ascii_case(name.trim()))
}

/// Adapters for every vendor configured in the environment, or only `only`.
///
/// Unconfigured vendors are skipped unless they were asked for explicitly.
pub fn build_distributor(owner: &Owner, only: Option<&str>) -> anyhow::Result<Distributor> {
    if let Some(name) = only {
        canonical_vendor(name).with_context(|| format!("Unknown vendor '{}'", name))?;
    }

    let mut distributor = Distributor::new();
    register::<Vimeo>(&mut distributor, owner, only)?;
    register::<YouTube>(&mut distributor, owner, only)?;
    register::<SoundCloud>(&mut distributor, owner, only)?;

    if distributor.is_empty() {
        anyhow::bail!("No vendor configured. Set {{VENDOR}}_CLIENT_ID, {{VENDOR}}_CLIENT_SECRET and {{VENDOR}}_REDIRECT_URI");
    }
    Ok(distributor)
}

fn register<V: Vendor>(
    distributor: &mut Distributor,
    owner: &Owner,
    only: Option<&str>,
) -> anyhow::Result<()> {
    if only.is_some_and(|name| !name.trim().eq_ignore_ascii_case(V::NAME)) {
        return Ok(());
    }

    match OAuthAdapter::<V>::from_env(owner.clone()) {
        Ok(adapter) => distributor.register(Box::new(adapter)),
        Err(err) if only.is_some() => {
            return Err(err).with_context(|| format!("{} is not configured", V::NAME));
        }
        Err(err) => {
            tracing::debug!(vendor = V::NAME, error = %err, "Vendor not configured, skipping");
        }
    }
    Ok(())
}

/// Asset for a local file. The identity defaults to the file stem and the
/// kind to the one implied by the extension.
pub fn asset_from_file(
    file: &Path,
    id: Option<&str>,
    kind: Option<AssetKind>,
    title: Option<&str>,
    description: Option<&str>,
) -> anyhow::Result<Asset> {
    let id = match id {
        Some(id) => id.to_string(),
        None => file
            .file_stem()
            .and_then(|s| s.to_str())
            .map(String::from)
            .with_context(|| format!("Cannot derive an asset id from {}", file.display()))?,
    };

    let mut asset = match kind {
        Some(kind) => Asset::new(id, kind, file)?,
        None => Asset::from_file(id, file)?,
    };
    if let Some(title) = title {
        asset = asset.with_title(title);
    }
    if let Some(description) = description {
        asset = asset.with_description(description);
    }
    Ok(asset)
}

/// Turn a redirect attempt into an actionable message; the CLI has no browser.
pub fn explain(err: AdapterError) -> anyhow::Error {
    match &err {
        AdapterError::RedirectUnavailable { location } => {
            let hint = format!(
                "Authorization required. Open {} in a browser, then store the token with `syndic login <vendor> <token>`",
                location
            );
            anyhow::Error::new(err).context(hint)
        }
        _ => anyhow::Error::new(err),
    }
}

pub fn report_to_json(report: &DistributionReport) -> JsonValue {
    let outcomes: Vec<JsonValue> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(distribution) => json!({
                "vendor": outcome.vendor,
                "status": "ok",
                "action": distribution.action,
                "identifier": distribution.identifier,
            }),
            Err(err) => json!({
                "vendor": outcome.vendor,
                "status": "error",
                "code": err.error_code(),
                "message": err.to_string(),
            }),
        })
        .collect();

    let interrupted = report.interruption.as_ref().map(|interruption| {
        json!({
            "vendor": interruption.vendor,
            "code": interruption.error.error_code(),
        })
    });

    json!({
        "asset": report.asset,
        "success": report.is_success(),
        "outcomes": outcomes,
        "interrupted": interrupted,
    })
}

pub fn vendors_to_json() -> JsonValue {
    let vendors: Vec<JsonValue> = available()
        .into_iter()
        .map(|(name, kinds)| {
            json!({
                "vendor": name,
                "kinds": kinds.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
            })
        })
        .collect();
    JsonValue::Array(vendors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_names_are_case_insensitive() {
        assert_eq!(canonical_vendor("vimeo"), Some("Vimeo"));
        assert_eq!(canonical_vendor(" SOUNDCLOUD "), Some("SoundCloud"));
        assert_eq!(canonical_vendor("myspace"), None);
    }

    #[test]
    fn asset_identity_defaults_to_file_stem() {
        let asset = asset_from_file(Path::new("/media/video-42.mp4"), None, None, Some("Launch"), None)
            .unwrap();
        assert_eq!(asset.id(), "video-42");
        assert_eq!(asset.kind(), AssetKind::Video);
        assert_eq!(asset.title(), Some("Launch"));
    }

    #[test]
    fn explicit_kind_overrides_extension() {
        let asset = asset_from_file(
            Path::new("/media/raw.bin"),
            Some("clip-1"),
            Some(AssetKind::Video),
            None,
            None,
        )
        .unwrap();
        assert_eq!(asset.id(), "clip-1");
        assert!(asset.is_video());

        assert!(asset_from_file(Path::new("/media/raw.bin"), None, None, None, None).is_err());
    }

    #[tokio::test]
    async fn interrupted_reports_keep_completed_vendors() {
        use std::sync::Arc;
        use syndic_adapters::{AuthContext, CallbackRequest, MemorySession, NonInteractive};
        use syndic_core::IdentifierMap;
        use syndic_store::{IdentifierCache, MemoryStore};

        let store = MemoryStore::new();
        let mut cached = IdentifierMap::new();
        cached.insert("YouTube", "yt-1");
        store.save("video-42", &cached).await.unwrap();

        let owner = Owner::new("alice", Arc::new(store.clone()), Arc::new(store));
        let config = json!({
            "id": "client-123",
            "secret": "s3cr3t-value",
            "redirectUri": "https://app.test/callback",
        });
        let mut distributor = Distributor::new()
            .with_adapter(Box::new(
                OAuthAdapter::<Vimeo>::from_value(owner.clone(), &config).unwrap(),
            ))
            .with_adapter(Box::new(
                OAuthAdapter::<YouTube>::from_value(owner, &config).unwrap(),
            ));

        // Vimeo has nothing to remove; YouTube needs an authorization the CLI cannot start.
        let asset = Asset::video("video-42", "/media/video-42.mp4").unwrap();
        let mut request = CallbackRequest::new();
        let session = MemorySession::new();
        let mut ctx = AuthContext::new(&mut request, &session, &NonInteractive);
        let report = distributor.withdraw(&asset, &mut ctx).await.unwrap();

        let value = report_to_json(&report);
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["outcomes"][0]["vendor"], json!("Vimeo"));
        assert_eq!(value["outcomes"][0]["action"], json!("not_distributed"));
        assert_eq!(value["interrupted"]["vendor"], json!("YouTube"));
        assert_eq!(value["interrupted"]["code"], json!("REDIRECT_UNAVAILABLE"));
    }

    #[test]
    fn redirect_errors_carry_a_login_hint() {
        let err = explain(AdapterError::RedirectUnavailable {
            location: "https://vendor.test/authorize".to_string(),
        });
        assert!(err.to_string().contains("syndic login"));
    }

    #[test]
    fn vendor_listing_includes_kinds() {
        let listing = vendors_to_json();
        let vimeo = listing
            .as_array()
            .unwrap()
            .iter()
            .find(|v| v["vendor"] == "Vimeo")
            .unwrap();
        assert_eq!(vimeo["kinds"], json!(["video"]));
    }
}
