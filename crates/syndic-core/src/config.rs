//! Configuration module
//!
//! Vendor configuration (OAuth client credentials and endpoints) and store
//! backend selection. Values come either from the environment or from a
//! host-supplied JSON object; vendor endpoint defaults fill the gaps.

use serde::Deserialize;
use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;

use crate::store_types::StoreBackend;
use crate::{CoreError, CoreResult};

const REQUEST_TIMEOUT_SECS: u64 = 300;
const LOCAL_STORE_PATH: &str = ".syndic";

/// Endpoint defaults a vendor ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorEndpoints {
    pub authorize_url: &'static str,
    pub token_url: &'static str,
    pub create_url: &'static str,
    /// Resource URL template; `{id}` is replaced by the vendor identifier.
    pub resource_url: &'static str,
    /// Field of the create response holding the new identifier.
    pub identifier_field: &'static str,
    pub scopes: &'static [&'static str],
}

/// Resolved configuration for one vendor.
///
/// WARNING: `client_secret` is sensitive. The type does not implement
/// `Serialize` and the `Debug` impl redacts the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct VendorConfig {
    pub vendor: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub authorize_url: String,
    pub token_url: String,
    pub create_url: String,
    pub resource_url: String,
    pub identifier_field: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScopeList {
    One(String),
    Many(Vec<String>),
}

impl ScopeList {
    fn into_vec(self) -> Vec<String> {
        match self {
            ScopeList::One(s) => split_scopes(&s),
            ScopeList::Many(v) => v
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// Host-supplied shape; accepts the short key names (`id`, `secret`,
/// `redirectUri`) as well as the long ones.
#[derive(Deserialize)]
struct RawVendorConfig {
    #[serde(alias = "id")]
    client_id: String,
    #[serde(alias = "secret")]
    client_secret: String,
    #[serde(alias = "redirectUri")]
    redirect_uri: String,
    #[serde(default)]
    scopes: Option<ScopeList>,
    #[serde(default, alias = "authorizeUrl")]
    authorize_url: Option<String>,
    #[serde(default, alias = "tokenUrl")]
    token_url: Option<String>,
    #[serde(default, alias = "createUrl")]
    create_url: Option<String>,
    #[serde(default, alias = "resourceUrl")]
    resource_url: Option<String>,
    #[serde(default, alias = "identifierField")]
    identifier_field: Option<String>,
    #[serde(default, alias = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split([',', ' '])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `Vimeo` -> `VIMEO`, `Sound Cloud` -> `SOUND_CLOUD`.
fn env_prefix(vendor: &str) -> String {
    vendor
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

impl VendorConfig {
    /// Build a configuration from explicit client credentials and the vendor defaults.
    pub fn new(
        vendor: impl Into<String>,
        endpoints: &VendorEndpoints,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: endpoints.scopes.iter().map(|s| s.to_string()).collect(),
            authorize_url: endpoints.authorize_url.to_string(),
            token_url: endpoints.token_url.to_string(),
            create_url: endpoints.create_url.to_string(),
            resource_url: endpoints.resource_url.to_string(),
            identifier_field: endpoints.identifier_field.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }

    /// Build from a host-supplied JSON object.
    pub fn from_value(
        vendor: &str,
        endpoints: &VendorEndpoints,
        value: &serde_json::Value,
    ) -> CoreResult<Self> {
        let raw: RawVendorConfig = serde_json::from_value(value.clone()).map_err(|e| {
            CoreError::Config(format!("Invalid {} configuration: {}", vendor, e))
        })?;

        let mut config = Self::new(
            vendor,
            endpoints,
            raw.client_id,
            raw.client_secret,
            raw.redirect_uri,
        );
        if let Some(scopes) = raw.scopes {
            config.scopes = scopes.into_vec();
        }
        if let Some(url) = raw.authorize_url {
            config.authorize_url = url;
        }
        if let Some(url) = raw.token_url {
            config.token_url = url;
        }
        if let Some(url) = raw.create_url {
            config.create_url = url;
        }
        if let Some(url) = raw.resource_url {
            config.resource_url = url;
        }
        if let Some(field) = raw.identifier_field {
            config.identifier_field = field;
        }
        if let Some(secs) = raw.timeout_secs {
            config.timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }

    /// Build from `{VENDOR}_*` environment variables (a `.env` file is loaded first).
    pub fn from_env(vendor: &str, endpoints: &VendorEndpoints) -> CoreResult<Self> {
        dotenvy::dotenv().ok();

        let prefix = env_prefix(vendor);
        let var = |name: &str| env::var(format!("{}_{}", prefix, name)).ok();
        let required = |name: &str| {
            var(name).ok_or_else(|| {
                CoreError::Config(format!("{}_{} not configured", prefix, name))
            })
        };

        let mut config = Self::new(
            vendor,
            endpoints,
            required("CLIENT_ID")?,
            required("CLIENT_SECRET")?,
            required("REDIRECT_URI")?,
        );
        if let Some(scopes) = var("SCOPES") {
            config.scopes = split_scopes(&scopes);
        }
        if let Some(url) = var("AUTHORIZE_URL") {
            config.authorize_url = url;
        }
        if let Some(url) = var("TOKEN_URL") {
            config.token_url = url;
        }
        if let Some(url) = var("CREATE_URL") {
            config.create_url = url;
        }
        if let Some(url) = var("RESOURCE_URL") {
            config.resource_url = url;
        }
        if let Some(secs) = var("TIMEOUT_SECS") {
            config.timeout_secs = secs.parse().map_err(|_| {
                CoreError::Config(format!("{}_TIMEOUT_SECS must be a valid number", prefix))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(CoreError::Config(format!(
                "{} client id is required but not provided",
                self.vendor
            )));
        }

        if self.client_secret.trim().is_empty()
            || self.client_secret == "your-client-secret"
            || self.client_secret == "changeme"
        {
            return Err(CoreError::Config(format!(
                "{} client secret is missing or a placeholder",
                self.vendor
            )));
        }

        for (name, url) in [
            ("redirect_uri", &self.redirect_uri),
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
            ("create_url", &self.create_url),
            ("resource_url", &self.resource_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(CoreError::Config(format!(
                    "{} {} must be an http(s) URL, got '{}'",
                    self.vendor, name, url
                )));
            }
        }

        if !self.resource_url.contains("{id}") {
            return Err(CoreError::Config(format!(
                "{} resource_url must contain an {{id}} placeholder",
                self.vendor
            )));
        }

        if self.identifier_field.trim().is_empty() {
            return Err(CoreError::Config(format!(
                "{} identifier_field cannot be empty",
                self.vendor
            )));
        }

        Ok(())
    }

    /// Resource URL for a vendor identifier.
    pub fn resource_url_for(&self, identifier: &str) -> String {
        self.resource_url.replace("{id}", identifier)
    }
}

impl Debug for VendorConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VendorConfig")
            .field("vendor", &self.vendor)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("create_url", &self.create_url)
            .field("resource_url", &self.resource_url)
            .field("identifier_field", &self.identifier_field)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Store backend configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub local_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Local,
            local_path: PathBuf::from(LOCAL_STORE_PATH),
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> CoreResult<Self> {
        dotenvy::dotenv().ok();

        let backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Local,
        };
        let local_path = env::var("LOCAL_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(LOCAL_STORE_PATH));

        Ok(Self {
            backend,
            local_path,
        })
    }
}
