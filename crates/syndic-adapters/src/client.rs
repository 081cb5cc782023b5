// Generic vendor client: authorization-code exchange plus a plain REST
// resource API (multipart create, JSON patch, delete).

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;
use syndic_core::{Asset, Credential, VendorConfig};

use crate::error::{AdapterError, AdapterResult};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// HTTP client for one vendor.
pub struct VendorClient {
    http_client: Client,
    config: VendorConfig,
    token: Option<String>,
}

impl Debug for VendorClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VendorClient")
            .field("vendor", &self.config.vendor)
            .field("token_set", &self.token.is_some())
            .finish()
    }
}

impl VendorClient {
    pub fn new(config: VendorConfig) -> AdapterResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AdapterError::Config(format!(
                    "Failed to create HTTP client for {}: {}",
                    config.vendor, e
                ))
            })?;

        Ok(Self {
            http_client,
            config,
            token: None,
        })
    }

    pub fn vendor(&self) -> &str {
        &self.config.vendor
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Authorization endpoint URL carrying the callback, scopes and `state`.
    pub fn authorization_url(&self, state: &str) -> AdapterResult<String> {
        let scope = self.config.scopes.join(" ");
        let mut params: Vec<(&str, &str)> = vec![
            ("response_type", "code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        if !scope.is_empty() {
            params.push(("scope", scope.as_str()));
        }
        params.push(("state", state));

        let url = Url::parse_with_params(&self.config.authorize_url, &params).map_err(|e| {
            AdapterError::Config(format!(
                "Invalid {} authorize_url: {}",
                self.config.vendor, e
            ))
        })?;

        Ok(url.to_string())
    }

    /// Exchange an authorization code for a credential.
    ///
    /// A non-success response, or a success without `access_token`, is an
    /// `Authentication` error carrying the vendor's body.
    pub async fn exchange_code(&self, code: &str) -> AdapterResult<Credential> {
        let response = self
            .http_client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header("accept", "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AdapterError::Authentication {
                vendor: self.config.vendor.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = match serde_json::from_str(&body) {
            Ok(token) => token,
            Err(_) => {
                return Err(AdapterError::Authentication {
                    vendor: self.config.vendor.clone(),
                    status: status.as_u16(),
                    body,
                })
            }
        };

        let access_token = match token.access_token.filter(|t| !t.is_empty()) {
            Some(access_token) => access_token,
            None => {
                return Err(AdapterError::Authentication {
                    vendor: self.config.vendor.clone(),
                    status: status.as_u16(),
                    body,
                })
            }
        };

        let issued_at = Utc::now();
        Ok(Credential {
            access_token,
            token_type: token.token_type,
            refresh_token: token.refresh_token,
            scope: token.scope,
            expires_at: token
                .expires_in
                .filter(|secs| *secs > 0)
                .map(|secs| issued_at + ChronoDuration::seconds(secs)),
            issued_at,
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn vendor_error(&self, response: reqwest::Response) -> AdapterError {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        AdapterError::Vendor {
            vendor: self.config.vendor.clone(),
            status: status.as_u16(),
            message,
        }
    }

    fn metadata(asset: &Asset) -> JsonValue {
        let mut body = json!({});
        if let Some(title) = asset.title() {
            body["name"] = json!(title);
        }
        if let Some(description) = asset.description() {
            body["description"] = json!(description);
        }
        body
    }

    /// Upload the asset content and return the vendor-assigned identifier.
    pub async fn create(&self, asset: &Asset) -> AdapterResult<String> {
        let data = tokio::fs::read(asset.path())
            .await
            .map_err(|source| AdapterError::AssetContent {
                path: asset.path().to_path_buf(),
                source,
            })?;
        let size = data.len();

        let part = Part::bytes(data)
            .file_name(asset.file_name())
            .mime_str(asset.content_type())?;
        let mut form = Form::new().part("file", part);
        if let Some(title) = asset.title() {
            form = form.text("name", title.to_string());
        }
        if let Some(description) = asset.description() {
            form = form.text("description", description.to_string());
        }

        let response = self
            .authorized(self.http_client.post(&self.config.create_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.vendor_error(response).await);
        }

        let body: JsonValue = response.json().await?;
        let identifier = match body.get(&self.config.identifier_field) {
            Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
            Some(JsonValue::Number(n)) => n.to_string(),
            _ => {
                return Err(AdapterError::Vendor {
                    vendor: self.config.vendor.clone(),
                    status: StatusCode::OK.as_u16(),
                    message: format!(
                        "create response has no '{}' field",
                        self.config.identifier_field
                    ),
                })
            }
        };

        tracing::info!(
            vendor = %self.config.vendor,
            asset = %asset,
            identifier = %identifier,
            size_bytes = size,
            "Vendor resource created"
        );

        Ok(identifier)
    }

    /// Push the asset's metadata to an existing resource.
    pub async fn update(&self, identifier: &str, asset: &Asset) -> AdapterResult<()> {
        let url = self.config.resource_url_for(identifier);
        let response = self
            .authorized(self.http_client.patch(&url))
            .json(&Self::metadata(asset))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.vendor_error(response).await);
        }

        tracing::info!(
            vendor = %self.config.vendor,
            asset = %asset,
            identifier = %identifier,
            "Vendor resource updated"
        );

        Ok(())
    }

    /// Delete a resource. Returns `false` when the vendor no longer had it.
    pub async fn delete(&self, identifier: &str) -> AdapterResult<bool> {
        let url = self.config.resource_url_for(identifier);
        let response = self
            .authorized(self.http_client.delete(&url))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(
                vendor = %self.config.vendor,
                identifier = %identifier,
                "Vendor resource already gone"
            );
            return Ok(false);
        }

        if !status.is_success() {
            return Err(self.vendor_error(response).await);
        }

        tracing::info!(
            vendor = %self.config.vendor,
            identifier = %identifier,
            "Vendor resource deleted"
        );

        Ok(true)
    }
}
