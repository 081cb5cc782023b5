//! Collaborators the authorization flow consumes from the host.
//!
//! Nothing here is ambient: the inbound request, the session and the redirect
//! sink are passed explicitly into every call that may need to authenticate.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::RwLock;

use crate::error::{AdapterError, AdapterResult};

/// Per user-agent storage carrying the anti-forgery token across the
/// redirect round-trip.
#[async_trait]
pub trait Session: Send + Sync {
    async fn get(&self, key: &str) -> AdapterResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AdapterResult<()>;

    async fn remove(&self, key: &str) -> AdapterResult<()>;
}

/// In-process session, for tests and single-user hosts.
#[derive(Clone, Default)]
pub struct MemorySession {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn get(&self, key: &str) -> AdapterResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AdapterResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AdapterResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

/// Query parameters of the inbound request.
///
/// Mutable so the parameters of a consumed authorization callback can be
/// cleared before another vendor's adapter looks at the same request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackRequest {
    query: HashMap<String, String>,
}

impl CallbackRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string, with or
    /// without the leading `?`. Later duplicates win.
    pub fn from_query(raw: &str) -> Self {
        let query = raw
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(name), decode_component(value))
            })
            .collect();

        Self { query }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Non-empty value of a query parameter.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query.insert(name.into(), value.into());
    }

    pub fn clear(&mut self, name: &str) {
        self.query.remove(name);
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// How the user-agent should be sent to a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectMode {
    /// `Location` header, unless headers were already sent.
    #[default]
    Header,
    /// Client-side navigation through an HTML page.
    Client,
}

/// Redirect the host has to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Location(String),
    Html(String),
}

/// Instructs the current user-agent to navigate to a URL.
pub trait RedirectSink: Send + Sync {
    fn redirect(&self, location: &str, mode: RedirectMode) -> AdapterResult<()>;
}

/// Sink for CLI and background contexts: there is no user-agent, so every
/// redirect attempt fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl RedirectSink for NonInteractive {
    fn redirect(&self, location: &str, _mode: RedirectMode) -> AdapterResult<()> {
        Err(AdapterError::RedirectUnavailable {
            location: location.to_string(),
        })
    }
}

/// Sink for web contexts. Records the redirect for the host to turn into its
/// HTTP response.
#[derive(Debug, Default)]
pub struct ResponseRedirect {
    headers_sent: bool,
    issued: Mutex<Option<Redirect>>,
}

impl ResponseRedirect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink for a response whose headers are already on the wire; redirects
    /// fall back to an HTML body.
    pub fn after_headers() -> Self {
        Self {
            headers_sent: true,
            issued: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Redirect>> {
        match self.issued.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn issued(&self) -> Option<Redirect> {
        self.slot().clone()
    }

    pub fn take(&self) -> Option<Redirect> {
        self.slot().take()
    }
}

impl RedirectSink for ResponseRedirect {
    fn redirect(&self, location: &str, mode: RedirectMode) -> AdapterResult<()> {
        let redirect = if mode == RedirectMode::Client || self.headers_sent {
            Redirect::Html(html_fallback(location))
        } else {
            Redirect::Location(location.to_string())
        };

        tracing::debug!(
            location = %location,
            mode = ?mode,
            headers_sent = self.headers_sent,
            "Redirect client"
        );

        *self.slot() = Some(redirect);
        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Page that navigates with and without scripting, plus a manual link.
fn html_fallback(location: &str) -> String {
    let url = escape_html(location);
    format!(
        "<noscript><meta http-equiv=\"refresh\" content=\"0; url={url}\" /></noscript>\
         <script type=\"text/javascript\">window.location.href=\"{url}\";</script>\
         <a href=\"{url}\">{url}</a>"
    )
}

/// Everything the authorization flow may touch during one inbound request.
pub struct AuthContext<'a> {
    pub request: &'a mut CallbackRequest,
    pub session: &'a dyn Session,
    pub redirect: &'a dyn RedirectSink,
    pub mode: RedirectMode,
}

impl<'a> AuthContext<'a> {
    pub fn new(
        request: &'a mut CallbackRequest,
        session: &'a dyn Session,
        redirect: &'a dyn RedirectSink,
    ) -> Self {
        Self {
            request,
            session,
            redirect,
            mode: RedirectMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: RedirectMode) -> Self {
        self.mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_is_decoded() {
        let request = CallbackRequest::from_query("?code=a%2Fb+c&state=xyz&empty=&flag");
        assert_eq!(request.query("code"), Some("a/b c"));
        assert_eq!(request.query("state"), Some("xyz"));
        assert_eq!(request.query("empty"), None);
        assert_eq!(request.query("flag"), None);
        assert_eq!(request.query("missing"), None);
    }

    #[test]
    fn cleared_parameters_disappear() {
        let mut request = CallbackRequest::new().with_param("code", "c").with_param("state", "s");
        request.clear("code");
        assert_eq!(request.query("code"), None);
        assert_eq!(request.query("state"), Some("s"));
    }

    #[test]
    fn non_interactive_sink_rejects_redirects() {
        let err = NonInteractive
            .redirect("https://vendor.test/authorize", RedirectMode::Header)
            .unwrap_err();
        assert!(matches!(err, AdapterError::RedirectUnavailable { .. }));
    }

    #[test]
    fn header_redirect_is_used_until_headers_are_sent() {
        let sink = ResponseRedirect::new();
        sink.redirect("https://vendor.test/a", RedirectMode::Header)
            .unwrap();
        assert_eq!(
            sink.take(),
            Some(Redirect::Location("https://vendor.test/a".to_string()))
        );
        assert_eq!(sink.take(), None);

        let late = ResponseRedirect::after_headers();
        late.redirect("https://vendor.test/a", RedirectMode::Header)
            .unwrap();
        assert!(matches!(late.issued(), Some(Redirect::Html(_))));
    }

    #[test]
    fn html_fallback_escapes_the_url() {
        let sink = ResponseRedirect::new();
        sink.redirect("https://vendor.test/a?x=1&y=\"2\"", RedirectMode::Client)
            .unwrap();

        let Some(Redirect::Html(body)) = sink.issued() else {
            panic!("expected an HTML redirect");
        };
        assert!(body.contains("https://vendor.test/a?x=1&amp;y=&quot;2&quot;"));
        assert!(!body.contains("y=\"2\""));
        assert!(body.contains("<noscript>"));
    }

    #[tokio::test]
    async fn memory_session_round_trip() {
        let session = MemorySession::new();
        session.set("vimeo_state", "abc").await.unwrap();
        assert_eq!(session.get("vimeo_state").await.unwrap().as_deref(), Some("abc"));
        session.remove("vimeo_state").await.unwrap();
        assert!(session.get("vimeo_state").await.unwrap().is_none());
    }
}
