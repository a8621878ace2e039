//! Intercepted requests and URL resolution.

use bytes::Bytes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::RequestKey;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a request target against the origin into a canonical URL.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Absolute URLs are taken as-is, relative ones are joined onto `origin`
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn resolve(origin: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?
        }
        Err(e) => return Err(UrlError::InvalidUrl(e.to_string())),
    };

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// What the requesting context intends to do with the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// No destination, e.g. a script-initiated fetch.
    #[default]
    Empty,
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
}

impl Destination {
    /// Infer a destination from the path's file extension.
    ///
    /// Used when a caller does not say what the request is for.
    pub fn guess_from_path(path: &str) -> Self {
        let file = path.rsplit('/').next().unwrap_or_default();
        let Some((_, ext)) = file.rsplit_once('.') else {
            return if path.ends_with('/') { Self::Document } else { Self::Empty };
        };

        match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" | "jsx" | "ts" | "tsx" => Self::Script,
            "css" => Self::Style,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "avif" => Self::Image,
            "woff" | "woff2" | "ttf" | "otf" => Self::Font,
            "webmanifest" => Self::Manifest,
            "html" | "htm" => Self::Document,
            _ => Self::Empty,
        }
    }

    /// Destinations served cache-first from the static store.
    pub fn is_static_asset(self) -> bool {
        matches!(self, Self::Script | Self::Style | Self::Image)
    }
}

/// An outbound request handed to the policy.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    /// Upper-case HTTP method.
    pub method: String,
    pub url: Url,
    pub destination: Destination,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl InterceptedRequest {
    pub fn new(method: &str, url: Url) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url,
            destination: Destination::Empty,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// The key this request is stored and matched under.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }
}
