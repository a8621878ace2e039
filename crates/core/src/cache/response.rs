//! Response snapshots shared by the network and the stores.

use std::borrow::Cow;

use bytes::Bytes;

/// An HTTP response as seen by the policy.
///
/// The same type carries fresh network results and stored snapshots. Cloning
/// shares the body buffer, and a stored snapshot is never mutated: a later
/// write replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// URL the response was produced for.
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self { url: url.into(), status, headers: Vec::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Only an exact 200 may be written to a store; 201, 204, 304 and the
    /// rest pass through uncached.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
