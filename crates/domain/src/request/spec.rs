//! Request specification type

use serde::{Deserialize, Serialize};
use url::Url;

use super::{Headers, HttpMethod, QueryParam, QueryParams, RequestFingerprint};
use crate::auth::AuthMetadata;
use crate::error::{DomainError, DomainResult};

/// Complete specification of an outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Base URL, optionally with its own query string
    pub url: String,
    /// Additional query parameters appended to the URL
    #[serde(default)]
    pub query: QueryParams,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// Request body
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<u8>,
    /// Per-request timeout in milliseconds; `None` uses the client default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Endpoint authentication annotation, if the endpoint declares one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthMetadata>,
}

impl RequestSpec {
    /// Creates a request with the given method and URL.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: QueryParams::new(),
            headers: Headers::new(),
            body: Vec::new(),
            timeout_ms: None,
            auth: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request with a body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        let mut request = Self::new(HttpMethod::Post, url);
        request.body = body.into();
        request
    }

    /// Sets a timeout overriding the client default.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Attaches the endpoint's authentication annotation.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthMetadata) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.add(QueryParam::new(key, value));
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(super::Header::new(name, value));
        self
    }

    /// Sets (replacing) a header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name is invalid.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> DomainResult<()> {
        self.headers.set(name, value)
    }

    /// Returns the URL with enabled query parameters appended.
    #[must_use]
    pub fn full_url(&self) -> String {
        if self.query.enabled().next().is_none() {
            return self.url.clone();
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{}", self.url, self.query.encode())
    }

    /// Parses the full URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or not http(s).
    pub fn parse_url(&self) -> DomainResult<Url> {
        let full = self.full_url();
        let url = Url::parse(&full).map_err(|e| DomainError::InvalidUrl(format!("{e}: {full}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(DomainError::InvalidUrl(format!(
                "unsupported scheme {other}: {full}"
            ))),
        }
    }

    /// Identity of this request for requirement lookup.
    #[must_use]
    pub fn fingerprint(&self) -> RequestFingerprint {
        RequestFingerprint::of(self)
    }
}
