//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! The interceptor hands it fully decorated requests; it never sees
//! credentials separately from headers or query parameters.

use std::time::{Duration, Instant};

use authgate_application::ports::{HttpClient, HttpClientError};
use authgate_domain::{AuthSettings, HttpMethod, RequestSpec, ResponseSpec};
use reqwest::{Client, Method};
use tracing::{debug, instrument};

const MAX_REDIRECTS: usize = 10;

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
    default_timeout_ms: u64,
}

impl ReqwestHttpClient {
    /// Creates a client configured from the settings.
    ///
    /// - User-Agent: `settings.user_agent`
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - Timeout: `settings.request_timeout_ms` unless the request sets its own
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(settings: &AuthSettings) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            client,
            default_timeout_ms: settings.request_timeout_ms,
        })
    }

    /// Wraps an already configured reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, default_timeout_ms: u64) -> Self {
        Self {
            client,
            default_timeout_ms,
        }
    }

    /// Timeout applied to `request`.
    #[must_use]
    pub fn timeout_ms_for(&self, request: &RequestSpec) -> u64 {
        request.timeout_ms.unwrap_or(self.default_timeout_ms)
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn host_of(error: &reqwest::Error) -> String {
        error
            .url()
            .and_then(|u| u.host_str())
            .unwrap_or("unknown")
            .to_string()
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError {
                    host: Self::host_of(error),
                    message,
                };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: Self::host_of(error),
                    port: error
                        .url()
                        .and_then(reqwest::Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        HttpClientError::Other(error.to_string())
    }
}

impl HttpClient for ReqwestHttpClient {
    #[instrument(name = "http", skip_all, fields(method = %request.method, status))]
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        let url = request
            .parse_url()
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;
        let timeout_ms = self.timeout_ms_for(request);

        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(timeout_ms));
        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        tracing::Span::current().record("status", status);

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpClientError::Other(format!("failed to read body: {e}")))?
            .to_vec();

        let duration = start.elapsed();
        debug!(status, size = body.len(), ?duration, "response received");

        Ok(ResponseSpec::new(status, headers, body, duration))
    }
}
