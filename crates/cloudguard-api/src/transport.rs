//! HTTP transport used by the dispatcher.
//!
//! The dispatcher only needs "POST this form, give me status and body". Keeping that
//! behind a trait lets tests observe the exact form that would hit the wire.

use async_trait::async_trait;
use cloudguard_core::client::ClientConfig;
use cloudguard_core::{Error, Result};
use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::debug;
use url::Url;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Raw response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Build a `200 OK` response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
        }
    }
}

/// Sends one form-encoded POST and returns the raw response.
///
/// Implementations must report failures to obtain a response as
/// [`Error::TransportFailure`] and must not interpret the body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `form` as `application/x-www-form-urlencoded` to `endpoint`.
    async fn post_form(&self, endpoint: &Url, form: &[(String, String)]) -> Result<RawResponse>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    enable_logging: bool,
}

impl HttpTransport {
    /// Build the HTTP client from the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the underlying client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = ClientBuilder::new()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(config.enable_compression)
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            enable_logging: config.enable_logging,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, endpoint: &Url, form: &[(String, String)]) -> Result<RawResponse> {
        let response = self.http.post(endpoint.clone()).form(form).send().await?;
        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            Error::TransportFailure(format!("Failed to read response body ({status}): {err}"))
        })?;

        if self.enable_logging {
            debug!(%status, bytes = body.len(), "Received CloudGuard response");
        }

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
