//! Configuration structures for CloudGuard clients.
//!
//! Credentials and the target zone are supplied programmatically when a client is
//! built; nothing is read from files or the environment.

use crate::form::FormParams;
use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Fixed endpoint of the CloudGuard JSON API.
pub const DEFAULT_ENDPOINT: &str = "https://www.cloudflare.com/api_json.html";

/// Form field carrying the API key.
pub const TOKEN_FIELD: &str = "tkn";
/// Form field carrying the account email.
pub const EMAIL_FIELD: &str = "email";
/// Form field carrying the operation tag.
pub const ACTION_FIELD: &str = "a";
/// Form field carrying the target zone.
pub const ZONE_FIELD: &str = "z";

/// API key and account email sent with every request.
///
/// The key never appears in `Debug` output.
#[derive(Clone, Validate)]
pub struct Credentials {
    api_key: SecretString,

    #[validate(email)]
    email: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(api_key: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            email: email.into(),
        }
    }

    /// Account email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Write the credential fields into `form`, replacing any caller-supplied values.
    pub fn apply(&self, form: &mut FormParams) {
        form.set(TOKEN_FIELD, self.api_key.expose_secret());
        form.set(EMAIL_FIELD, &self.email);
    }

    fn check(&self) -> Result<(), Error> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(Error::ConfigError("API key must not be empty".to_string()));
        }
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid credentials: {e}")))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

/// Configuration for a CloudGuard client instance.
#[derive(Debug, Clone, Validate)]
pub struct CloudGuardConfig {
    /// API key and account email
    #[validate(nested)]
    pub credentials: Credentials,

    /// Zone targeted by zone-scoped operations
    #[validate(length(min = 1, max = 253))]
    pub zone: String,

    /// API endpoint, [`DEFAULT_ENDPOINT`] unless overridden
    #[validate(url)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl CloudGuardConfig {
    /// Create a new client configuration with required parameters.
    ///
    /// # Arguments
    ///
    /// * `api_key` - The account API key
    /// * `email` - The account email
    /// * `zone` - The zone (domain) that zone-scoped operations act on
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty, the email is malformed or the zone is empty.
    pub fn new(
        api_key: impl Into<String>,
        email: impl Into<String>,
        zone: impl Into<String>,
    ) -> Result<Self, Error> {
        let config = Self {
            credentials: Credentials::new(api_key, email),
            zone: zone.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        };

        config.check()?;
        Ok(config)
    }

    /// Override the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Target a different zone.
    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = zone.into();
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Re-run validation, e.g. after `with_*` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first failing field.
    pub fn check(&self) -> Result<(), Error> {
        self.credentials.check()?;
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }

    /// Parse and validate the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_endpoint(&self) -> Result<Url, Error> {
        Url::parse(&self.endpoint)
            .map_err(|e| Error::InvalidEndpoint(format!("Invalid API endpoint: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CloudGuardConfig {
        CloudGuardConfig::new("secret-key", "owner@example.com", "example.com").unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = sample();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.zone, "example.com");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.parse_endpoint().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = sample()
            .with_endpoint("http://127.0.0.1:8080/api_json.html")
            .with_zone("example.org")
            .with_timeout(5);

        assert!(config.check().is_ok());
        assert_eq!(config.zone, "example.org");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.parse_endpoint().unwrap().port(), Some(8080));
    }

    #[test]
    fn test_config_rejects_bad_email() {
        let err = CloudGuardConfig::new("secret-key", "not-an-email", "example.com").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_config_rejects_empty_key_and_zone() {
        assert!(CloudGuardConfig::new("  ", "owner@example.com", "example.com").is_err());
        assert!(CloudGuardConfig::new("secret-key", "owner@example.com", "").is_err());
    }

    #[test]
    fn test_config_rejects_bad_overrides() {
        assert!(sample().with_endpoint("not a url").check().is_err());
        assert!(sample().with_timeout(0).check().is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("owner@example.com"));
    }

    #[test]
    fn test_credentials_overwrite_form_fields() {
        let mut form = FormParams::new()
            .with(TOKEN_FIELD, "forged")
            .with(EMAIL_FIELD, "attacker@example.com");
        sample().credentials.apply(&mut form);

        assert_eq!(form.get(TOKEN_FIELD), Some("secret-key"));
        assert_eq!(form.get(EMAIL_FIELD), Some("owner@example.com"));
    }
}
