//! Asynchronous CloudGuard client implementation.

use crate::action::Action;
use crate::models::{
    IpAction, PurgeCache, PurgeFile, RecordList, RecordObject, Stats, ZoneCheck, ZoneIps,
    ZoneList, ZoneSettings,
};
use crate::request::{
    flag, resubmit_form, CacheLevel, RecordFields, RocketLoader, SecurityLevel, StatsInterval,
    ZoneIpsQuery, MAX_MINIFY_MASK,
};
use crate::transport::{HttpTransport, RawResponse, Transport};
use crate::Result;
use cloudguard_core::client::ClientConfig;
use cloudguard_core::config::{ACTION_FIELD, ZONE_FIELD};
use cloudguard_core::envelope::{decode, Envelope};
use cloudguard_core::{CloudGuardConfig, Credentials, Error, FormParams};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!("cloudguard-api/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_SNIPPET: usize = 200;

/// Builder for [`CloudGuardClient`].
#[derive(Clone)]
pub struct CloudGuardClientBuilder {
    config: CloudGuardConfig,
    http_config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl CloudGuardClientBuilder {
    /// Create a new builder from a [`CloudGuardConfig`].
    #[must_use]
    pub fn new(config: CloudGuardConfig) -> Self {
        let http_config = ClientConfig::new()
            .with_timeout(config.timeout())
            .with_user_agent(USER_AGENT);

        Self {
            config,
            http_config,
            transport: None,
        }
    }

    /// Override the HTTP client configuration used when building the default transport.
    ///
    /// The request timeout from [`CloudGuardConfig`] is only a default; the one in
    /// `http_config` wins.
    ///
    /// ```rust,no_run
    /// use cloudguard_api::{ClientConfig, CloudGuardClient, CloudGuardConfig};
    /// use std::time::Duration;
    ///
    /// # fn example() -> cloudguard_api::Result<()> {
    /// let config = CloudGuardConfig::new("api-key", "owner@example.com", "example.com")?;
    /// let http = ClientConfig::new()
    ///     .with_timeout(Duration::from_secs(15))
    ///     .with_connect_timeout(Duration::from_secs(3))
    ///     .with_compression(false)
    ///     .with_logging(true);
    ///
    /// let client = CloudGuardClient::builder(config)
    ///     .with_http_config(http)
    ///     .build()?;
    /// # let _ = client;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn with_http_config(mut self, http_config: ClientConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Use a custom transport instead of the built-in HTTP one.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Finalise the builder and create the [`CloudGuardClient`].
    pub fn build(self) -> Result<CloudGuardClient> {
        self.config.check()?;
        let endpoint = self.config.parse_endpoint()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.http_config)?),
        };

        Ok(CloudGuardClient {
            transport,
            endpoint,
            credentials: self.config.credentials,
            zone: self.config.zone,
        })
    }
}

/// Asynchronous client for the CloudGuard API.
///
/// Holds only immutable state, so clones share the transport and may be used from
/// several tasks at once. Each call performs exactly one request unless documented
/// otherwise; nothing is retried.
#[derive(Clone)]
pub struct CloudGuardClient {
    transport: Arc<dyn Transport>,
    endpoint: Url,
    credentials: Credentials,
    zone: String,
}

impl CloudGuardClient {
    /// Construct a client for `zone` against the default endpoint.
    pub fn new(
        api_key: impl Into<String>,
        email: impl Into<String>,
        zone: impl Into<String>,
    ) -> Result<Self> {
        CloudGuardClientBuilder::new(CloudGuardConfig::new(api_key, email, zone)?).build()
    }

    /// Construct a client directly from the configuration.
    pub fn from_config(config: &CloudGuardConfig) -> Result<Self> {
        CloudGuardClientBuilder::new(config.clone()).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: CloudGuardConfig) -> CloudGuardClientBuilder {
        CloudGuardClientBuilder::new(config)
    }

    /// Return the endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Return the zone targeted by zone-scoped operations.
    #[must_use]
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Invoke `action` with caller parameters and decode the payload into `T`.
    ///
    /// The operation tag, the zone (for zone-scoped actions) and the credentials are
    /// written after `params`, so a caller can never override them.
    ///
    /// # Errors
    ///
    /// [`Error::TransportFailure`] when no usable response arrives, otherwise whatever
    /// the envelope codec reports.
    pub async fn invoke<T>(&self, action: Action, params: FormParams) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let form = self.build_form(action, params);
        debug!(
            action = %action,
            zone = %self.zone,
            params = ?form.keys().collect::<Vec<_>>(),
            "Sending CloudGuard request"
        );

        let result = self.dispatch(form).await;
        if let Err(err) = &result {
            if err.should_log() {
                warn!(action = %action, code = err.error_code(), error = %err, "CloudGuard request failed");
            } else {
                debug!(action = %action, code = err.error_code(), error = %err, "CloudGuard request failed");
            }
        }
        result
    }

    fn build_form(&self, action: Action, params: FormParams) -> FormParams {
        let mut form = params;
        form.set(ACTION_FIELD, action.tag());
        if action.is_zone_scoped() {
            form.set(ZONE_FIELD, &self.zone);
        }
        self.credentials.apply(&mut form);
        form
    }

    async fn dispatch<T>(&self, form: FormParams) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .transport
            .post_form(&self.endpoint, &form.into_pairs())
            .await?;

        if response.status.is_success() {
            return decode(&response.body);
        }

        // Error envelopes are sometimes sent with a non-2xx status.
        match Envelope::parse(&response.body) {
            Ok(envelope) => envelope.into_result(),
            Err(_) => Err(status_error(&response)),
        }
    }

    /// Traffic statistics for the zone.
    pub async fn stats(&self, interval: StatsInterval) -> Result<Stats> {
        let params = FormParams::new().with("interval", interval.as_param());
        self.invoke(Action::Stats, params).await
    }

    /// List every zone on the account.
    pub async fn list_zones(&self) -> Result<ZoneList> {
        self.invoke(Action::ZoneLoadMulti, FormParams::new()).await
    }

    /// List the DNS records of the zone.
    pub async fn list_records(&self) -> Result<RecordList> {
        self.invoke(Action::RecLoadAll, FormParams::new()).await
    }

    /// Create a DNS record.
    pub async fn create_record(&self, fields: &RecordFields) -> Result<RecordObject> {
        self.invoke(Action::RecNew, fields.to_form()?).await
    }

    /// Replace the DNS record `rec_id` with `fields`.
    pub async fn edit_record(&self, rec_id: &str, fields: &RecordFields) -> Result<RecordObject> {
        let params = fields.to_form()?.with("id", rec_id);
        self.invoke(Action::RecEdit, params).await
    }

    /// Delete the DNS record `rec_id`.
    pub async fn delete_record(&self, rec_id: &str) -> Result<()> {
        let params = FormParams::new().with("id", rec_id);
        self.invoke::<IgnoredAny>(Action::RecDelete, params)
            .await
            .map(|_| ())
    }

    /// Turn proxying on or off for the DNS record `rec_id`.
    ///
    /// Fetches the zone's records, looks `rec_id` up and re-submits it with the new
    /// service mode. The fetched type, TTL and priority are sent back unchanged, even
    /// values [`RecordFields`] would refuse for a new record. The two requests are not atomic: a change made elsewhere between
    /// them is overwritten by the edit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] without sending an edit when no record has that id.
    pub async fn set_proxy_status(&self, rec_id: &str, proxied: bool) -> Result<RecordObject> {
        let records = self.list_records().await?;
        let record = records.find(rec_id).ok_or_else(|| {
            Error::NotFound(format!(
                "DNS record `{rec_id}` not found in zone `{}`",
                self.zone
            ))
        })?;

        // The record exists remotely, so its values are echoed without local checks.
        let params = resubmit_form(record)
            .with("service_mode", flag(proxied))
            .with("id", rec_id);
        self.invoke(Action::RecEdit, params).await
    }

    /// Set the zone security level.
    pub async fn set_security_level(&self, level: SecurityLevel) -> Result<ZoneList> {
        let params = FormParams::new().with("v", level.as_param());
        self.invoke(Action::SecLvl, params).await
    }

    /// Set the zone cache level.
    pub async fn set_cache_level(&self, level: CacheLevel) -> Result<ZoneList> {
        let params = FormParams::new().with("v", level.as_param());
        self.invoke(Action::CacheLvl, params).await
    }

    /// Enable or disable development mode.
    pub async fn set_dev_mode(&self, enabled: bool) -> Result<ZoneList> {
        let params = FormParams::new().with("v", flag(enabled));
        self.invoke(Action::DevMode, params).await
    }

    /// Purge the whole cache of the zone.
    pub async fn purge_cache(&self) -> Result<PurgeCache> {
        let params = FormParams::new().with("v", "1");
        self.invoke(Action::FpurgeTs, params).await
    }

    /// Purge a single cached file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if `file_url` is not an absolute URL.
    pub async fn purge_file(&self, file_url: &str) -> Result<PurgeFile> {
        Url::parse(file_url)
            .map_err(|err| Error::ValidationError(format!("Invalid URL `{file_url}`: {err}")))?;
        let params = FormParams::new().with("url", file_url);
        self.invoke(Action::FpurgeTs, params).await
    }

    /// Look up the threat score of an IP.
    pub async fn lookup_ip(&self, ip: IpAddr) -> Result<Value> {
        let params = FormParams::new().with("ip", ip);
        self.invoke(Action::IpLkup, params).await
    }

    /// Blacklist an IP.
    pub async fn ban_ip(&self, ip: IpAddr) -> Result<IpAction> {
        self.ip_action(Action::Ban, ip).await
    }

    /// Remove an IP from both the black- and whitelist.
    pub async fn forget_ip(&self, ip: IpAddr) -> Result<IpAction> {
        self.ip_action(Action::Nul, ip).await
    }

    /// Whitelist an IP.
    pub async fn allow_ip(&self, ip: IpAddr) -> Result<IpAction> {
        self.ip_action(Action::Wl, ip).await
    }

    async fn ip_action(&self, action: Action, ip: IpAddr) -> Result<IpAction> {
        // These actions carry the address in `key`.
        let params = FormParams::new().with("key", ip);
        self.invoke(action, params).await
    }

    /// Enable or disable Mirage2 image optimisation.
    pub async fn set_mirage2(&self, enabled: bool) -> Result<()> {
        self.toggle(Action::Mirage2, flag(enabled)).await
    }

    /// Set the minification mask: 1 JavaScript, 2 CSS, 4 HTML, summed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for masks above 7 without sending anything.
    pub async fn set_minify(&self, mask: u8) -> Result<()> {
        if mask > MAX_MINIFY_MASK {
            return Err(Error::ValidationError(format!(
                "Minify mask must be between 0 and {MAX_MINIFY_MASK}, got {mask}"
            )));
        }
        self.toggle(Action::Minify, mask.to_string()).await
    }

    /// Set the Rocket Loader mode.
    pub async fn set_rocket_loader(&self, mode: RocketLoader) -> Result<()> {
        self.toggle(Action::Async, mode.as_param().to_string()).await
    }

    /// Enable or disable IPv6 support.
    pub async fn set_ipv46(&self, enabled: bool) -> Result<()> {
        let value = if enabled { "3" } else { "0" };
        self.toggle(Action::Ipv46, value.to_string()).await
    }

    async fn toggle(&self, action: Action, value: String) -> Result<()> {
        let params = FormParams::new().with("v", value);
        self.invoke::<IgnoredAny>(action, params).await.map(|_| ())
    }

    /// Take a snapshot of the zone with identifier `zone_id`.
    pub async fn snapshot(&self, zone_id: &str) -> Result<Value> {
        let params = FormParams::new().with("zid", zone_id);
        self.invoke(Action::ZoneGrab, params).await
    }

    /// Current settings of the zone.
    pub async fn zone_settings(&self) -> Result<ZoneSettings> {
        self.invoke(Action::ZoneSettings, FormParams::new()).await
    }

    /// Check which of `zones` are active on the account.
    pub async fn check_zones(&self, zones: &[&str]) -> Result<ZoneCheck> {
        let params = FormParams::new().with("zones", zones.join(","));
        self.invoke(Action::ZoneCheck, params).await
    }

    /// Recent visitor IPs of the zone.
    pub async fn recent_ips(&self, query: &ZoneIpsQuery) -> Result<ZoneIps> {
        self.invoke(Action::ZoneIps, query.to_form()).await
    }
}

fn status_error(response: &RawResponse) -> Error {
    let text = String::from_utf8_lossy(&response.body);
    let snippet: String = text.chars().take(MAX_ERROR_SNIPPET).collect();
    Error::TransportFailure(format!("HTTP {}: {}", response.status, snippet.trim()))
}
