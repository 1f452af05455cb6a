//! Result shapes returned inside the `response` field of the envelope.
//!
//! The remote service is loose about scalar types: the same field may arrive as a
//! string, a number or `null` depending on the zone. Identity fields are required so
//! that a payload of the wrong shape fails to decode; descriptive fields are lenient.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Zone list returned by `zone_load_multi`, `sec_lvl`, `cache_lvl` and `devmode`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneList {
    /// Whether more zones exist than were returned.
    #[serde(default)]
    pub has_more: bool,
    /// Number of zones reported by the service.
    #[serde(default)]
    pub count: u32,
    /// Zones.
    pub objs: Vec<Zone>,
}

impl ZoneList {
    /// Find a zone by name.
    #[must_use]
    pub fn find(&self, zone_name: &str) -> Option<&Zone> {
        self.objs.iter().find(|zone| zone.zone_name == zone_name)
    }
}

/// A zone on the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    /// Zone identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub zone_id: String,
    /// Zone (domain) name.
    pub zone_name: String,
    /// Owning user.
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Activation status, e.g. `V` for active.
    #[serde(default)]
    pub zone_status: Option<String>,
    /// Zone mode.
    #[serde(default)]
    pub zone_mode: Option<String>,
    /// Hosting partner identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub host_id: Option<String>,
    /// Zone type, e.g. `P` for partial.
    #[serde(default)]
    pub zone_type: Option<String>,
    /// Hosting partner name.
    #[serde(default)]
    pub host_pubname: Option<String>,
    /// Hosting partner website.
    #[serde(default)]
    pub host_website: Option<String>,
    /// Verification text.
    #[serde(default)]
    pub vtxt: Option<String>,
    /// Name servers assigned to the zone.
    #[serde(default, deserialize_with = "null_as_default")]
    pub fqdns: Vec<String>,
    /// Setup step.
    #[serde(default, deserialize_with = "lenient_string")]
    pub step: Option<String>,
    /// CSS class for the status.
    #[serde(default)]
    pub zone_status_class: Option<String>,
    /// Human readable status.
    #[serde(default)]
    pub zone_status_desc: Option<String>,
    /// Vanity name server map.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ns_vanity_map: Vec<Value>,
    /// Registrar before onboarding.
    #[serde(default)]
    pub orig_registrar: Option<String>,
    /// DNS host before onboarding.
    #[serde(default)]
    pub orig_dnshost: Option<String>,
    /// Name servers before onboarding.
    #[serde(default)]
    pub orig_ns_names: Option<String>,
    /// Plan and feature flags.
    #[serde(default)]
    pub props: Option<ZoneProps>,
    /// Confirmation codes for sensitive actions.
    #[serde(default)]
    pub confirm_code: Option<ConfirmCodes>,
    /// Actions the user may perform.
    #[serde(default, deserialize_with = "null_as_default")]
    pub allow: Vec<String>,
}

impl Zone {
    /// Returns true when the service reports the zone as active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.zone_status.as_deref() == Some("V")
    }
}

/// Plan and feature flags of a zone. Flags are `0`/`1`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ZoneProps {
    /// CNAME setup.
    pub dns_cname: i64,
    /// Partner-hosted DNS.
    pub dns_partner: i64,
    /// Anonymous partner DNS.
    pub dns_anon_partner: i64,
    /// Pro plan.
    pub pro: i64,
    /// Expired Pro plan.
    pub expired_pro: i64,
    /// Pro subscription.
    pub pro_sub: i64,
    /// SSL enabled.
    pub ssl: i64,
    /// SSL expired.
    pub expired_ssl: i64,
    /// Reseller Pro expired.
    pub expired_rs_pro: i64,
    /// Reseller Pro.
    pub reseller_pro: i64,
    /// Forced internal.
    pub force_interal: i64,
    /// SSL needed.
    pub ssl_needed: i64,
    /// Alexa rank.
    pub alexa_rank: i64,
}

/// Confirmation codes returned with a zone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfirmCodes {
    /// Code for deactivating the zone.
    pub zone_deactivate: Option<String>,
    /// Code for enabling development mode.
    #[serde(rename = "zone_dev_mode1")]
    pub zone_dev_mode: Option<String>,
}

/// Record list returned by `rec_load_all`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordList {
    /// Whether more records exist than were returned.
    #[serde(default)]
    pub has_more: bool,
    /// Number of records reported by the service.
    #[serde(default)]
    pub count: u32,
    /// Records.
    pub objs: Vec<Record>,
}

impl RecordList {
    /// Find a record by identifier.
    #[must_use]
    pub fn find(&self, rec_id: &str) -> Option<&Record> {
        self.objs.iter().find(|record| record.rec_id == rec_id)
    }
}

/// A DNS record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Record identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub rec_id: String,
    /// Record tag.
    #[serde(default)]
    pub rec_tag: Option<String>,
    /// Zone the record belongs to.
    #[serde(default)]
    pub zone_name: Option<String>,
    /// Fully qualified record name.
    pub name: String,
    /// Name relative to the zone.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Record type, e.g. `A`.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Priority for MX/SRV records.
    #[serde(default, deserialize_with = "lenient_string")]
    pub prio: Option<String>,
    /// Record content.
    pub content: String,
    /// Content as displayed.
    #[serde(default)]
    pub display_content: Option<String>,
    /// TTL in seconds; `1` means automatic.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ttl: Option<String>,
    /// Maximum TTL.
    #[serde(default)]
    pub ttl_ceil: Option<u64>,
    /// SSL certificate identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ssl_id: Option<String>,
    /// SSL status.
    #[serde(default)]
    pub ssl_status: Option<String>,
    /// SSL expiry.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ssl_expires_on: Option<String>,
    /// Whether the TTL is automatic.
    #[serde(default)]
    pub auto_ttl: Option<i64>,
    /// `1` when traffic is proxied, `0` otherwise.
    #[serde(default, deserialize_with = "lenient_string")]
    pub service_mode: Option<String>,
    /// Proxy and SSL flags.
    #[serde(default)]
    pub props: Option<RecordProps>,
}

impl Record {
    /// Returns true when traffic for this record is proxied.
    #[must_use]
    pub fn is_proxied(&self) -> bool {
        self.service_mode.as_deref() == Some("1")
    }
}

/// Proxy and SSL flags of a record. Flags are `0`/`1`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RecordProps {
    /// Record can be proxied.
    pub proxiable: i64,
    /// Proxying is on.
    pub cloud_on: i64,
    /// CDN open.
    pub cf_open: i64,
    /// SSL enabled.
    pub ssl: i64,
    /// SSL expired.
    pub expired_ssl: i64,
    /// SSL expiring soon.
    pub expiring_ssl: i64,
    /// SSL pending.
    pub pending_ssl: i64,
}

/// Single record returned by `rec_new` and `rec_edit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordObject {
    /// The created or edited record.
    pub obj: Record,
}

/// Traffic statistics returned by `stats`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    /// Start of the window, milliseconds since the epoch.
    #[serde(rename = "timeZero", default)]
    pub time_zero: Option<f64>,
    /// End of the window, milliseconds since the epoch.
    #[serde(rename = "timeEnd", default)]
    pub time_end: Option<f64>,
    /// Number of entries.
    #[serde(default)]
    pub count: u32,
    /// Whether more entries exist.
    #[serde(default)]
    pub has_more: bool,
    /// Per-zone statistics.
    pub objs: Vec<StatsEntry>,
}

impl Stats {
    /// Start of the statistics window.
    #[must_use]
    pub fn window_start(&self) -> Option<DateTime<Utc>> {
        self.time_zero.and_then(millis_to_datetime)
    }

    /// End of the statistics window.
    #[must_use]
    pub fn window_end(&self) -> Option<DateTime<Utc>> {
        self.time_end.and_then(millis_to_datetime)
    }
}

/// Statistics for one zone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsEntry {
    /// When the cached stats were computed.
    pub cached_server_time: Option<f64>,
    /// When the cached stats expire.
    pub cached_expry_time: Option<f64>,
    /// Page views and unique visitors by class.
    pub traffic_breakdown: Option<TrafficBreakdown>,
    /// Bandwidth served by the CDN and by the origin.
    pub bandwidth_served: Option<ServedStats>,
    /// Requests served by the CDN and by the origin.
    pub requests_served: Option<ServedStats>,
    /// Whether the zone is on the Pro plan.
    #[serde(rename = "pro_zone")]
    pub pro_zone: Option<bool>,
    /// Average page load time.
    #[serde(deserialize_with = "lenient_string")]
    pub page_load_time: Option<String>,
    /// Server time when the stats were read.
    pub current_server_time: Option<f64>,
    /// Interval code the stats cover.
    pub interval: Option<i64>,
    /// Zone creation time.
    #[serde(rename = "zoneCDate")]
    pub zone_c_date: Option<f64>,
    /// Security level.
    #[serde(deserialize_with = "lenient_string")]
    pub user_security_setting: Option<String>,
    /// Development mode expiry, `0` when off.
    #[serde(rename = "dev_mode")]
    pub dev_mode: Option<i64>,
    /// IPv6 setting.
    #[serde(rename = "ipv46")]
    pub ipv46: Option<i64>,
    /// Always online. Some responses spell the tag `op`.
    #[serde(rename = "ob", alias = "op")]
    pub ob: Option<i64>,
    /// Cache level.
    #[serde(rename = "cache_lvl", deserialize_with = "lenient_string")]
    pub cache_lvl: Option<String>,
}

/// Page views and unique visitors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrafficBreakdown {
    /// Page views.
    pub pageviews: TrafficCounts,
    /// Unique visitors.
    pub uniques: TrafficCounts,
}

/// Traffic counts by visitor class.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrafficCounts {
    /// Regular visitors.
    pub regular: u64,
    /// Threats.
    pub threat: u64,
    /// Crawlers.
    pub crawler: u64,
}

impl TrafficCounts {
    /// Sum over every class.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.regular + self.threat + self.crawler
    }
}

/// Traffic served by the CDN versus the origin.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServedStats {
    /// Served by the CDN.
    pub cloudflare: f64,
    /// Served by the origin.
    pub user: f64,
}

/// Result of purging the whole cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurgeCache {
    /// Purge time, seconds since the epoch.
    pub fpurge_ts: f64,
    /// Zone after the purge.
    #[serde(default)]
    pub zone: Option<Zone>,
}

impl PurgeCache {
    /// When the purge took effect.
    #[must_use]
    pub fn purged_at(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.fpurge_ts * 1000.0)
    }
}

/// Result of purging a single file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurgeFile {
    /// Verification text of the matching zone.
    #[serde(default)]
    pub vtxt_match: Option<String>,
    /// Purged URL.
    pub url: String,
}

/// Result of `ban`, `nul` and `wl`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IpAction {
    /// Affected IP address.
    pub ip: String,
    /// Applied action, e.g. `BAN`.
    pub action: String,
}

/// Settings returned by `zone_settings`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneSettings {
    /// One entry per zone.
    pub result: Vec<ZoneSetting>,
}

/// Settings of a zone. Values are rendered as strings as the service sends them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZoneSetting {
    /// Security level.
    #[serde(rename = "userSecuritySetting", deserialize_with = "lenient_string")]
    pub user_security_setting: Option<String>,
    /// Development mode expiry, `0` when off.
    pub dev_mode: Option<i64>,
    /// IPv6 setting.
    pub ipv46: Option<i64>,
    /// Always online.
    pub ob: Option<i64>,
    /// Cache level.
    #[serde(deserialize_with = "lenient_string")]
    pub cache_lvl: Option<String>,
    /// Outbound links setting.
    #[serde(rename = "outboundLinks", deserialize_with = "lenient_string")]
    pub outbound_links: Option<String>,
    /// Rocket Loader mode.
    #[serde(rename = "async", deserialize_with = "lenient_string")]
    pub rocket_loader: Option<String>,
    /// Browser integrity check.
    #[serde(deserialize_with = "lenient_string")]
    pub bic: Option<String>,
    /// Challenge TTL.
    #[serde(deserialize_with = "lenient_string")]
    pub chl_ttl: Option<String>,
    /// Browser cache expiry.
    #[serde(deserialize_with = "lenient_string")]
    pub exp_ttl: Option<String>,
    /// Last purge time.
    #[serde(deserialize_with = "lenient_string")]
    pub fpurge_ts: Option<String>,
    /// Hotlink protection.
    #[serde(deserialize_with = "lenient_string")]
    pub hotlink: Option<String>,
    /// Image optimisation.
    #[serde(deserialize_with = "lenient_string")]
    pub img: Option<String>,
    /// Lazy loading.
    #[serde(deserialize_with = "lenient_string")]
    pub lazy: Option<String>,
    /// Minification mask.
    #[serde(deserialize_with = "lenient_string")]
    pub minify: Option<String>,
    /// Outbound link rewriting.
    #[serde(deserialize_with = "lenient_string")]
    pub outlink: Option<String>,
    /// Preloader.
    #[serde(deserialize_with = "lenient_string")]
    pub preload: Option<String>,
    /// Custom 404 handling.
    #[serde(deserialize_with = "lenient_string")]
    pub s404: Option<String>,
    /// Security level code.
    #[serde(deserialize_with = "lenient_string")]
    pub sec_lvl: Option<String>,
    /// SPDY. Some responses spell the tag `sdpy`.
    #[serde(alias = "sdpy", deserialize_with = "lenient_string")]
    pub spdy: Option<String>,
    /// SSL mode.
    #[serde(deserialize_with = "lenient_string")]
    pub ssl: Option<String>,
    /// WAF profile.
    #[serde(deserialize_with = "lenient_string")]
    pub waf_profile: Option<String>,
}

/// Zone activity returned by `zone_check`: zone name to zone id, `0` when inactive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZoneCheck {
    /// Zones keyed by name.
    pub zones: BTreeMap<String, u64>,
}

impl ZoneCheck {
    /// Returns true when `zone` is active on the account.
    #[must_use]
    pub fn is_active(&self, zone: &str) -> bool {
        self.zones.get(zone).is_some_and(|id| *id != 0)
    }
}

/// Recent visitors returned by `zone_ips`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneIps {
    /// Visitor entries.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ips: Vec<IpStat>,
}

/// One recent visitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IpStat {
    /// Visitor IP.
    pub ip: String,
    /// Visitor class.
    #[serde(default)]
    pub classification: Option<String>,
    /// Request count.
    #[serde(default, deserialize_with = "lenient_string")]
    pub hits: Option<String>,
    /// Latitude, when geo data was requested.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude, when geo data was requested.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Zone the visitor hit.
    #[serde(default)]
    pub zone_name: Option<String>,
}

#[allow(clippy::cast_possible_truncation)]
fn millis_to_datetime(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Accepts a string, number or bool; empty strings and null become `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.is_empty() => None,
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(u8::from(flag).to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a scalar, got {other}"
            )))
        }
    })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number identifier, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zone_list_accepts_minimal_entries() {
        let zones: ZoneList = serde_json::from_value(json!({
            "objs": [{"zone_id": "1", "zone_name": "example.com", "fqdns": null}]
        }))
        .unwrap();

        assert_eq!(zones.count, 0);
        assert_eq!(zones.objs.len(), 1);
        assert!(zones.objs[0].fqdns.is_empty());
        assert!(zones.find("example.com").is_some());
        assert!(zones.find("example.org").is_none());
    }

    #[test]
    fn identifiers_accept_numbers() {
        let record: Record = serde_json::from_value(json!({
            "rec_id": 16_606_009,
            "name": "www.example.com",
            "type": "A",
            "content": "203.0.113.10",
            "ttl": 1,
            "service_mode": "1"
        }))
        .unwrap();

        assert_eq!(record.rec_id, "16606009");
        assert_eq!(record.ttl.as_deref(), Some("1"));
        assert!(record.is_proxied());
    }

    #[test]
    fn record_requires_identity_fields() {
        let result = serde_json::from_value::<Record>(json!({
            "name": "www.example.com",
            "type": "A"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn stats_window_converts_millis() {
        let stats: Stats = serde_json::from_value(json!({
            "timeZero": 1_700_000_000_000_f64,
            "timeEnd": 1_700_086_400_000_f64,
            "count": 1,
            "objs": [{
                "trafficBreakdown": {
                    "pageviews": {"regular": 10, "threat": 1, "crawler": 4},
                    "uniques": {"regular": 3, "threat": 1, "crawler": 2}
                },
                "pro_zone": false,
                "cache_lvl": "agg"
            }]
        }))
        .unwrap();

        assert_eq!(stats.window_start().unwrap().timestamp(), 1_700_000_000);
        assert_eq!(stats.window_end().unwrap().timestamp(), 1_700_086_400);
        let breakdown = stats.objs[0].traffic_breakdown.as_ref().unwrap();
        assert_eq!(breakdown.pageviews.total(), 15);
        assert_eq!(stats.objs[0].cache_lvl.as_deref(), Some("agg"));
    }

    #[test]
    fn purge_cache_timestamp() {
        let purge: PurgeCache = serde_json::from_value(json!({"fpurge_ts": 1_700_000_000})).unwrap();
        assert_eq!(purge.purged_at().unwrap().timestamp(), 1_700_000_000);
        assert!(purge.zone.is_none());
    }

    #[test]
    fn misspelled_setting_tags_are_accepted() {
        let entry: StatsEntry = serde_json::from_value(json!({"op": 1})).unwrap();
        assert_eq!(entry.ob, Some(1));

        let setting: ZoneSetting = serde_json::from_value(json!({"sdpy": "1"})).unwrap();
        assert_eq!(setting.spdy.as_deref(), Some("1"));

        let setting: ZoneSetting = serde_json::from_value(json!({"spdy": 0})).unwrap();
        assert_eq!(setting.spdy.as_deref(), Some("0"));
    }

    #[test]
    fn zone_check_reports_activity() {
        let check: ZoneCheck = serde_json::from_value(json!({
            "zones": {"example.com": 4_025_956, "example.org": 0}
        }))
        .unwrap();

        assert!(check.is_active("example.com"));
        assert!(!check.is_active("example.org"));
        assert!(!check.is_active("example.net"));
    }
}
