//! Typed parameters for CloudGuard operations.
//!
//! These types only exist to turn caller intent into the string values the remote
//! API expects; each one renders itself through `as_param` or `to_form`.

use crate::models::Record;
use cloudguard_core::{Error, FormParams, Result};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// TTL value meaning "let the service choose".
pub const AUTOMATIC_TTL: u32 = 1;
/// Smallest explicit TTL the service accepts.
pub const MIN_TTL: u32 = 120;
/// Largest explicit TTL the service accepts.
pub const MAX_TTL: u32 = 86_400;
/// Highest valid minification mask (JavaScript | CSS | HTML).
pub const MAX_MINIFY_MASK: u8 = 7;

/// Time window for [`crate::CloudGuardClient::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsInterval {
    /// Past 365 days
    PastYear,
    /// Past 30 days
    PastMonth,
    /// Past 7 days
    PastWeek,
    /// Past day
    PastDay,
    /// Last 24 hours (Pro zones)
    Last24Hours,
    /// Last 12 hours (Pro zones)
    Last12Hours,
    /// Last 6 hours (Pro zones)
    Last6Hours,
}

impl StatsInterval {
    /// Returns the numeric code sent as `interval`.
    #[must_use]
    pub const fn as_param(&self) -> u16 {
        match self {
            Self::PastYear => 10,
            Self::PastMonth => 20,
            Self::PastWeek => 30,
            Self::PastDay => 40,
            Self::Last24Hours => 100,
            Self::Last12Hours => 110,
            Self::Last6Hours => 120,
        }
    }
}

/// Zone security level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityLevel {
    /// "I'm under attack"
    UnderAttack,
    /// High
    High,
    /// Medium
    Medium,
    /// Low
    Low,
    /// Essentially off
    EssentiallyOff,
}

impl SecurityLevel {
    /// Returns the value sent as `v`.
    #[must_use]
    pub const fn as_param(&self) -> &'static str {
        match self {
            Self::UnderAttack => "help",
            Self::High => "high",
            Self::Medium => "med",
            Self::Low => "low",
            Self::EssentiallyOff => "eoff",
        }
    }
}

/// Zone cache level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheLevel {
    /// Cache every static resource regardless of query string
    Aggressive,
    /// Cache static resources without a query string
    Basic,
}

impl CacheLevel {
    /// Returns the value sent as `v`.
    #[must_use]
    pub const fn as_param(&self) -> &'static str {
        match self {
            Self::Aggressive => "agg",
            Self::Basic => "basic",
        }
    }
}

/// Rocket Loader mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RocketLoader {
    /// Disabled
    Off,
    /// Applied to every script
    Automatic,
    /// Applied only to tagged scripts
    Manual,
}

impl RocketLoader {
    /// Returns the value sent as `v`.
    #[must_use]
    pub const fn as_param(&self) -> &'static str {
        match self {
            Self::Off => "0",
            Self::Automatic => "a",
            Self::Manual => "m",
        }
    }
}

/// Visitor classification filter for [`ZoneIpsQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpClass {
    /// Regular visitors
    Regular,
    /// Crawlers and search engines
    Crawler,
    /// Threats
    Threat,
}

impl IpClass {
    /// Returns the value sent as `class`.
    #[must_use]
    pub const fn as_param(&self) -> &'static str {
        match self {
            Self::Regular => "r",
            Self::Crawler => "s",
            Self::Threat => "t",
        }
    }
}

/// DNS record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// Canonical name
    Cname,
    /// Mail exchanger
    Mx,
    /// Text
    Txt,
    /// Sender policy framework
    Spf,
    /// Name server
    Ns,
    /// Service locator
    Srv,
    /// Location
    Loc,
}

impl RecordType {
    /// Returns the record type as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Spf => "SPF",
            Self::Ns => "NS",
            Self::Srv => "SRV",
            Self::Loc => "LOC",
        }
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::Aaaa),
            "CNAME" => Ok(Self::Cname),
            "MX" => Ok(Self::Mx),
            "TXT" => Ok(Self::Txt),
            "SPF" => Ok(Self::Spf),
            "NS" => Ok(Self::Ns),
            "SRV" => Ok(Self::Srv),
            "LOC" => Ok(Self::Loc),
            _ => Err(Error::ValidationError(format!("Unknown record type: {s}"))),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra fields carried by SRV records.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct SrvFields {
    /// Service name, e.g. `_sip`
    #[validate(length(min = 1))]
    pub service: String,
    /// Service record name
    #[validate(length(min = 1))]
    pub srvname: String,
    /// Protocol, e.g. `_tcp`
    #[validate(length(min = 1))]
    pub protocol: String,
    /// Relative weight
    pub weight: u16,
    /// Target port
    pub port: u16,
    /// Target host
    #[validate(length(min = 1))]
    pub target: String,
}

/// Fields of a DNS record as sent by `rec_new` and `rec_edit`.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct RecordFields {
    /// Record type
    pub record_type: RecordType,
    /// Record name
    #[validate(length(min = 1))]
    pub name: String,
    /// Record content
    #[validate(length(min = 1))]
    pub content: String,
    /// TTL in seconds, [`AUTOMATIC_TTL`] for automatic
    pub ttl: u32,
    /// MX/SRV priority
    pub prio: Option<u16>,
    /// Whether traffic is proxied through the CDN
    pub service_mode: Option<bool>,
    /// SRV specific fields
    #[validate(nested)]
    pub srv: Option<SrvFields>,
}

impl RecordFields {
    /// Create fields for a record with an automatic TTL.
    pub fn new(record_type: RecordType, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            record_type,
            name: name.into(),
            content: content.into(),
            ttl: AUTOMATIC_TTL,
            prio: None,
            service_mode: None,
            srv: None,
        }
    }

    /// Rebuild typed fields from a fetched record, e.g. to change its content.
    ///
    /// SRV data is not split out: the service reports it inside `name` and
    /// `content`, which are copied as-is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the record type, TTL or priority is not
    /// understood.
    pub fn from_record(record: &Record) -> Result<Self> {
        let ttl = match record.ttl.as_deref() {
            None | Some("") => AUTOMATIC_TTL,
            Some(raw) => raw.parse().map_err(|_| {
                Error::ValidationError(format!("Record {} has invalid TTL `{raw}`", record.rec_id))
            })?,
        };
        let prio = record
            .prio
            .as_deref()
            .map(|raw| {
                raw.parse().map_err(|_| {
                    Error::ValidationError(format!(
                        "Record {} has invalid priority `{raw}`",
                        record.rec_id
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            record_type: record.record_type.parse()?,
            name: record.name.clone(),
            content: record.content.clone(),
            ttl,
            prio,
            service_mode: record.service_mode.as_deref().map(|mode| mode == "1"),
            srv: None,
        })
    }

    /// Set the TTL.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_prio(mut self, prio: u16) -> Self {
        self.prio = Some(prio);
        self
    }

    /// Set whether the record is proxied.
    #[must_use]
    pub const fn with_service_mode(mut self, proxied: bool) -> Self {
        self.service_mode = Some(proxied);
        self
    }

    /// Attach SRV fields.
    #[must_use]
    pub fn with_srv(mut self, srv: SrvFields) -> Self {
        self.srv = Some(srv);
        self
    }

    /// Validate and render the fields as form parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for empty names or content and for TTLs
    /// outside the accepted range.
    pub fn to_form(&self) -> Result<FormParams> {
        self.validate()?;
        if self.ttl != AUTOMATIC_TTL && !(MIN_TTL..=MAX_TTL).contains(&self.ttl) {
            return Err(Error::ValidationError(format!(
                "TTL must be {AUTOMATIC_TTL} or between {MIN_TTL} and {MAX_TTL}, got {}",
                self.ttl
            )));
        }

        let mut form = FormParams::new()
            .with("type", self.record_type)
            .with("name", &self.name)
            .with("content", &self.content)
            .with("ttl", self.ttl);
        form.set_opt("prio", self.prio);
        form.set_opt_with("service_mode", self.service_mode, flag);

        if let Some(srv) = &self.srv {
            form.set("service", &srv.service);
            form.set("srvname", &srv.srvname);
            form.set("protocol", &srv.protocol);
            form.set("weight", srv.weight);
            form.set("port", srv.port);
            form.set("target", &srv.target);
        }

        Ok(form)
    }
}

/// Render a fetched record for `rec_edit` exactly as the service reported it.
///
/// No local checks are applied: the record already exists remotely, so its type,
/// TTL and priority are echoed back even when [`RecordFields`] would reject them.
pub(crate) fn resubmit_form(record: &Record) -> FormParams {
    let ttl = match record.ttl.as_deref() {
        None | Some("") => AUTOMATIC_TTL.to_string(),
        Some(raw) => raw.to_string(),
    };

    let mut form = FormParams::new()
        .with("type", &record.record_type)
        .with("name", &record.name)
        .with("content", &record.content)
        .with("ttl", ttl);
    form.set_opt("prio", record.prio.as_deref());
    form.set_opt("service_mode", record.service_mode.as_deref());
    form
}

/// Filters for [`crate::CloudGuardClient::recent_ips`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneIpsQuery {
    hours: Option<u8>,
    class: Option<IpClass>,
    geo: bool,
}

impl ZoneIpsQuery {
    /// Create an empty query.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hours: None,
            class: None,
            geo: false,
        }
    }

    /// Look back this many hours (the service caps it at 48).
    #[must_use]
    pub const fn with_hours(mut self, hours: u8) -> Self {
        self.hours = Some(hours);
        self
    }

    /// Restrict to one visitor class.
    #[must_use]
    pub const fn with_class(mut self, class: IpClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Include latitude and longitude.
    #[must_use]
    pub const fn with_geo(mut self, geo: bool) -> Self {
        self.geo = geo;
        self
    }

    pub(crate) fn to_form(&self) -> FormParams {
        let mut form = FormParams::new();
        form.set_opt("hours", self.hours);
        form.set_opt_with("class", self.class, |class| class.as_param().to_string());
        if self.geo {
            form.set("geo", "1");
        }
        form
    }
}

/// Render a boolean toggle the way the API expects it.
pub(crate) fn flag(enabled: bool) -> String {
    let value = if enabled { "1" } else { "0" };
    value.to_string()
}
