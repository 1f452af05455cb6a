//! Table of remote operations.
//!
//! Each [`Action`] names one remote operation tag and whether the dispatcher has to
//! attach the client's zone. Result shapes are chosen by the typed wrappers on
//! [`crate::CloudGuardClient`].

use cloudguard_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Remote operation understood by the CloudGuard endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Traffic statistics for a zone
    Stats,
    /// All zones on the account
    ZoneLoadMulti,
    /// All DNS records in a zone
    RecLoadAll,
    /// Create a DNS record
    RecNew,
    /// Replace a DNS record
    RecEdit,
    /// Delete a DNS record
    RecDelete,
    /// Set the security level
    SecLvl,
    /// Set the cache level
    CacheLvl,
    /// Toggle development mode
    DevMode,
    /// Purge the whole cache or a single file
    FpurgeTs,
    /// Threat score lookup for an IP
    IpLkup,
    /// Blacklist an IP
    Ban,
    /// Remove an IP from both lists
    Nul,
    /// Whitelist an IP
    Wl,
    /// Toggle Mirage2 image optimisation
    Mirage2,
    /// Set the minification mask
    Minify,
    /// Set the Rocket Loader mode
    Async,
    /// Toggle IPv6 support
    Ipv46,
    /// Take a zone snapshot
    ZoneGrab,
    /// Current zone settings
    ZoneSettings,
    /// Check which zones are active
    ZoneCheck,
    /// Recent visitor IPs
    ZoneIps,
}

impl Action {
    /// Returns the wire tag sent in the `a` field.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Stats => "stats",
            Self::ZoneLoadMulti => "zone_load_multi",
            Self::RecLoadAll => "rec_load_all",
            Self::RecNew => "rec_new",
            Self::RecEdit => "rec_edit",
            Self::RecDelete => "rec_delete",
            Self::SecLvl => "sec_lvl",
            Self::CacheLvl => "cache_lvl",
            Self::DevMode => "devmode",
            Self::FpurgeTs => "fpurge_ts",
            Self::IpLkup => "ip_lkup",
            Self::Ban => "ban",
            Self::Nul => "nul",
            Self::Wl => "wl",
            Self::Mirage2 => "mirage2",
            Self::Minify => "minify",
            Self::Async => "async",
            Self::Ipv46 => "ipv46",
            Self::ZoneGrab => "zone_grab",
            Self::ZoneSettings => "zone_settings",
            Self::ZoneCheck => "zone_check",
            Self::ZoneIps => "zone_ips",
        }
    }

    /// Whether the request must carry the target zone in the `z` field.
    #[must_use]
    pub const fn is_zone_scoped(&self) -> bool {
        !matches!(self, Self::ZoneLoadMulti)
    }

    /// Returns all known actions.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Stats,
            Self::ZoneLoadMulti,
            Self::RecLoadAll,
            Self::RecNew,
            Self::RecEdit,
            Self::RecDelete,
            Self::SecLvl,
            Self::CacheLvl,
            Self::DevMode,
            Self::FpurgeTs,
            Self::IpLkup,
            Self::Ban,
            Self::Nul,
            Self::Wl,
            Self::Mirage2,
            Self::Minify,
            Self::Async,
            Self::Ipv46,
            Self::ZoneGrab,
            Self::ZoneSettings,
            Self::ZoneCheck,
            Self::ZoneIps,
        ]
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.tag() == s)
            .ok_or_else(|| Error::ValidationError(format!("Unknown action: {s}")))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tags_are_unique_and_parse_back() {
        let tags: HashSet<_> = Action::all().iter().map(Action::tag).collect();
        assert_eq!(tags.len(), Action::all().len());

        for action in Action::all() {
            assert_eq!(action.tag().parse::<Action>().unwrap(), *action);
        }
    }

    #[test]
    fn only_account_listing_skips_zone() {
        let unscoped: Vec<_> = Action::all()
            .iter()
            .filter(|action| !action.is_zone_scoped())
            .collect();
        assert_eq!(unscoped, vec![&Action::ZoneLoadMulti]);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(matches!(
            "rec_purge".parse::<Action>(),
            Err(Error::ValidationError(_))
        ));
        assert_eq!(Action::Async.to_string(), "async");
    }
}
