//! CloudGuard client and data models.
//!
//! Provides typed result structures and an asynchronous client for the CloudGuard
//! DNS/CDN management API. Every operation is a form-encoded POST to a single
//! endpoint; see [`CloudGuardClient::invoke`] for the shared dispatch path.

#![deny(missing_docs)]

pub mod action;
pub mod client;
pub mod models;
pub mod request;
pub mod transport;

pub use action::Action;
pub use client::{CloudGuardClient, CloudGuardClientBuilder};
pub use models::{
    IpAction, IpStat, PurgeCache, PurgeFile, Record, RecordList, RecordObject, Stats, Zone,
    ZoneCheck, ZoneIps, ZoneList, ZoneSetting, ZoneSettings,
};
pub use request::{
    CacheLevel, IpClass, RecordFields, RecordType, RocketLoader, SecurityLevel, SrvFields,
    StatsInterval, ZoneIpsQuery,
};
pub use transport::{HttpTransport, RawResponse, Transport};

pub use cloudguard_core::client::ClientConfig;
pub use cloudguard_core::{CloudGuardConfig, Error, RejectionKind};

/// Convenient result alias that reuses the shared CloudGuard error type.
pub type Result<T> = cloudguard_core::Result<T>;
