//! # cloudguard-core
//!
//! Core types and utilities for talking to the CloudGuard DNS/CDN management API.
//!
//! This crate holds everything the request dispatcher needs that is independent of
//! any particular operation: the error taxonomy, client configuration and
//! credentials, the form parameter builder and the response envelope codec.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and remote rejection classification
//! - [`config`] - Credentials and validated client configuration
//! - [`client`] - HTTP client settings and defaults
//! - [`form`] - Form parameter builder for request bodies
//! - [`envelope`] - Two-phase decoding of the response envelope

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod form;

// Re-export commonly used types
pub use config::{CloudGuardConfig, Credentials};
pub use envelope::{decode, Envelope, EnvelopeStatus};
pub use error::{Error, RejectionKind, Result};
pub use form::FormParams;
