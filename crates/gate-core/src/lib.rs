//! # Gate Core
//!
//! Pure domain logic for the license authorization engine.
//!
//! This crate holds everything that must be testable without persistence or
//! network code:
//!
//! - `entities` - Product, WhitelistEntry, UsageRecord, Verdict
//! - `engine` - the `decide` function, the single place enforcement policy lives
//! - `provisioning` - the first-sight auto-provisioning decision rule
//! - `errors` - the domain error taxonomy
//!
//! No async, no I/O. The store and server crates depend on this one, never
//! the other way around.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod engine;
pub mod entities;
pub mod errors;
pub mod provisioning;

pub use engine::{decide, decide_entry};
pub use entities::{
    is_placeholder_name, OwnerId, PlaceId, Product, ProductKey, UsageRecord, Verdict,
    VerifiedUser, WhitelistEntry, WhitelistStatus, PLACEHOLDER_NAME,
};
pub use errors::GateError;
pub use provisioning::{plan_provisioning, ProvisioningAction};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
