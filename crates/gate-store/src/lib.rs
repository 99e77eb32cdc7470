//! # Gate Store
//!
//! Persistence contracts for the licensing engine and the in-memory adapters
//! that implement them.
//!
//! - `ports` - the driven-port traits the server requires
//! - `memory` - thread-safe in-memory implementations
//!
//! The whitelist store's uniqueness guarantee on `(product, place)` is the
//! sole concurrency-control mechanism for first-sight auto-provisioning;
//! `WhitelistStore::insert_or_get` is that guarantee expressed as an API.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod memory;
pub mod ports;

pub use memory::{MemoryDirectory, MemoryLedger, MemoryWhitelist};
pub use ports::{InsertOutcome, ProductDirectory, UsageLedger, UsageSummary, WhitelistStore};
