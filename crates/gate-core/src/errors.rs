//! # Domain Errors
//!
//! The error taxonomy shared by the store and server crates.
//!
//! - `NotFound` is surfaced to the caller and never retried.
//! - `Conflict` is recovered locally by re-reading the existing row and is
//!   never surfaced.
//! - `TransientUpstream` is swallowed with a fallback value and only logged.

use thiserror::Error;

/// Errors produced by the licensing engine and its stores.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// Unknown product key or missing entry. Surfaced to the caller without
    /// distinguishing "never existed" from "revoked".
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violation on a whitelist insert. Recovery path: the row
    /// now exists, re-read it and proceed.
    #[error("conflict: entry already exists for place {0}")]
    Conflict(String),

    /// Enrichment or analytics collaborator failed. The caller falls back to
    /// default values; never surfaced to the reporting client.
    #[error("transient upstream failure: {0}")]
    TransientUpstream(String),

    /// Caller does not own the referenced product.
    #[error("not authorized")]
    NotAuthorized,

    /// Underlying store failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl GateError {
    /// Unknown product key, worded exactly as deployed clients expect.
    pub fn invalid_product_key() -> Self {
        GateError::NotFound("invalid product key".to_string())
    }
}
