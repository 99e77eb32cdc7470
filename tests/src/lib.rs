//! # Scriptgate Test Suite
//!
//! Unified test crate covering flows that span more than one crate:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── concurrency.rs   # Racing first-sight provisioning
//!     ├── lifecycle.rs     # Agent <-> service revocation round trips
//!     └── wire.rs          # Full router over the in-memory stores
//! ```
//!
//! Run with `cargo test -p gate-tests`.

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
