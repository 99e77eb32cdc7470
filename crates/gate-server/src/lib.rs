//! # Gate Server
//!
//! The network-facing half of the licensing engine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        GATE SERVER                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /report            GET /check/{key}/{place}            │
//! │        │                        │                            │
//! │  ┌─────┴────────────────────────┴─────┐   ┌───────────────┐  │
//! │  │          ReportingService          │   │ Management API│  │
//! │  │  ledger append → auto-provision →  │   │ (owner token) │  │
//! │  │  decide                            │   └───────┬───────┘  │
//! │  └─────┬──────────────┬───────────────┘           │          │
//! │        │              │ best-effort               │          │
//! │        ▼              ▼                           ▼          │
//! │  WhitelistStore   NameResolver / UsageNotifier  stores       │
//! │  UsageLedger      (bounded timeout, never gate)              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each request is an independent, stateless unit of work; the whitelist
//! store's uniqueness constraint is the only cross-request concurrency
//! control. Enrichment and analytics collaborators never block or fail the
//! primary response path.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod http;
pub mod ports;
pub mod service;

pub use auth::OwnerRegistry;
pub use config::ServerConfig;
pub use enrichment::{final_name, HttpNameResolver, HttpNotifier};
pub use error::ApiError;
pub use http::{build_router, AppState, VerdictResponse};
pub use ports::{NameResolver, NullNotifier, NullResolver, UsageEvent, UsageNotifier};
pub use service::{ClientMeta, ReportInput, ReportOutcome, ReportingService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
