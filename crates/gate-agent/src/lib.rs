//! # Gate Agent
//!
//! The logic a protected client instance must run to stay consistent with
//! server-side revocation, regardless of where it is embedded:
//!
//! - `cache` - last-known verdict state and the session admission gate
//! - `transport` - the reporting wire contract and its HTTP adapter
//! - `session` - the enforcement hooks the host environment provides
//! - `poller` - the periodic report loop and eviction-on-revocation logic
//!
//! Policy: fail-open. A transport failure never degrades the client; the
//! last-known verdict (or the pending default before first contact) keeps
//! holding for up to one polling interval. That staleness bound is an
//! accepted weak-consistency guarantee.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cache;
pub mod poller;
pub mod session;
pub mod transport;

pub use cache::{SessionGate, SharedVerdict, VerdictCache};
pub use poller::{PollAgent, PollConfig};
pub use session::{SessionHost, EVICTION_NOTICE};
pub use transport::{AgentReport, HttpTransport, ReportTransport, TransportError};
