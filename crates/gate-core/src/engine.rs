//! # Authorization Engine
//!
//! The pure decision function mapping whitelist state to a verdict. This is
//! the single place enforcement policy lives; everything else (endpoint,
//! agent, management API) consumes its output.

use crate::entities::{Verdict, WhitelistEntry, WhitelistStatus};

/// Compute the verdict for a `(status, active)` pair.
///
/// Rules, in priority order:
///
/// 1. `Unwhitelisted` is denied regardless of `active`. Unwhitelisting is an
///    unconditional override.
/// 2. `Whitelisted` is authorized iff `active`.
/// 3. `Pending` is authorized: unknown clients default-allow so legitimate
///    new deployments are never blocked before an owner has reviewed them.
///
/// Deterministic, total, side-effect free.
pub fn decide(status: WhitelistStatus, active: bool) -> Verdict {
    let authorized = match status {
        WhitelistStatus::Unwhitelisted => false,
        WhitelistStatus::Whitelisted => active,
        WhitelistStatus::Pending => true,
    };
    Verdict {
        authorized,
        status,
        active,
    }
}

/// Verdict for an optional whitelist entry.
///
/// `None` means no entry exists yet; the pair is treated as pending/active,
/// the fail-open default.
pub fn decide_entry(entry: Option<&WhitelistEntry>) -> Verdict {
    match entry {
        Some(e) => decide(e.status, e.active),
        None => Verdict::fail_open_default(),
    }
}
