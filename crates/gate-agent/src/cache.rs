//! Last-known verdict state.
//!
//! The cache is owned by the polling task (single writer) and shared
//! read-only with the session admission path. It is explicit state, not
//! ambient globals: everything enforcement needs is in this one struct.

use chrono::{DateTime, Utc};
use gate_core::{decide, Verdict, WhitelistStatus};
use parking_lot::RwLock;
use std::sync::Arc;

/// The agent's view of its own authorization.
#[derive(Debug, Clone)]
pub struct VerdictCache {
    /// Status from the last successful poll.
    pub status: WhitelistStatus,
    /// Active flag from the last successful poll.
    pub active: bool,
    /// When the last successful poll landed; `None` before first contact.
    pub last_updated: Option<DateTime<Utc>>,
}

impl VerdictCache {
    /// Pre-first-contact state: the fail-open pending defaults.
    pub fn new() -> Self {
        Self {
            status: WhitelistStatus::Pending,
            active: true,
            last_updated: None,
        }
    }

    /// The verdict the cached state implies right now.
    pub fn verdict(&self) -> Verdict {
        decide(self.status, self.active)
    }

    /// Record a fresh verdict from a successful poll.
    pub fn apply(&mut self, verdict: Verdict) {
        self.status = verdict.status;
        self.active = verdict.active;
        self.last_updated = Some(Utc::now());
    }
}

impl Default for VerdictCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to the cache. The poller holds the only writer.
pub type SharedVerdict = Arc<RwLock<VerdictCache>>;

/// Admission-time gate for new sessions.
///
/// Sessions admitted between polls are checked against the last cached
/// verdict so polling latency never creates an admission window during a
/// known-revoked period.
#[derive(Clone)]
pub struct SessionGate {
    cache: SharedVerdict,
}

impl SessionGate {
    pub fn new(cache: SharedVerdict) -> Self {
        Self { cache }
    }

    /// Whether a new session may be admitted right now.
    pub fn admit(&self) -> bool {
        self.cache.read().verdict().authorized
    }
}
