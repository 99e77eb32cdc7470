//! The periodic report loop.
//!
//! Every interval the agent sends one usage report and applies the verdict
//! it gets back. Transitions are what matter: the first poll that flips the
//! cached verdict from authorized to denied triggers mass eviction exactly
//! once; repeated denials are no-ops; a later re-authorization resumes
//! admission without restarting anything.

use crate::cache::{SharedVerdict, VerdictCache};
use crate::session::{SessionHost, EVICTION_NOTICE};
use crate::transport::{AgentReport, ReportTransport};
use gate_core::Verdict;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Tunables for the poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Time between reports. Also the staleness bound on the cached verdict.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

/// The polling agent for one protected instance.
pub struct PollAgent<T, H> {
    transport: T,
    host: Arc<H>,
    report: AgentReport,
    cache: SharedVerdict,
    config: PollConfig,
}

impl<T, H> PollAgent<T, H>
where
    T: ReportTransport,
    H: SessionHost,
{
    pub fn new(transport: T, host: Arc<H>, report: AgentReport, config: PollConfig) -> Self {
        Self {
            transport,
            host,
            report,
            cache: Arc::new(RwLock::new(VerdictCache::new())),
            config,
        }
    }

    /// Handle to the cached verdict, for wiring up a `SessionGate`.
    pub fn verdict_handle(&self) -> SharedVerdict {
        Arc::clone(&self.cache)
    }

    /// Send one report and fold the outcome into the cache.
    ///
    /// A transport failure leaves the cache untouched: the last-known
    /// verdict keeps holding until the next interval.
    pub async fn poll_once(&self) {
        match self.transport.send_report(&self.report).await {
            Ok(verdict) => self.apply_verdict(verdict),
            Err(e) => {
                warn!(error = %e, "usage report failed, keeping last-known verdict");
            }
        }
    }

    fn apply_verdict(&self, verdict: Verdict) {
        let was_authorized = {
            let mut cache = self.cache.write();
            let was = cache.verdict().authorized;
            cache.apply(verdict);
            was
        };

        match (was_authorized, verdict.authorized) {
            (true, false) => {
                warn!(status = %verdict.status, "authorization revoked, evicting all sessions");
                self.host.evict_all(EVICTION_NOTICE);
                self.host.halt();
            }
            (false, true) => {
                info!(status = %verdict.status, "authorization restored");
            }
            _ => {}
        }
    }

    /// Run the loop until `shutdown` flips to true or its sender is
    /// dropped. The first report is sent immediately, then one per
    /// interval.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.poll_once().await,
                changed = shutdown.changed() => {
                    // A closed channel is terminal; keeping the receiver in
                    // the select would resolve immediately on every
                    // iteration and spin the loop.
                    if changed.is_err() || *shutdown.borrow() {
                        info!("poll agent shutting down");
                        return;
                    }
                }
            }
        }
    }
}
