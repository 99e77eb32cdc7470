//! Enforcement hooks the host environment provides.

/// Notice shown to every session terminated by a revocation.
pub const EVICTION_NOTICE: &str = "This server is not authorized to run this product.";

/// Capabilities the embedding environment exposes to the agent.
///
/// `evict_all` and `halt` together are the mass-eviction enforcement
/// action: once triggered they run to completion; evictions are not
/// cancellable mid-flight.
pub trait SessionHost: Send + Sync {
    /// Terminate every currently active session with the given notice.
    fn evict_all(&self, notice: &str);

    /// Stop all further protected functionality for this instance. Called
    /// once, after `evict_all`; the instance is killed, not degraded.
    fn halt(&self);
}
