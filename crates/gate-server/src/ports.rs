//! Capability ports for best-effort collaborators.
//!
//! Enrichment and analytics are injected into the reporting service as
//! traits, invoked with a bounded timeout or fire-and-forget, and their
//! errors are explicitly ignored - never awaited on the critical path.

use async_trait::async_trait;
use gate_core::{GateError, PlaceId};
use serde::Serialize;

/// Resolves a client instance's real display name from an external service.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve the display name for a place. Errors are `TransientUpstream`
    /// and the caller falls back to the client-supplied name.
    async fn resolve_name(&self, place_id: &PlaceId) -> Result<String, GateError>;
}

/// Resolver used when enrichment is disabled; always fails over to the
/// client-supplied name.
pub struct NullResolver;

#[async_trait]
impl NameResolver for NullResolver {
    async fn resolve_name(&self, _place_id: &PlaceId) -> Result<String, GateError> {
        Err(GateError::TransientUpstream(
            "name resolution disabled".to_string(),
        ))
    }
}

/// One analytics event describing a received report.
#[derive(Debug, Clone, Serialize)]
pub struct UsageEvent {
    pub place_id: String,
    pub game_name: String,
    pub verified_user: bool,
}

/// Side-channel sink for analytics events.
#[async_trait]
pub trait UsageNotifier: Send + Sync {
    /// Deliver one event. Failures are logged by the caller and ignored.
    async fn notify(&self, event: UsageEvent) -> Result<(), GateError>;
}

/// Notifier used when analytics is disabled.
pub struct NullNotifier;

#[async_trait]
impl UsageNotifier for NullNotifier {
    async fn notify(&self, _event: UsageEvent) -> Result<(), GateError> {
        Ok(())
    }
}
