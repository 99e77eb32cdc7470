//! HTTP adapters for the enrichment and analytics ports.

use async_trait::async_trait;
use gate_core::{is_placeholder_name, GateError, PlaceId, PLACEHOLDER_NAME};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::ports::{NameResolver, UsageEvent, UsageNotifier};

/// Resolves display names from an external game-details API.
///
/// The request timeout is enforced at the client level; a slow endpoint
/// costs at most the configured cap before the caller falls back.
pub struct HttpNameResolver {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PlaceDetails {
    name: Option<String>,
}

impl HttpNameResolver {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::TransientUpstream(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl NameResolver for HttpNameResolver {
    async fn resolve_name(&self, place_id: &PlaceId) -> Result<String, GateError> {
        let url = format!("{}/places/{}", self.base_url.trim_end_matches('/'), place_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GateError::TransientUpstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GateError::TransientUpstream(format!(
                "resolver answered {}",
                response.status()
            )));
        }

        let details: PlaceDetails = response
            .json()
            .await
            .map_err(|e| GateError::TransientUpstream(e.to_string()))?;

        match details.name {
            Some(name) if !name.is_empty() && !is_placeholder_name(&name) => Ok(name),
            _ => Err(GateError::TransientUpstream(
                "resolver returned no usable name".to_string(),
            )),
        }
    }
}

/// Posts analytics events to a collection endpoint, fire-and-forget.
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::TransientUpstream(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl UsageNotifier for HttpNotifier {
    async fn notify(&self, event: UsageEvent) -> Result<(), GateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&event)
            .send()
            .await
            .map_err(|e| GateError::TransientUpstream(e.to_string()))?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "analytics endpoint rejected event");
        }
        Ok(())
    }
}

/// Pick the name to record for a report.
///
/// Enrichment result wins when usable; otherwise the client-supplied name;
/// otherwise the placeholder.
pub fn final_name(resolved: Option<String>, provided: Option<String>) -> String {
    if let Some(name) = resolved {
        if !is_placeholder_name(&name) && !name.is_empty() {
            return name;
        }
    }
    match provided {
        Some(name) if !name.is_empty() => name,
        _ => PLACEHOLDER_NAME.to_string(),
    }
}
