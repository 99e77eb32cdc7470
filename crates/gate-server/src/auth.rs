//! Owner authentication for the management API.
//!
//! Opaque bearer tokens map to owner accounts. Registration and credential
//! storage live outside this system; the registry only answers "which owner
//! does this token belong to".

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use dashmap::DashMap;
use gate_core::OwnerId;

use crate::error::ApiError;

/// Token-to-owner lookup table.
#[derive(Default)]
pub struct OwnerRegistry {
    tokens: DashMap<String, OwnerId>,
}

impl OwnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for an owner.
    pub fn insert(&self, token: impl Into<String>, owner: OwnerId) {
        self.tokens.insert(token.into(), owner);
    }

    /// Resolve a token to its owner.
    pub fn resolve(&self, token: &str) -> Option<OwnerId> {
        self.tokens.get(token).map(|o| *o)
    }

    /// Parse `token:owner-uuid` pairs separated by commas, the format used
    /// by the `SCRIPTGATE_OWNER_TOKENS` environment variable.
    pub fn from_env_value(value: &str) -> Self {
        let registry = Self::new();
        for pair in value.split(',').filter(|p| !p.is_empty()) {
            if let Some((token, owner)) = pair.split_once(':') {
                match owner.trim().parse() {
                    Ok(owner_id) => registry.insert(token.trim().to_string(), owner_id),
                    Err(_) => tracing::warn!("skipping malformed owner token entry"),
                }
            }
        }
        registry
    }
}

/// Extract and resolve the bearer token from request headers.
pub fn authenticate(registry: &OwnerRegistry, headers: &HeaderMap) -> Result<OwnerId, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(ApiError::unauthorized)?;
    registry.resolve(token).ok_or_else(ApiError::unauthorized)
}
