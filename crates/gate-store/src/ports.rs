//! # Persistence Ports (Driven Ports)
//!
//! Interfaces the server requires its host to implement. Production
//! deployments back these with a database; tests and the bundled binary use
//! the in-memory adapters in [`crate::memory`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gate_core::{
    GateError, OwnerId, PlaceId, Product, ProductKey, UsageRecord, WhitelistEntry, WhitelistStatus,
};
use serde::Serialize;
use uuid::Uuid;

/// Result of an atomic insert-or-fetch on the whitelist store.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// The candidate row was inserted; no entry existed before.
    Inserted(WhitelistEntry),
    /// A row already existed for the pair; the candidate was discarded and
    /// the existing row returned. This is the recovered `Conflict` path.
    Existing(WhitelistEntry),
}

impl InsertOutcome {
    /// The entry now in the store, regardless of which way the race went.
    pub fn entry(&self) -> &WhitelistEntry {
        match self {
            InsertOutcome::Inserted(e) | InsertOutcome::Existing(e) => e,
        }
    }
}

/// Lookup contract exposed by the identity registry: product keys to
/// products, and ownership checks for the management API.
#[async_trait]
pub trait ProductDirectory: Send + Sync {
    /// Resolve a product key to its product. Unknown keys are `NotFound`
    /// without distinguishing "never existed" from "revoked".
    async fn find_by_key(&self, key: &ProductKey) -> Result<Product, GateError>;

    /// Fetch a product by id.
    async fn find_by_id(&self, product_id: Uuid) -> Result<Product, GateError>;

    /// List products owned by an account, newest first.
    async fn list_for_owner(&self, owner: OwnerId) -> Result<Vec<Product>, GateError>;

    /// Register a product.
    async fn insert(&self, product: Product) -> Result<(), GateError>;

    /// Delete a product. The caller is responsible for cascading to the
    /// whitelist store and usage ledger.
    async fn delete(&self, product_id: Uuid) -> Result<(), GateError>;
}

/// Durable table of `(product, place) -> {status, active}` rows. The
/// authoritative source of truth for authorization decisions.
#[async_trait]
pub trait WhitelistStore: Send + Sync {
    /// Fetch the entry for a pair, if any.
    async fn get(&self, product_id: Uuid, place_id: &PlaceId)
        -> Result<Option<WhitelistEntry>, GateError>;

    /// Insert `candidate` unless a row already exists for its pair, in which
    /// case return the existing row untouched.
    ///
    /// Atomic with respect to the uniqueness constraint: two racing callers
    /// observe exactly one inserted row and neither receives an error.
    async fn insert_or_get(&self, candidate: WhitelistEntry) -> Result<InsertOutcome, GateError>;

    /// Replace the entry for a pair, inserting if absent (owner upsert).
    async fn upsert(&self, entry: WhitelistEntry) -> Result<(), GateError>;

    /// Backfill the display name of an existing entry. No other field
    /// changes; missing rows are ignored (the race already resolved).
    async fn update_name(
        &self,
        product_id: Uuid,
        place_id: &PlaceId,
        game_name: &str,
    ) -> Result<(), GateError>;

    /// Set status and active together for a pair.
    async fn set_status(
        &self,
        product_id: Uuid,
        place_id: &PlaceId,
        status: WhitelistStatus,
        active: bool,
    ) -> Result<(), GateError>;

    /// Flip the active flag; returns the new value. `NotFound` if absent.
    async fn toggle_active(
        &self,
        product_id: Uuid,
        place_id: &PlaceId,
    ) -> Result<bool, GateError>;

    /// Remove the entry for a pair.
    async fn delete(&self, product_id: Uuid, place_id: &PlaceId) -> Result<(), GateError>;

    /// All entries for a product, newest first.
    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<WhitelistEntry>, GateError>;

    /// Remove every entry for a product (product-deletion cascade).
    async fn delete_for_product(&self, product_id: Uuid) -> Result<(), GateError>;
}

/// Aggregated view over a product's usage records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    /// Total reports received.
    pub total_reports: u64,
    /// Distinct reporting client instances.
    pub distinct_places: u64,
    /// Reports carrying a claimed identity.
    pub verified_reports: u64,
    /// Latest sighting per place, newest first.
    pub latest_per_place: Vec<PlaceSighting>,
}

/// Most recent report from one client instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceSighting {
    pub place_id: PlaceId,
    pub game_name: String,
    pub last_seen: DateTime<Utc>,
    pub report_count: u64,
}

/// Append-only log of every report received.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Append one record. Never updates or deduplicates.
    async fn append(&self, record: UsageRecord) -> Result<(), GateError>;

    /// Most recent records for a product, newest first, bounded by `limit`.
    async fn recent(&self, product_id: Uuid, limit: usize) -> Result<Vec<UsageRecord>, GateError>;

    /// Aggregate a product's records.
    async fn summarize(&self, product_id: Uuid) -> Result<UsageSummary, GateError>;

    /// Remove every record for a product (product-deletion cascade).
    async fn delete_for_product(&self, product_id: Uuid) -> Result<(), GateError>;
}
