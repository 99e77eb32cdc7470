//! # In-Memory Adapters
//!
//! Thread-safe map-backed implementations of the persistence ports. The
//! whitelist uniqueness constraint is realized through `DashMap`'s entry
//! API, which makes `insert_or_get` a single atomic operation per shard.

use async_trait::async_trait;
use dashmap::DashMap;
use gate_core::{
    GateError, OwnerId, PlaceId, Product, ProductKey, UsageRecord, WhitelistEntry, WhitelistStatus,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::ports::{
    InsertOutcome, PlaceSighting, ProductDirectory, UsageLedger, UsageSummary, WhitelistStore,
};

/// In-memory product directory.
#[derive(Default)]
pub struct MemoryDirectory {
    products: RwLock<Vec<Product>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductDirectory for MemoryDirectory {
    async fn find_by_key(&self, key: &ProductKey) -> Result<Product, GateError> {
        self.products
            .read()
            .iter()
            .find(|p| &p.product_key == key)
            .cloned()
            .ok_or_else(GateError::invalid_product_key)
    }

    async fn find_by_id(&self, product_id: Uuid) -> Result<Product, GateError> {
        self.products
            .read()
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| GateError::NotFound("product not found".to_string()))
    }

    async fn list_for_owner(&self, owner: OwnerId) -> Result<Vec<Product>, GateError> {
        let mut owned: Vec<Product> = self
            .products
            .read()
            .iter()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn insert(&self, product: Product) -> Result<(), GateError> {
        self.products.write().push(product);
        Ok(())
    }

    async fn delete(&self, product_id: Uuid) -> Result<(), GateError> {
        let mut products = self.products.write();
        let before = products.len();
        products.retain(|p| p.id != product_id);
        if products.len() == before {
            return Err(GateError::NotFound("product not found".to_string()));
        }
        Ok(())
    }
}

/// Key for one whitelist row.
type PairKey = (Uuid, String);

fn pair_key(product_id: Uuid, place_id: &PlaceId) -> PairKey {
    (product_id, place_id.as_str().to_string())
}

/// In-memory whitelist store with uniqueness on `(product, place)`.
#[derive(Default)]
pub struct MemoryWhitelist {
    entries: DashMap<PairKey, WhitelistEntry>,
}

impl MemoryWhitelist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WhitelistStore for MemoryWhitelist {
    async fn get(
        &self,
        product_id: Uuid,
        place_id: &PlaceId,
    ) -> Result<Option<WhitelistEntry>, GateError> {
        Ok(self
            .entries
            .get(&pair_key(product_id, place_id))
            .map(|e| e.clone()))
    }

    async fn insert_or_get(&self, candidate: WhitelistEntry) -> Result<InsertOutcome, GateError> {
        let key = pair_key(candidate.product_id, &candidate.place_id);
        // The entry API holds the shard lock across the vacancy check, so
        // two racing first-sight inserts cannot both observe a vacancy.
        let entry = self.entries.entry(key);
        match entry {
            dashmap::mapref::entry::Entry::Occupied(occupied) => {
                Ok(InsertOutcome::Existing(occupied.get().clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                let inserted = vacant.insert(candidate).clone();
                Ok(InsertOutcome::Inserted(inserted))
            }
        }
    }

    async fn upsert(&self, entry: WhitelistEntry) -> Result<(), GateError> {
        let key = pair_key(entry.product_id, &entry.place_id);
        self.entries.insert(key, entry);
        Ok(())
    }

    async fn update_name(
        &self,
        product_id: Uuid,
        place_id: &PlaceId,
        game_name: &str,
    ) -> Result<(), GateError> {
        if let Some(mut entry) = self.entries.get_mut(&pair_key(product_id, place_id)) {
            entry.game_name = game_name.to_string();
        }
        Ok(())
    }

    async fn set_status(
        &self,
        product_id: Uuid,
        place_id: &PlaceId,
        status: WhitelistStatus,
        active: bool,
    ) -> Result<(), GateError> {
        match self.entries.get_mut(&pair_key(product_id, place_id)) {
            Some(mut entry) => {
                entry.status = status;
                entry.active = active;
                Ok(())
            }
            None => Err(GateError::NotFound(
                "whitelist entry not found".to_string(),
            )),
        }
    }

    async fn toggle_active(
        &self,
        product_id: Uuid,
        place_id: &PlaceId,
    ) -> Result<bool, GateError> {
        match self.entries.get_mut(&pair_key(product_id, place_id)) {
            Some(mut entry) => {
                entry.active = !entry.active;
                Ok(entry.active)
            }
            None => Err(GateError::NotFound(
                "whitelist entry not found".to_string(),
            )),
        }
    }

    async fn delete(&self, product_id: Uuid, place_id: &PlaceId) -> Result<(), GateError> {
        self.entries
            .remove(&pair_key(product_id, place_id))
            .map(|_| ())
            .ok_or_else(|| GateError::NotFound("whitelist entry not found".to_string()))
    }

    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<WhitelistEntry>, GateError> {
        let mut rows: Vec<WhitelistEntry> = self
            .entries
            .iter()
            .filter(|kv| kv.key().0 == product_id)
            .map(|kv| kv.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn delete_for_product(&self, product_id: Uuid) -> Result<(), GateError> {
        self.entries.retain(|key, _| key.0 != product_id);
        Ok(())
    }
}

/// In-memory append-only usage ledger.
#[derive(Default)]
pub struct MemoryLedger {
    records: RwLock<Vec<UsageRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageLedger for MemoryLedger {
    async fn append(&self, record: UsageRecord) -> Result<(), GateError> {
        self.records.write().push(record);
        Ok(())
    }

    async fn recent(&self, product_id: Uuid, limit: usize) -> Result<Vec<UsageRecord>, GateError> {
        let records = self.records.read();
        let mut matching: Vec<UsageRecord> = records
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn summarize(&self, product_id: Uuid) -> Result<UsageSummary, GateError> {
        let records = self.records.read();
        let mut total_reports = 0u64;
        let mut verified_reports = 0u64;
        let mut per_place: HashMap<String, PlaceSighting> = HashMap::new();

        for record in records.iter().filter(|r| r.product_id == product_id) {
            total_reports += 1;
            if record.verified_user.is_some() {
                verified_reports += 1;
            }
            per_place
                .entry(record.place_id.as_str().to_string())
                .and_modify(|s| {
                    s.report_count += 1;
                    if record.timestamp > s.last_seen {
                        s.last_seen = record.timestamp;
                        s.game_name = record.game_name.clone();
                    }
                })
                .or_insert_with(|| PlaceSighting {
                    place_id: record.place_id.clone(),
                    game_name: record.game_name.clone(),
                    last_seen: record.timestamp,
                    report_count: 1,
                });
        }

        let mut latest_per_place: Vec<PlaceSighting> = per_place.into_values().collect();
        latest_per_place.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));

        Ok(UsageSummary {
            total_reports,
            distinct_places: latest_per_place.len() as u64,
            verified_reports,
            latest_per_place,
        })
    }

    async fn delete_for_product(&self, product_id: Uuid) -> Result<(), GateError> {
        self.records.write().retain(|r| r.product_id != product_id);
        Ok(())
    }
}
