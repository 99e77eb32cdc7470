//! Reporting and management orchestration.
//!
//! One `ReportingService` instance is shared by every request handler. Each
//! call is an independent unit of work; persistence operations are
//! short-lived and no transaction spans the enrichment collaborator.

use gate_core::{
    decide_entry, plan_provisioning, GateError, OwnerId, PlaceId, Product, ProductKey,
    ProvisioningAction, UsageRecord, Verdict, VerifiedUser, WhitelistEntry, WhitelistStatus,
};
use gate_store::{ProductDirectory, UsageLedger, UsageSummary, WhitelistStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ports::{NameResolver, UsageEvent, UsageNotifier};

/// Transport metadata accompanying a report.
#[derive(Debug, Clone)]
pub struct ClientMeta {
    pub ip_address: String,
    pub user_agent: String,
}

/// One parsed report from a client instance.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub product_key: ProductKey,
    pub place_id: PlaceId,
    pub game_name: Option<String>,
    pub verified_user: Option<VerifiedUser>,
}

/// Verdict plus the name the server settled on for this report.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub verdict: Verdict,
    pub game_name: String,
}

/// The reporting endpoint's orchestration core, plus the owner-facing
/// management operations. Everything network-shaped stays in `http`.
pub struct ReportingService {
    directory: Arc<dyn ProductDirectory>,
    whitelist: Arc<dyn WhitelistStore>,
    ledger: Arc<dyn UsageLedger>,
    resolver: Arc<dyn NameResolver>,
    notifier: Arc<dyn UsageNotifier>,
    resolver_timeout: Duration,
}

impl ReportingService {
    pub fn new(
        directory: Arc<dyn ProductDirectory>,
        whitelist: Arc<dyn WhitelistStore>,
        ledger: Arc<dyn UsageLedger>,
        resolver: Arc<dyn NameResolver>,
        notifier: Arc<dyn UsageNotifier>,
        resolver_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            whitelist,
            ledger,
            resolver,
            notifier,
            resolver_timeout,
        }
    }

    /// Handle one report: resolve the key, enrich the name, append the
    /// ledger row, auto-provision, and compute the verdict.
    ///
    /// Side effects: exactly one ledger row per call; zero or one whitelist
    /// mutation.
    pub async fn report(
        &self,
        input: ReportInput,
        meta: ClientMeta,
    ) -> Result<ReportOutcome, GateError> {
        // Key resolution precedes any persistence.
        let product = self.directory.find_by_key(&input.product_key).await?;

        let game_name = self.enriched_name(&input.place_id, input.game_name.clone()).await;

        let record = UsageRecord {
            product_id: product.id,
            place_id: input.place_id.clone(),
            game_name: game_name.clone(),
            verified_user: input.verified_user.clone(),
            ip_address: meta.ip_address,
            user_agent: meta.user_agent,
            timestamp: chrono::Utc::now(),
        };
        self.ledger.append(record).await?;

        self.notify_usage(&input, &game_name);

        let entry = self.provision(product.id, &input.place_id, &game_name).await?;
        let verdict = decide_entry(Some(&entry));

        debug!(
            product = %product.id,
            place = %input.place_id,
            authorized = verdict.authorized,
            status = %verdict.status,
            "report processed"
        );

        Ok(ReportOutcome {
            verdict,
            game_name: entry_display_name(&entry, game_name),
        })
    }

    /// Side-effect-free verdict probe: no ledger append, no provisioning.
    /// An unknown pair is answered as pending/authorized without creating a
    /// row.
    pub async fn check(
        &self,
        product_key: &ProductKey,
        place_id: &PlaceId,
    ) -> Result<Verdict, GateError> {
        let product = self.directory.find_by_key(product_key).await?;
        let entry = self.whitelist.get(product.id, place_id).await?;
        Ok(decide_entry(entry.as_ref()))
    }

    /// Apply the auto-provisioning rule and return the authoritative entry.
    async fn provision(
        &self,
        product_id: Uuid,
        place_id: &PlaceId,
        observed_name: &str,
    ) -> Result<WhitelistEntry, GateError> {
        let existing = self.whitelist.get(product_id, place_id).await?;
        match plan_provisioning(existing.as_ref(), observed_name) {
            ProvisioningAction::CreatePending => {
                let candidate =
                    WhitelistEntry::pending(product_id, place_id.clone(), observed_name);
                // A racing first-sight insert is recovered here: the loser
                // gets the winner's row back instead of an error.
                let outcome = self.whitelist.insert_or_get(candidate).await?;
                Ok(outcome.entry().clone())
            }
            ProvisioningAction::BackfillName => {
                self.whitelist
                    .update_name(product_id, place_id, observed_name)
                    .await?;
                let mut entry = existing.ok_or_else(|| {
                    GateError::Storage("entry vanished during backfill".to_string())
                })?;
                entry.game_name = observed_name.to_string();
                Ok(entry)
            }
            ProvisioningAction::NoChange => existing.ok_or_else(|| {
                GateError::Storage("entry vanished during provisioning".to_string())
            }),
        }
    }

    /// Best-effort name enrichment with a bounded wait.
    async fn enriched_name(&self, place_id: &PlaceId, provided: Option<String>) -> String {
        let resolved = match tokio::time::timeout(
            self.resolver_timeout,
            self.resolver.resolve_name(place_id),
        )
        .await
        {
            Ok(Ok(name)) => Some(name),
            Ok(Err(err)) => {
                warn!(place = %place_id, error = %err, "name resolution failed, falling back");
                None
            }
            Err(_) => {
                warn!(place = %place_id, "name resolution timed out, falling back");
                None
            }
        };
        crate::enrichment::final_name(resolved, provided)
    }

    /// Fire-and-forget analytics notification off the critical path.
    fn notify_usage(&self, input: &ReportInput, game_name: &str) {
        let notifier = Arc::clone(&self.notifier);
        let event = UsageEvent {
            place_id: input.place_id.as_str().to_string(),
            game_name: game_name.to_string(),
            verified_user: input.verified_user.is_some(),
        };
        tokio::spawn(async move {
            if let Err(err) = notifier.notify(event).await {
                warn!(error = %err, "analytics notification failed");
            }
        });
    }

    // ------------------------------------------------------------------
    // Owner-facing management operations. Every call verifies ownership of
    // the referenced product before reading or mutating.
    // ------------------------------------------------------------------

    /// Fetch a product and verify the caller owns it.
    async fn owned_product(&self, owner: OwnerId, product_id: Uuid) -> Result<Product, GateError> {
        let product = self.directory.find_by_id(product_id).await?;
        if product.owner != owner {
            return Err(GateError::NotAuthorized);
        }
        Ok(product)
    }

    /// List the caller's products.
    pub async fn list_products(&self, owner: OwnerId) -> Result<Vec<Product>, GateError> {
        self.directory.list_for_owner(owner).await
    }

    /// Register a product with a generated key.
    pub async fn register_product(
        &self,
        owner: OwnerId,
        name: String,
    ) -> Result<Product, GateError> {
        let product = Product::register(owner, name);
        self.directory.insert(product.clone()).await?;
        info!(product = %product.id, "product registered");
        Ok(product)
    }

    /// Delete a product and cascade to its whitelist rows and usage records.
    pub async fn delete_product(&self, owner: OwnerId, product_id: Uuid) -> Result<(), GateError> {
        self.owned_product(owner, product_id).await?;
        self.directory.delete(product_id).await?;
        self.whitelist.delete_for_product(product_id).await?;
        self.ledger.delete_for_product(product_id).await?;
        info!(product = %product_id, "product deleted");
        Ok(())
    }

    /// List whitelist entries for a product, newest first.
    pub async fn list_whitelist(
        &self,
        owner: OwnerId,
        product_id: Uuid,
    ) -> Result<Vec<WhitelistEntry>, GateError> {
        self.owned_product(owner, product_id).await?;
        self.whitelist.list_for_product(product_id).await
    }

    /// Explicitly whitelist a place (upsert to whitelisted/active).
    pub async fn add_whitelist(
        &self,
        owner: OwnerId,
        product_id: Uuid,
        place_id: PlaceId,
        game_name: String,
    ) -> Result<WhitelistEntry, GateError> {
        self.owned_product(owner, product_id).await?;
        let entry = WhitelistEntry::whitelisted(product_id, place_id, game_name);
        self.whitelist.upsert(entry.clone()).await?;
        info!(product = %product_id, place = %entry.place_id, "place whitelisted");
        Ok(entry)
    }

    /// Set the status of a pair. Unwhitelisting forces the entry inactive;
    /// any other status forces it active. Absent rows are created with the
    /// placeholder name so a revocation can precede first contact.
    pub async fn set_status(
        &self,
        owner: OwnerId,
        product_id: Uuid,
        place_id: PlaceId,
        status: WhitelistStatus,
    ) -> Result<(WhitelistStatus, bool), GateError> {
        self.owned_product(owner, product_id).await?;
        let active = status != WhitelistStatus::Unwhitelisted;
        match self
            .whitelist
            .set_status(product_id, &place_id, status, active)
            .await
        {
            Ok(()) => {}
            Err(GateError::NotFound(_)) => {
                let mut entry =
                    WhitelistEntry::pending(product_id, place_id.clone(), gate_core::PLACEHOLDER_NAME);
                entry.status = status;
                entry.active = active;
                self.whitelist.upsert(entry).await?;
            }
            Err(other) => return Err(other),
        }
        info!(product = %product_id, place = %place_id, status = %status, "status updated");
        Ok((status, active))
    }

    /// Flip the active flag for a pair. An absent row is created as
    /// unwhitelisted and inactive, matching the switch-off intent.
    pub async fn toggle_active(
        &self,
        owner: OwnerId,
        product_id: Uuid,
        place_id: PlaceId,
    ) -> Result<bool, GateError> {
        self.owned_product(owner, product_id).await?;
        match self.whitelist.toggle_active(product_id, &place_id).await {
            Ok(active) => Ok(active),
            Err(GateError::NotFound(_)) => {
                let mut entry =
                    WhitelistEntry::pending(product_id, place_id, gate_core::PLACEHOLDER_NAME);
                entry.status = WhitelistStatus::Unwhitelisted;
                entry.active = false;
                self.whitelist.upsert(entry).await?;
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    /// Remove a whitelist entry.
    pub async fn remove_whitelist(
        &self,
        owner: OwnerId,
        product_id: Uuid,
        place_id: PlaceId,
    ) -> Result<(), GateError> {
        self.owned_product(owner, product_id).await?;
        self.whitelist.delete(product_id, &place_id).await
    }

    /// Recent usage records for a product.
    pub async fn list_usage(
        &self,
        owner: OwnerId,
        product_id: Uuid,
        limit: usize,
    ) -> Result<Vec<UsageRecord>, GateError> {
        self.owned_product(owner, product_id).await?;
        self.ledger.recent(product_id, limit).await
    }

    /// Aggregated usage view for a product.
    pub async fn usage_summary(
        &self,
        owner: OwnerId,
        product_id: Uuid,
    ) -> Result<UsageSummary, GateError> {
        self.owned_product(owner, product_id).await?;
        self.ledger.summarize(product_id).await
    }
}

/// The name to echo back to the client: the stored entry name unless the
/// report observed a fresher non-placeholder one.
fn entry_display_name(entry: &WhitelistEntry, observed: String) -> String {
    if gate_core::is_placeholder_name(&observed) {
        entry.game_name.clone()
    } else {
        observed
    }
}
