//! # Auto-Provisioning Rule
//!
//! Decides what (if anything) the reporting path may write to the whitelist
//! store after a ledger append. The rule itself is pure; the store's
//! uniqueness constraint turns the first-sight race into an
//! insert-or-fetch-existing sequence.

use crate::entities::{is_placeholder_name, WhitelistEntry};

/// Mutation the reporting path should apply to the whitelist store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningAction {
    /// No entry exists: insert a pending row with the observed name. The
    /// reporting path is the only writer allowed to create pending rows.
    CreatePending,
    /// Entry exists with a placeholder name while a real one was observed:
    /// backfill the name in place. No other field changes.
    BackfillName,
    /// Entry exists and needs nothing.
    NoChange,
}

/// Plan the provisioning mutation for one report.
///
/// `entry` is the current row for the `(product, place)` pair, if any;
/// `observed_name` is the enrichment result (or fallback) for this report.
pub fn plan_provisioning(
    entry: Option<&WhitelistEntry>,
    observed_name: &str,
) -> ProvisioningAction {
    match entry {
        None => ProvisioningAction::CreatePending,
        Some(existing) => {
            if is_placeholder_name(&existing.game_name) && !is_placeholder_name(observed_name) {
                ProvisioningAction::BackfillName
            } else {
                ProvisioningAction::NoChange
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PlaceId, WhitelistStatus};
    use uuid::Uuid;

    fn entry(name: &str) -> WhitelistEntry {
        WhitelistEntry::pending(Uuid::new_v4(), PlaceId::new("42"), name)
    }

    #[test]
    fn test_first_sight_creates_pending() {
        assert_eq!(
            plan_provisioning(None, "Castle Siege"),
            ProvisioningAction::CreatePending
        );
        // Even a placeholder-named first sight still creates the row.
        assert_eq!(
            plan_provisioning(None, "Unknown"),
            ProvisioningAction::CreatePending
        );
    }

    #[test]
    fn test_placeholder_backfilled_by_real_name() {
        let e = entry("Unknown");
        assert_eq!(
            plan_provisioning(Some(&e), "Castle Siege"),
            ProvisioningAction::BackfillName
        );
        let e = entry("Unknown Game");
        assert_eq!(
            plan_provisioning(Some(&e), "Castle Siege"),
            ProvisioningAction::BackfillName
        );
    }

    #[test]
    fn test_real_name_never_reverts() {
        let e = entry("Castle Siege");
        assert_eq!(
            plan_provisioning(Some(&e), "Unknown"),
            ProvisioningAction::NoChange
        );
        assert_eq!(
            plan_provisioning(Some(&e), "Unknown Game"),
            ProvisioningAction::NoChange
        );
    }

    #[test]
    fn test_placeholder_observed_for_placeholder_entry() {
        let e = entry("Unknown");
        assert_eq!(
            plan_provisioning(Some(&e), "unknown game"),
            ProvisioningAction::NoChange
        );
    }

    #[test]
    fn test_rule_ignores_status() {
        let mut e = entry("Unknown");
        e.status = WhitelistStatus::Unwhitelisted;
        // Backfill applies even to revoked entries; the name is display-only.
        assert_eq!(
            plan_provisioning(Some(&e), "Castle Siege"),
            ProvisioningAction::BackfillName
        );
    }
}
