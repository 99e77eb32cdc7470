//! Racing first-sight provisioning through the full service path.
//!
//! Many instances of the same place report for the first time at once. The
//! uniqueness constraint in the whitelist store must collapse the race to a
//! single pending row while every report still lands in the ledger and every
//! racer gets an authorized verdict.

#[cfg(test)]
mod tests {
    use crate::integration::support::{meta, seeded_product, stack};
    use gate_core::{PlaceId, WhitelistStatus};
    use gate_server::ReportInput;
    use gate_store::{UsageLedger, WhitelistStore};
    use std::sync::Arc;
    use uuid::Uuid;

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_first_sight_collapses_to_one_row() {
        let stack = Arc::new(stack());
        let product = seeded_product(&stack, Uuid::new_v4()).await;

        let mut handles = Vec::new();
        for i in 0..32 {
            let stack = Arc::clone(&stack);
            let product = product.clone();
            handles.push(tokio::spawn(async move {
                let input = ReportInput {
                    product_key: product.product_key.clone(),
                    place_id: PlaceId::new("42"),
                    game_name: Some(format!("Castle Siege v{i}")),
                    verified_user: None,
                };
                stack.service.report(input, meta()).await
            }));
        }

        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert!(outcome.verdict.authorized);
            assert_eq!(outcome.verdict.status, WhitelistStatus::Pending);
        }

        let entries = stack.whitelist.list_for_product(product.id).await.unwrap();
        assert_eq!(entries.len(), 1, "race must produce exactly one row");
        assert_eq!(entries[0].status, WhitelistStatus::Pending);

        let records = stack.ledger.recent(product.id, 100).await.unwrap();
        assert_eq!(records.len(), 32, "every report appends a ledger row");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_reports_across_places_stay_isolated() {
        let stack = Arc::new(stack());
        let product = seeded_product(&stack, Uuid::new_v4()).await;

        let mut handles = Vec::new();
        for place in 0..8 {
            for _ in 0..4 {
                let stack = Arc::clone(&stack);
                let product = product.clone();
                handles.push(tokio::spawn(async move {
                    let input = ReportInput {
                        product_key: product.product_key.clone(),
                        place_id: PlaceId::new(place.to_string()),
                        game_name: None,
                        verified_user: None,
                    };
                    stack.service.report(input, meta()).await
                }));
            }
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let entries = stack.whitelist.list_for_product(product.id).await.unwrap();
        assert_eq!(entries.len(), 8, "one row per distinct place");
    }
}
