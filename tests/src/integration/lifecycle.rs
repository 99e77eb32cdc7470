//! Agent and service wired together end to end.
//!
//! An in-process transport drives the real `ReportingService` with the real
//! `PollAgent`, so the whole revocation lifecycle runs without a socket:
//! first contact fail-open, owner approval, revocation with a single mass
//! eviction, and re-authorization.

#[cfg(test)]
mod tests {
    use crate::integration::support::{meta, seeded_product, stack, Stack};
    use async_trait::async_trait;
    use gate_agent::{
        AgentReport, PollAgent, PollConfig, ReportTransport, SessionGate, SessionHost,
        TransportError, EVICTION_NOTICE,
    };
    use gate_core::{PlaceId, ProductKey, Verdict, WhitelistStatus};
    use gate_server::ReportInput;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    /// Transport that calls the service directly instead of going over HTTP.
    struct LocalTransport {
        stack: Arc<Stack>,
    }

    #[async_trait]
    impl ReportTransport for LocalTransport {
        async fn send_report(&self, report: &AgentReport) -> Result<Verdict, TransportError> {
            let input = ReportInput {
                product_key: ProductKey::new(report.product_key.clone()),
                place_id: PlaceId::new(report.place_id.clone()),
                game_name: report.game_name.clone(),
                verified_user: None,
            };
            let outcome = self
                .stack
                .service
                .report(input, meta())
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            Ok(outcome.verdict)
        }
    }

    #[derive(Default)]
    struct CountingHost {
        evictions: AtomicUsize,
    }

    impl SessionHost for CountingHost {
        fn evict_all(&self, notice: &str) {
            assert_eq!(notice, EVICTION_NOTICE);
            self.evictions.fetch_add(1, Ordering::SeqCst);
        }

        fn halt(&self) {}
    }

    #[tokio::test]
    async fn test_full_revocation_lifecycle() {
        let stack = Arc::new(stack());
        let owner = Uuid::new_v4();
        let product = seeded_product(&stack, owner).await;
        let place = PlaceId::new("42");

        let host = Arc::new(CountingHost::default());
        let agent = PollAgent::new(
            LocalTransport {
                stack: Arc::clone(&stack),
            },
            Arc::clone(&host),
            AgentReport {
                product_key: product.product_key.as_str().to_string(),
                place_id: "42".to_string(),
                game_name: Some("Castle Siege".to_string()),
                user_id: None,
                username: None,
            },
            PollConfig::default(),
        );
        let gate = SessionGate::new(agent.verdict_handle());

        // First contact: auto-provisioned pending, fail-open.
        agent.poll_once().await;
        assert!(gate.admit());
        assert_eq!(host.evictions.load(Ordering::SeqCst), 0);

        // Owner approves; the next poll sees whitelisted/active.
        stack
            .service
            .set_status(owner, product.id, place.clone(), WhitelistStatus::Whitelisted)
            .await
            .unwrap();
        agent.poll_once().await;
        assert!(gate.admit());

        // Revocation flips the verdict and evicts exactly once.
        stack
            .service
            .set_status(owner, product.id, place.clone(), WhitelistStatus::Unwhitelisted)
            .await
            .unwrap();
        agent.poll_once().await;
        assert!(!gate.admit());
        agent.poll_once().await;
        assert_eq!(host.evictions.load(Ordering::SeqCst), 1);

        // Re-authorization resumes admission without another eviction.
        stack
            .service
            .set_status(owner, product.id, place.clone(), WhitelistStatus::Whitelisted)
            .await
            .unwrap();
        agent.poll_once().await;
        assert!(gate.admit());
        assert_eq!(host.evictions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_toggle_off_denies_next_poll() {
        let stack = Arc::new(stack());
        let owner = Uuid::new_v4();
        let product = seeded_product(&stack, owner).await;
        let place = PlaceId::new("7");

        stack
            .service
            .add_whitelist(owner, product.id, place.clone(), "Castle Siege".to_string())
            .await
            .unwrap();

        let host = Arc::new(CountingHost::default());
        let agent = PollAgent::new(
            LocalTransport {
                stack: Arc::clone(&stack),
            },
            Arc::clone(&host),
            AgentReport {
                product_key: product.product_key.as_str().to_string(),
                place_id: "7".to_string(),
                game_name: None,
                user_id: None,
                username: None,
            },
            PollConfig::default(),
        );
        let gate = SessionGate::new(agent.verdict_handle());

        agent.poll_once().await;
        assert!(gate.admit());

        let active = stack
            .service
            .toggle_active(owner, product.id, place.clone())
            .await
            .unwrap();
        assert!(!active);

        agent.poll_once().await;
        assert!(!gate.admit());
        assert_eq!(host.evictions.load(Ordering::SeqCst), 1);
    }
}
