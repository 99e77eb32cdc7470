//! Cross-crate integration flows.

pub mod concurrency;
pub mod lifecycle;
pub mod wire;

#[cfg(test)]
pub(crate) mod support {
    use gate_core::{OwnerId, Product};
    use gate_server::{ClientMeta, NullNotifier, NullResolver, ReportingService};
    use gate_store::{MemoryDirectory, MemoryLedger, MemoryWhitelist, ProductDirectory};
    use std::sync::Arc;
    use std::time::Duration;

    pub struct Stack {
        pub service: Arc<ReportingService>,
        pub directory: Arc<MemoryDirectory>,
        pub whitelist: Arc<MemoryWhitelist>,
        pub ledger: Arc<MemoryLedger>,
    }

    pub fn stack() -> Stack {
        let directory = Arc::new(MemoryDirectory::new());
        let whitelist = Arc::new(MemoryWhitelist::new());
        let ledger = Arc::new(MemoryLedger::new());
        let service = Arc::new(ReportingService::new(
            directory.clone(),
            whitelist.clone(),
            ledger.clone(),
            Arc::new(NullResolver),
            Arc::new(NullNotifier),
            Duration::from_millis(50),
        ));
        Stack {
            service,
            directory,
            whitelist,
            ledger,
        }
    }

    pub async fn seeded_product(stack: &Stack, owner: OwnerId) -> Product {
        let product = Product::register(owner, "Anti-Cheat Suite");
        stack.directory.insert(product.clone()).await.unwrap();
        product
    }

    pub fn meta() -> ClientMeta {
        ClientMeta {
            ip_address: "203.0.113.9".to_string(),
            user_agent: "integration/1.0".to_string(),
        }
    }
}
