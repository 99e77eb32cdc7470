//! # Scriptgate Daemon
//!
//! Binary entry point wiring the in-memory stores, enrichment adapters, and
//! HTTP surface together.
//!
//! Environment overrides:
//!
//! - `SCRIPTGATE_BIND` - bind address, e.g. `0.0.0.0:3000`
//! - `SCRIPTGATE_RESOLVER_URL` - external name-resolution service base URL
//! - `SCRIPTGATE_ANALYTICS_URL` - analytics collection endpoint
//! - `SCRIPTGATE_OWNER_TOKENS` - comma-separated `token:owner-uuid` pairs

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use gate_server::enrichment::{HttpNameResolver, HttpNotifier};
use gate_server::http::{build_router, AppState};
use gate_server::ports::{NameResolver, NullNotifier, NullResolver, UsageNotifier};
use gate_server::{OwnerRegistry, ReportingService, ServerConfig};
use gate_store::{MemoryDirectory, MemoryLedger, MemoryWhitelist};

/// Load configuration from environment.
fn load_config() -> ServerConfig {
    let mut config = ServerConfig::default();

    if let Ok(bind) = std::env::var("SCRIPTGATE_BIND") {
        match bind.parse::<std::net::SocketAddr>() {
            Ok(addr) => {
                config.host = addr.ip();
                config.port = addr.port();
            }
            Err(_) => warn!("SCRIPTGATE_BIND is not a valid socket address, using default"),
        }
    }
    if let Ok(url) = std::env::var("SCRIPTGATE_RESOLVER_URL") {
        config.enrichment.resolver_url = Some(url);
    }
    if let Ok(url) = std::env::var("SCRIPTGATE_ANALYTICS_URL") {
        config.enrichment.analytics_url = Some(url);
    }

    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config();
    config.validate().context("invalid configuration")?;

    let resolver: Arc<dyn NameResolver> = match &config.enrichment.resolver_url {
        Some(url) => Arc::new(
            HttpNameResolver::new(url.clone(), config.enrichment.timeout)
                .context("failed to build name resolver")?,
        ),
        None => Arc::new(NullResolver),
    };
    let notifier: Arc<dyn UsageNotifier> = match &config.enrichment.analytics_url {
        Some(url) => Arc::new(
            HttpNotifier::new(url.clone(), config.enrichment.timeout)
                .context("failed to build analytics notifier")?,
        ),
        None => Arc::new(NullNotifier),
    };

    let service = Arc::new(ReportingService::new(
        Arc::new(MemoryDirectory::new()),
        Arc::new(MemoryWhitelist::new()),
        Arc::new(MemoryLedger::new()),
        resolver,
        notifier,
        config.enrichment.timeout,
    ));

    let owners = Arc::new(match std::env::var("SCRIPTGATE_OWNER_TOKENS") {
        Ok(value) => OwnerRegistry::from_env_value(&value),
        Err(_) => {
            warn!("SCRIPTGATE_OWNER_TOKENS not set; management API will reject all callers");
            OwnerRegistry::new()
        }
    });

    let addr = config.bind_addr();
    let state = AppState {
        service,
        owners,
        config: Arc::new(config),
    };
    let router = build_router(state);

    info!(%addr, "scriptgated listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind")?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("server exited")?;

    Ok(())
}
