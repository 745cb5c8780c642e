use std::sync::Arc;

use anyhow::Context;
use relay_engine::UrlRegistry;
use relay_logging::relay_info;
use relay_server::logging::{self, LogDestination};
use relay_server::{blob_store, start, AppState, Bootstrap, RelayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::load().context("invalid configuration")?;
    logging::initialize(config.log.level, LogDestination::from_settings(&config.log));

    let registry = Arc::new(UrlRegistry::default());
    let store = blob_store(&config).context("invalid BLOB_ENDPOINT")?;
    let _bootstrap = Bootstrap::spawn(Arc::new(store), config.url_source.clone(), Arc::clone(&registry))
        .supervise();

    let state = AppState::from_config(&config, registry).context("failed to build http client")?;
    let server = start(state, config.http_port, config.ws_port)
        .await
        .context("failed to bind listeners")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    relay_info!("Shutting down");
    server.shutdown().await;
    Ok(())
}
