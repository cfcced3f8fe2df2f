//! Inventory service entry point.

use api::config::InventoryServiceConfig;
use api::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = InventoryServiceConfig::from_env()?;
    server::init_tracing(&config.server);

    let metrics_handle = server::install_metrics_recorder()?;

    let state = api::create_inventory_state(&config);
    tracing::info!(records = config.seed.len(), "inventory seeded");

    let app = api::create_inventory_app(state, metrics_handle);
    server::serve(&config.server, app, "inventory-service").await?;
    Ok(())
}
