//! Order service entry point.

use api::config::OrderServiceConfig;
use api::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = OrderServiceConfig::from_env()?;
    server::init_tracing(&config.server);

    let metrics_handle = server::install_metrics_recorder()?;

    let state = api::create_order_state(&config)?;
    tracing::info!(
        inventory_url = %config.inventory_url,
        max_call_duration_ms = config.resilience.max_call_duration().as_millis() as u64,
        "inventory client configured"
    );

    let app = api::create_order_app(state, metrics_handle);
    server::serve(&config.server, app, "order-service").await?;
    Ok(())
}
