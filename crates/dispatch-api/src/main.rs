//! dispatch-api - fixture server for dispatch-board

use chrono::Local;
use tracing::info;

use dispatch_api::{logging, router, AppState, ServerConfig};
use dispatch_store::{Seed, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init_tracing();

    let config = ServerConfig::from_env();
    let addr = config.socket_addr()?;

    let mut seed = Seed::load(config.seed_path.as_deref()).await?;
    seed.rebase_dates(Local::now().date_naive());
    info!(
        jobs = seed.jobs.len(),
        trucks = seed.trucks.len(),
        items = seed.items.len(),
        categories = seed.categories.len(),
        webhook_delivery = config.webhook_delivery,
        "Fixture store seeded"
    );

    let state = AppState::new(Store::from_seed(seed), config)?;
    let app = router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
