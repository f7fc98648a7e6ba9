use anyhow::Context;
use std::sync::Arc;

use gigpay::config::AppConfig;
use gigpay::db::{self, Database};
use gigpay::gateway::{self, AppState};
use gigpay::logging;
use gigpay::store::{PgStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::args().nth(1).unwrap_or_else(|| "dev".to_string());
    let config = AppConfig::load(&env);
    let _guard = logging::init_logging(&config);

    tracing::info!("gigpay starting (env: {})", env);

    let postgres_url = config
        .postgres_url
        .clone()
        .context("postgres_url missing from config; the gateway needs a store")?;

    let database = Database::connect(&postgres_url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db::init_schema(database.pool())
        .await
        .context("Failed to initialize schema")?;

    let store: Arc<dyn Store> = Arc::new(PgStore::new(Arc::new(database)));
    let state = Arc::new(AppState::new(store));

    gateway::run_server(&config.gateway.host, config.gateway.port, state).await;
    Ok(())
}
