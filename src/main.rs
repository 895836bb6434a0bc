use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use card_price_backend::{
    config::AppConfig,
    fetch_job_from_config, handlers,
    jobs::price_fetch::start_price_fetch_job,
    services::{db_store::DbStore, latest_prices::LatestPriceReader},
    AppState,
};

/// How long latest-price reads are served from memory
const PRICE_CACHE_TTL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,card_price_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None).await?;

    let store = Arc::new(DbStore::new(db));
    let reader = LatestPriceReader::new(store.clone(), PRICE_CACHE_TTL);
    let fetch_job = Arc::new(fetch_job_from_config(&config, store, Some(reader.clone()))?);

    tracing::info!(
        "Price fetch mode: {}, delay {:?}, cap {:?}",
        config.fetch.mode,
        config.fetch.delay,
        config.fetch.max_items
    );

    if let Some(every) = config.fetch_interval {
        tracing::info!("Scheduling price fetch every {:?}", every);
        start_price_fetch_job(fetch_job.clone(), every).await;
    }

    if config.cron_secret.is_none() {
        tracing::warn!("CRON_SECRET is not set; /api/cron/fetch-prices is open");
    }

    let state = AppState {
        prices: reader,
        fetch_job,
        cron_secret: config.cron_secret.clone(),
    };

    let app = handlers::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
