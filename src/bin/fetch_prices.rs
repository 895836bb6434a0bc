// src/bin/fetch_prices.rs
//
// One-shot price fetch outside the server.
// Usage: cargo run --bin fetch_prices -- [RARITY]

use sea_orm::Database;
use std::env;
use std::sync::Arc;

use card_price_backend::{config::AppConfig, fetch_job_from_config, services::db_store::DbStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,card_price_backend=info".into()),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let mut config = AppConfig::from_env()?;

    // Rarity on the command line wins over PRICE_FETCH_RARITY
    if let Some(rarity) = env::args().nth(1) {
        config.fetch.rarity = Some(rarity);
    }

    let db = Database::connect(&config.database_url).await?;
    let store = Arc::new(DbStore::new(db));
    let job = fetch_job_from_config(&config, store, None)?;

    println!(
        " Fetching prices (mode: {}, rarity: {})...",
        config.fetch.mode,
        config.fetch.rarity.as_deref().unwrap_or("all")
    );

    let summary = job.run().await?;

    println!("\n Results:");
    println!("    Attempted: {}", summary.attempted);
    println!("    Succeeded: {}", summary.succeeded);
    println!("    Not listed: {}", summary.not_found);
    println!("    No priced listings: {}", summary.no_listings);
    println!("    Fetch errors: {}", summary.fetch_failed);
    println!("    Price records: {}", summary.records);
    println!("    Saved: {}", summary.inserted);

    Ok(())
}
