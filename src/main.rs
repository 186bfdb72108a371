use chrono::{Datelike, Utc};
use dotenvy::dotenv;
use innkeeper::{
    config::{self, database},
    core::{catalog, profit},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the catalog configuration
    let catalog_config = config::catalog::load_default_config()
        .inspect_err(|e| error!("Failed to load catalog configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed services, features and rooms that are missing
    let report = catalog::seed_catalog(&db, &catalog_config)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    let rooms = catalog::count_rooms(&db).await?;
    info!(
        "Seed complete: {} services, {} features, {} rooms added ({rooms} rooms in total)",
        report.services_created, report.features_created, report.rooms_created
    );

    // 6. Report revenue for the current year
    let year = Utc::now().year();
    let rows = profit::list_monthly_profits(&db, year).await?;
    info!("{}", profit::format_profit_summary(year, &rows).trim_end());

    Ok(())
}
