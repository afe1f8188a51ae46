use dotenvy::dotenv;
use ledger_pulse::{
    config::{database, settings},
    errors::Result,
    scheduler,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file first so RUST_LOG and DATABASE_URL from it take effect
    dotenv().ok(); // Make it non-fatal, env vars can be set externally

    // 2. Load settings; the log filter fallback lives there
    let settings = settings::load_default_config()?;

    // 3. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();
    info!("Settings loaded: {:?}", settings.scheduler);

    // 4. Connect and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Connected to {}", database::get_database_url()))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;

    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready"))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Start the background triggers
    let db = Arc::new(db);
    let jobs = scheduler::start_background_jobs(Arc::clone(&db), &settings.scheduler)?;

    // 6. Run until Ctrl-C
    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    jobs.shutdown();
    match Arc::try_unwrap(db) {
        Ok(db) => db.close().await?,
        Err(_) => info!("A tick still holds the database; leaving the pool to drop"),
    }

    Ok(())
}
