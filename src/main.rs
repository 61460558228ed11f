//! VoloConnect core
//!
//! Prepares the database and reports the current state of the platform

use anyhow::Context;
use tracing::{error, info};

use voloconnect::{
    config::Settings,
    database::{create_pool, health_check, run_migrations, DatabaseService},
    models::StatsScope,
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on drop
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", voloconnect::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = create_pool(&settings.database)
        .await
        .context("failed to connect to the database")?;

    run_migrations(&pool).await?;
    health_check(&pool).await?;

    let policy = settings.ledger.capacity_policy;
    info!(capacity_policy = ?policy, "Initializing services...");
    let database_service = DatabaseService::postgres(pool.clone(), policy);
    let services = ServiceFactory::new(database_service, &settings)?;

    match services.stats.compute_stats(StatsScope::Global).await {
        Ok(stats) => info!(
            total_events = stats.total_events,
            active_events = stats.active_events,
            full_events = stats.full_events,
            completed_events = stats.completed_events,
            cancelled_events = stats.cancelled_events,
            total_volunteers = stats.total_volunteers,
            total_hours = stats.total_hours,
            "Platform statistics"
        ),
        Err(e) => error!(error = %e, "Failed to compute platform statistics"),
    }

    pool.close().await;
    info!("{} startup checks completed", voloconnect::NAME);

    Ok(())
}
