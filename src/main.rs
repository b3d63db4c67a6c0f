//! Consistency audit runner.
//!
//! Boots the engine against the configured store and sweeps a consistency
//! audit over every summary, logging each report. Exits non-zero when any
//! summary's stored totals drifted from its attached details, so the sweep
//! can run from a scheduler and page an operator on drift.

use dotenvy::dotenv;
use rcc_ledger::{
    config,
    core::{consolidation::ConsolidationEngine, rcc},
    errors::{Error, Result},
    notify::SummaryHub,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;
    info!("Successfully processed application configuration.");

    // 4. Initialize database
    let db = config::database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;
    config::database::create_tables(&db).await?;

    // 5. Audit every summary
    let hub = SummaryHub::new(app_config.notify_capacity);
    let engine = ConsolidationEngine::new(db.clone(), hub);

    let summaries = rcc::get_all_summaries(&db).await?;
    info!("Auditing {} summaries.", summaries.len());

    let mut first_drifted = None;
    for summary in summaries {
        let report = engine.audit(summary.id).await?;
        if report.is_consistent() {
            if report.detail_count == 0 {
                info!(
                    summary = report.rcc_id,
                    account = summary.account,
                    period = %summary.rcc_date,
                    "summary is empty"
                );
            }
        } else {
            warn!(
                summary = report.rcc_id,
                account = summary.account,
                period = %summary.rcc_date,
                stored = ?report.stored,
                derived = ?report.derived,
                "summary totals drifted from attached details"
            );
            first_drifted.get_or_insert(report.rcc_id);
        }
    }

    match first_drifted {
        Some(id) => Err(Error::Consistency { id }),
        None => {
            info!("Audit sweep complete, no drift found.");
            Ok(())
        }
    }
}
