//! The sync job as a one-shot command.

use atelier_core::AppConfig;
use atelier_db::StoreBackend;
use atelier_sheets::SheetsClient;
use atelier_sync::{SyncJob, SyncReport, SyncStage};

/// Runs one sync, printing a progress line per stage.
///
/// # Errors
///
/// Returns an error if the store cannot be reached, the Sheets client cannot
/// be built, or any pipeline stage fails.
pub(crate) async fn run_sync(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let store = StoreBackend::connect(config).await?;
    tracing::debug!(store = store.name(), dry_run, "starting sync from CLI");
    let reader = SheetsClient::new(config.http_timeout_secs)?;
    let job = SyncJob::from_app_config(config, reader, store).dry_run(dry_run);

    let report = job.run(|stage| println!("{}", progress_line(stage))).await?;
    println!("{}", summary_line(&report, dry_run));
    Ok(())
}

pub(crate) fn progress_line(stage: &SyncStage) -> String {
    format!("[sync] {stage}")
}

pub(crate) fn summary_line(report: &SyncReport, dry_run: bool) -> String {
    if dry_run {
        format!(
            "dry-run: {} products would be written ({} of {} rows dropped)",
            report.kept(),
            report.dropped,
            report.rows_read
        )
    } else {
        format!(
            "synced {} products (replaced {})",
            report.inserted, report.deleted
        )
    }
}
