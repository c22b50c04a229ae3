//! Background job scheduler.
//!
//! Registers the recurring catalog sync when `ATELIER_SYNC_CRON` is set.

use std::sync::Arc;

use atelier_db::ProductStore;
use atelier_sheets::SheetReader;
use atelier_sync::SyncJob;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the scheduler with one sync job on `schedule`.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if `schedule` is not a valid cron expression
/// or the scheduler cannot be started.
pub async fn build_scheduler<R, S>(
    job: Arc<SyncJob<R, S>>,
    schedule: &str,
) -> Result<JobScheduler, JobSchedulerError>
where
    R: SheetReader + Send + Sync + 'static,
    S: ProductStore + Send + Sync + 'static,
{
    let sync_job = sync_job(job, schedule)?;

    let scheduler = JobScheduler::new().await?;
    scheduler.add(sync_job).await?;
    scheduler.start().await?;
    tracing::info!(schedule, "scheduled catalog sync registered");
    Ok(scheduler)
}

fn sync_job<R, S>(job: Arc<SyncJob<R, S>>, schedule: &str) -> Result<Job, JobSchedulerError>
where
    R: SheetReader + Send + Sync + 'static,
    S: ProductStore + Send + Sync + 'static,
{
    Job::new_async(schedule, move |_uuid, _lock| {
        let job = Arc::clone(&job);

        Box::pin(async move {
            tracing::info!("scheduler: starting catalog sync");
            match job.run(|_| {}).await {
                Ok(report) => tracing::info!(
                    inserted = report.inserted,
                    deleted = report.deleted,
                    dropped = report.dropped,
                    "scheduler: catalog sync complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: catalog sync failed"),
            }
        })
    })
}
