use atelier_core::AppConfig;
use atelier_db::{delete_all_products, insert_in_batches, ProductStore};
use atelier_sheets::{load_service_account, normalize_rows, CredentialSource, SheetReader};

use crate::stage::{SyncReport, SyncStage};
use crate::SyncError;

/// One-way sync from the catalog spreadsheet into the product store.
///
/// Runs are sequential and unguarded: two overlapping runs against the same
/// store can interleave their delete and insert steps.
pub struct SyncJob<R, S> {
    reader: R,
    store: S,
    credentials: CredentialSource,
    spreadsheet_id: Option<String>,
    dry_run: bool,
}

impl<R: SheetReader, S: ProductStore> SyncJob<R, S> {
    pub fn new(
        reader: R,
        store: S,
        credentials: CredentialSource,
        spreadsheet_id: Option<String>,
    ) -> Self {
        Self {
            reader,
            store,
            credentials,
            spreadsheet_id,
            dry_run: false,
        }
    }

    pub fn from_app_config(config: &AppConfig, reader: R, store: S) -> Self {
        Self::new(
            reader,
            store,
            CredentialSource::from_app_config(config),
            config.sheet_id.clone(),
        )
    }

    /// Stop after normalization without touching the store.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the pipeline once, reporting every stage transition to `on_stage`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Config`] when no spreadsheet id is configured.
    /// - [`SyncError::Credentials`] when the service-account key cannot be loaded.
    /// - [`SyncError::Sheets`] when either sheet read fails.
    /// - [`SyncError::Store`] when the delete or an insert batch fails. The
    ///   store is not rolled back.
    pub async fn run(
        &self,
        mut on_stage: impl FnMut(&SyncStage),
    ) -> Result<SyncReport, SyncError> {
        let mut emit = |stage: SyncStage| {
            match &stage {
                SyncStage::Failed(reason) => tracing::error!(reason = %reason, "sync failed"),
                other => tracing::info!(stage = %other, "sync stage"),
            }
            on_stage(&stage);
        };

        emit(SyncStage::Init);
        match self.execute(&mut emit).await {
            Ok(report) => {
                emit(SyncStage::Done);
                Ok(report)
            }
            Err(err) => {
                emit(SyncStage::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    async fn execute(&self, emit: &mut impl FnMut(SyncStage)) -> Result<SyncReport, SyncError> {
        let spreadsheet_id = self
            .spreadsheet_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SyncError::Config("GOOGLE_SHEET_ID is not set".to_string()))?;

        let key = load_service_account(&self.credentials)?;
        emit(SyncStage::CredentialsLoaded);

        let sheet = self.reader.read_sheet(&key, spreadsheet_id).await?;
        let rows_read = sheet.rows.len();
        emit(SyncStage::ReadComplete { rows: rows_read });

        let products = normalize_rows(&sheet);
        let dropped = rows_read - products.len();
        emit(SyncStage::Normalized {
            kept: products.len(),
            dropped,
        });

        let mut report = SyncReport {
            rows_read,
            dropped,
            ..SyncReport::default()
        };
        if self.dry_run {
            tracing::info!(kept = products.len(), "dry run: store left untouched");
            return Ok(report);
        }

        report.deleted = delete_all_products(&self.store).await?;
        emit(SyncStage::Deleted {
            removed: report.deleted,
        });

        report.inserted = insert_in_batches(&self.store, &products).await?;
        emit(SyncStage::Inserted {
            count: report.inserted,
        });

        Ok(report)
    }
}

#[cfg(test)]
#[path = "job_test.rs"]
mod tests;
