//! Sheet-to-store catalog sync shared by the CLI job and the HTTP trigger.

pub mod job;
pub mod stage;

pub use job::SyncJob;
pub use stage::{SyncReport, SyncStage};

use atelier_db::ReplaceError;
use atelier_sheets::{CredentialsError, SheetsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error("failed to read spreadsheet: {0}")]
    Sheets(#[from] SheetsError),

    #[error(transparent)]
    Store(#[from] ReplaceError),
}
