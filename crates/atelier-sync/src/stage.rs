use std::fmt;

/// Progress of a single sync run. Stages only move forward; any failure jumps
/// straight to [`SyncStage::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStage {
    Init,
    CredentialsLoaded,
    ReadComplete { rows: usize },
    Normalized { kept: usize, dropped: usize },
    Deleted { removed: usize },
    Inserted { count: usize },
    Done,
    Failed(String),
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("starting sync"),
            Self::CredentialsLoaded => f.write_str("credentials loaded"),
            Self::ReadComplete { rows } => write!(f, "read {rows} rows from sheet"),
            Self::Normalized { kept, dropped } => {
                write!(f, "normalized {kept} products ({dropped} rows dropped)")
            }
            Self::Deleted { removed } => write!(f, "deleted {removed} existing products"),
            Self::Inserted { count } => write!(f, "inserted {count} products"),
            Self::Done => f.write_str("sync complete"),
            Self::Failed(reason) => write!(f, "sync failed: {reason}"),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub rows_read: usize,
    pub dropped: usize,
    pub deleted: usize,
    pub inserted: usize,
}

impl SyncReport {
    /// Rows that survived normalization.
    #[must_use]
    pub fn kept(&self) -> usize {
        self.rows_read - self.dropped
    }
}
