//! Replace-all write of the catalog.
//!
//! The existing rows are deleted and the new batch is inserted in fixed-size
//! chunks. There is no transaction around the two steps: readers may see an
//! empty table while a sync is in flight, and an insert failure after the
//! delete leaves the table short (possibly empty) until the next run.

use atelier_core::NewProduct;
use thiserror::Error;

use crate::store::ProductStore;
use crate::DbError;

/// Rows per insert call.
pub const INSERT_CHUNK_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("failed to list existing products: {0}")]
    ListExisting(#[source] DbError),

    #[error("failed to delete {count} existing products: {source}")]
    DeleteExisting {
        count: usize,
        #[source]
        source: DbError,
    },

    #[error("failed to insert batch {batch} of {total_batches}: {source}")]
    InsertBatch {
        /// 1-indexed.
        batch: usize,
        total_batches: usize,
        #[source]
        source: DbError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub deleted: usize,
    pub inserted: usize,
}

/// Deletes every product in `store`, then inserts `products` in chunks of
/// [`INSERT_CHUNK_SIZE`].
///
/// # Errors
///
/// - [`ReplaceError::ListExisting`] / [`ReplaceError::DeleteExisting`]: nothing
///   has been inserted.
/// - [`ReplaceError::InsertBatch`]: earlier batches remain inserted; later
///   ones are not attempted.
pub async fn replace_all_products<S: ProductStore>(
    store: &S,
    products: &[NewProduct],
) -> Result<ReplaceSummary, ReplaceError> {
    let deleted = delete_all_products(store).await?;
    let inserted = insert_in_batches(store, products).await?;
    Ok(ReplaceSummary { deleted, inserted })
}

/// Removes every existing product with a single bulk delete. An empty table
/// skips the delete call entirely.
///
/// # Errors
///
/// Returns [`ReplaceError::ListExisting`] or [`ReplaceError::DeleteExisting`].
pub async fn delete_all_products<S: ProductStore>(store: &S) -> Result<usize, ReplaceError> {
    let ids = store
        .list_product_ids()
        .await
        .map_err(ReplaceError::ListExisting)?;

    if ids.is_empty() {
        tracing::debug!("products table already empty; skipping delete");
        return Ok(0);
    }

    store
        .delete_products(&ids)
        .await
        .map_err(|source| ReplaceError::DeleteExisting {
            count: ids.len(),
            source,
        })?;
    tracing::info!(count = ids.len(), "deleted existing products");
    Ok(ids.len())
}

/// Inserts `products` sequentially in chunks of [`INSERT_CHUNK_SIZE`],
/// stopping at the first failed chunk.
///
/// # Errors
///
/// Returns [`ReplaceError::InsertBatch`] naming the 1-indexed failed chunk.
pub async fn insert_in_batches<S: ProductStore>(
    store: &S,
    products: &[NewProduct],
) -> Result<usize, ReplaceError> {
    let total_batches = products.len().div_ceil(INSERT_CHUNK_SIZE);
    let mut inserted = 0;
    for (i, chunk) in products.chunks(INSERT_CHUNK_SIZE).enumerate() {
        let batch = i + 1;
        store
            .insert_products(chunk)
            .await
            .map_err(|source| ReplaceError::InsertBatch {
                batch,
                total_batches,
                source,
            })?;
        inserted += chunk.len();
        tracing::debug!(batch, total_batches, rows = chunk.len(), "inserted product batch");
    }
    Ok(inserted)
}
