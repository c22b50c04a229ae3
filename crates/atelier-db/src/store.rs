//! The storage seam the replace-all writer runs against.

use std::future::Future;

use atelier_core::NewProduct;
use uuid::Uuid;

use crate::DbError;

/// Destination table operations needed by a sync run.
///
/// Implementations issue each call independently; nothing here is
/// transactional.
pub trait ProductStore {
    /// Identifiers of every row currently in the table.
    fn list_product_ids(&self) -> impl Future<Output = Result<Vec<Uuid>, DbError>> + Send;

    /// Deletes the given rows in a single call. Returns the number removed.
    fn delete_products(&self, ids: &[Uuid])
        -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Inserts one batch of products. Returns the number inserted.
    fn insert_products(
        &self,
        products: &[NewProduct],
    ) -> impl Future<Output = Result<u64, DbError>> + Send;

    fn count_products(&self) -> impl Future<Output = Result<i64, DbError>> + Send;
}
