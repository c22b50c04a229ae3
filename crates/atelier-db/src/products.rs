//! Postgres-backed [`ProductStore`] over the `products` table.

use atelier_core::{NewProduct, ProductRecord};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::store::ProductStore;
use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub price: Option<Decimal>,
    pub stock: i32,
    pub image_url_1: Option<String>,
    pub image_url_2: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            price: row.price,
            stock: row.stock,
            image_url_1: row.image_url_1,
            image_url_2: row.image_url_2,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Lists catalog products, optionally restricted to one brand, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the query fails.
    pub async fn list_products(&self, brand: Option<&str>) -> Result<Vec<ProductRecord>, DbError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, brand, price, stock, image_url_1, image_url_2, \
                    created_at, updated_at \
             FROM products \
             WHERE ($1::text IS NULL OR brand = $1) \
             ORDER BY created_at DESC, name",
        )
        .bind(brand)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }
}

impl ProductStore for PgProductStore {
    async fn list_product_ids(&self) -> Result<Vec<Uuid>, DbError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM products")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn delete_products(&self, ids: &[Uuid]) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_products(&self, products: &[NewProduct]) -> Result<u64, DbError> {
        if products.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO products (name, brand, price, stock, image_url_1, image_url_2) ",
        );
        builder.push_values(products, |mut row, product| {
            row.push_bind(product.name.clone())
                .push_bind(product.brand.clone())
                .push_bind(product.price)
                .push_bind(product.stock)
                .push_bind(product.image_url_1.clone())
                .push_bind(product.image_url_2.clone());
        });

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn count_products(&self) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
