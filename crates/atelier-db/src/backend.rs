use atelier_core::{AppConfig, NewProduct, StoreConfig};
use uuid::Uuid;

use crate::products::PgProductStore;
use crate::rest::RestProductStore;
use crate::store::ProductStore;
use crate::{connect_pool, DbError, PoolConfig};

/// The configured destination store.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Postgres(PgProductStore),
    Rest(RestProductStore),
}

impl StoreBackend {
    /// Connects to whichever store `config` selects.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the Postgres pool cannot connect or the REST
    /// client cannot be built.
    pub async fn connect(config: &AppConfig) -> Result<Self, DbError> {
        match &config.store {
            StoreConfig::Postgres { database_url } => {
                let pool =
                    connect_pool(database_url, PoolConfig::from_app_config(config)).await?;
                tracing::debug!("connected to Postgres product store");
                Ok(Self::Postgres(PgProductStore::new(pool)))
            }
            StoreConfig::Rest {
                endpoint,
                service_key,
            } => {
                let store = RestProductStore::new(endpoint, service_key, config.http_timeout_secs)?;
                tracing::debug!(endpoint = %endpoint, "using REST product store");
                Ok(Self::Rest(store))
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Rest(_) => "rest",
        }
    }
}

impl ProductStore for StoreBackend {
    async fn list_product_ids(&self) -> Result<Vec<Uuid>, DbError> {
        match self {
            Self::Postgres(store) => store.list_product_ids().await,
            Self::Rest(store) => store.list_product_ids().await,
        }
    }

    async fn delete_products(&self, ids: &[Uuid]) -> Result<u64, DbError> {
        match self {
            Self::Postgres(store) => store.delete_products(ids).await,
            Self::Rest(store) => store.delete_products(ids).await,
        }
    }

    async fn insert_products(&self, products: &[NewProduct]) -> Result<u64, DbError> {
        match self {
            Self::Postgres(store) => store.insert_products(products).await,
            Self::Rest(store) => store.insert_products(products).await,
        }
    }

    async fn count_products(&self) -> Result<i64, DbError> {
        match self {
            Self::Postgres(store) => store.count_products().await,
            Self::Rest(store) => store.count_products().await,
        }
    }
}
