//! Store maintenance and inspection commands.

use atelier_core::{AppConfig, ProductRecord, StoreConfig};
use atelier_db::{ProductStore, StoreBackend};

pub(crate) async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let StoreConfig::Postgres { database_url } = &config.store else {
        anyhow::bail!("`db migrate` requires DATABASE_URL; the REST store's schema is managed by its host");
    };

    let pool =
        atelier_db::connect_pool(database_url, atelier_db::PoolConfig::from_app_config(config))
            .await?;
    let applied = atelier_db::run_migrations(&pool).await?;
    println!("applied {applied} migrations");
    Ok(())
}

pub(crate) async fn run_ping(config: &AppConfig) -> anyhow::Result<()> {
    let store = StoreBackend::connect(config).await?;
    match &store {
        StoreBackend::Postgres(pg) => atelier_db::ping(pg.pool()).await?,
        StoreBackend::Rest(rest) => {
            rest.count_products().await?;
        }
    }
    println!("{} store reachable", store.name());
    Ok(())
}

pub(crate) async fn run_list_products(
    config: &AppConfig,
    brand: Option<&str>,
) -> anyhow::Result<()> {
    let StoreBackend::Postgres(store) = StoreBackend::connect(config).await? else {
        anyhow::bail!("listing products requires DATABASE_URL");
    };

    let products = store.list_products(brand).await?;
    if products.is_empty() {
        println!("no products");
        return Ok(());
    }

    println!("{:<40} {:<20} {:>12} {:>6}", "NAME", "BRAND", "PRICE", "STOCK");
    for product in &products {
        println!("{}", product_line(product));
    }
    println!("{} products", products.len());
    Ok(())
}

pub(crate) fn product_line(product: &ProductRecord) -> String {
    let price = product
        .price
        .map_or_else(|| "-".to_string(), |p| p.to_string());
    format!(
        "{:<40} {:<20} {:>12} {:>6}",
        product.name,
        product.brand.as_deref().unwrap_or("-"),
        price,
        product.stock
    )
}
