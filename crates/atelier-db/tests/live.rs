//! Live integration tests for atelier-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. Run with `DATABASE_URL` set and `--ignored`.

use atelier_core::NewProduct;
use atelier_db::{
    ping, replace_all_products, run_migrations, PgProductStore, ProductStore, ReplaceSummary,
};
use rust_decimal::Decimal;

fn product(name: &str, brand: Option<&str>, stock: i32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        brand: brand.map(str::to_string),
        price: Some(Decimal::new(2_700_000, 2)),
        stock,
        image_url_1: Some(format!("https://cdn.example.com/{name}.jpg")),
        image_url_2: None,
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn ping_succeeds_on_fresh_database(pool: sqlx::PgPool) {
    ping(&pool).await.expect("ping failed");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn run_migrations_is_idempotent(pool: sqlx::PgPool) {
    let applied = run_migrations(&pool).await.expect("migrations failed");
    assert_eq!(applied, 0, "harness already applied every migration");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn replace_all_swaps_catalog_contents(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);

    let first = vec![
        product("Vase A", Some("Lalique"), 5),
        product("Bag B", Some("Hermès"), 1),
    ];
    let summary = replace_all_products(&store, &first).await.expect("first sync");
    assert_eq!(summary, ReplaceSummary { deleted: 0, inserted: 2 });

    let second = vec![product("Scarf C", None, 3)];
    let summary = replace_all_products(&store, &second).await.expect("second sync");
    assert_eq!(summary, ReplaceSummary { deleted: 2, inserted: 1 });

    let rows = store.list_products(None).await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Scarf C");
    assert_eq!(rows[0].brand, None);
    assert_eq!(rows[0].price, Some(Decimal::new(2_700_000, 2)));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn insert_products_handles_multiple_chunks(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);
    let products: Vec<_> = (0..230)
        .map(|i| product(&format!("item-{i}"), Some("Cartier"), 1))
        .collect();

    replace_all_products(&store, &products)
        .await
        .expect("replace failed");
    assert_eq!(store.count_products().await.expect("count"), 230);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_products_filters_by_brand(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);
    store
        .insert_products(&[
            product("Vase A", Some("Lalique"), 5),
            product("Bowl B", Some("Lalique"), 2),
            product("Bag C", Some("Hermès"), 1),
        ])
        .await
        .expect("insert");

    let lalique = store.list_products(Some("Lalique")).await.expect("list");
    assert_eq!(lalique.len(), 2);
    assert!(lalique.iter().all(|p| p.brand.as_deref() == Some("Lalique")));

    let all = store.list_products(None).await.expect("list");
    assert_eq!(all.len(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn schema_rejects_non_positive_stock(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);
    let err = store
        .insert_products(&[product("Ghost", None, 0)])
        .await
        .unwrap_err();
    assert!(
        matches!(err, atelier_db::DbError::Sqlx(_)),
        "got: {err:?}"
    );
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_products_with_empty_ids_is_noop(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);
    store
        .insert_products(&[product("Vase A", None, 5)])
        .await
        .expect("insert");

    assert_eq!(store.delete_products(&[]).await.expect("delete"), 0);
    assert_eq!(store.count_products().await.expect("count"), 1);
}
