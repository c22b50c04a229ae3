//! Integration tests for `RestProductStore` against a mocked PostgREST API.

use atelier_core::NewProduct;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atelier_db::{replace_all_products, DbError, ProductStore, ReplaceError, RestProductStore};

const KEY: &str = "service-role-key";

fn test_store(server: &MockServer) -> RestProductStore {
    RestProductStore::new(&server.uri(), KEY, 5).expect("failed to build test store")
}

fn id_rows(ids: &[Uuid]) -> serde_json::Value {
    ids.iter().map(|id| json!({"id": id})).collect()
}

fn vase() -> NewProduct {
    NewProduct {
        name: "Vase A".to_string(),
        brand: Some("Lalique".to_string()),
        price: Some(Decimal::new(120_000, 2)),
        stock: 5,
        image_url_1: Some("https://cdn.example.com/vase.jpg".to_string()),
        image_url_2: None,
    }
}

#[tokio::test]
async fn list_product_ids_sends_service_key_headers() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("select", "id"))
        .and(header("apikey", KEY))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": id}])))
        .mount(&server)
        .await;

    let ids = test_store(&server).list_product_ids().await.expect("ids");
    assert_eq!(ids, vec![id]);
}

#[tokio::test]
async fn list_product_ids_pages_past_max_rows() {
    let server = MockServer::start().await;
    let ids: Vec<Uuid> = (0..1500).map(|_| Uuid::new_v4()).collect();

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("offset", "0"))
        .and(header("prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-999/1500")
                .set_body_json(id_rows(&ids[..1000])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("offset", "1000"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "1000-1499/1500")
                .set_body_json(id_rows(&ids[1000..])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let listed = test_store(&server).list_product_ids().await.expect("ids");
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn list_product_ids_follows_total_when_server_caps_page() {
    let server = MockServer::start().await;
    let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-1/3")
                .set_body_json(id_rows(&ids[..2])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("offset", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "2-2/3")
                .set_body_json(id_rows(&ids[2..])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let listed = test_store(&server).list_product_ids().await.expect("ids");
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn delete_products_uses_in_filter() {
    let server = MockServer::start().await;
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/products"))
        .and(query_param("id", format!("in.({a},{b})").as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let deleted = test_store(&server)
        .delete_products(&[a, b])
        .await
        .expect("delete");
    assert_eq!(deleted, 2);
}

#[tokio::test]
async fn insert_products_posts_json_array() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/products"))
        .and(header("prefer", "return=minimal"))
        .and(body_json(json!([{
            "name": "Vase A",
            "brand": "Lalique",
            "price": "1200.00",
            "stock": 5,
            "image_url_1": "https://cdn.example.com/vase.jpg",
            "image_url_2": null
        }])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let inserted = test_store(&server)
        .insert_products(&[vase()])
        .await
        .expect("insert");
    assert_eq!(inserted, 1);
}

#[tokio::test]
async fn count_products_reads_content_range() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(header("prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/42")
                .set_body_json(json!([{"id": Uuid::new_v4()}])),
        )
        .mount(&server)
        .await;

    assert_eq!(test_store(&server).count_products().await.expect("count"), 42);
}

#[tokio::test]
async fn error_status_is_surfaced_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let err = test_store(&server).list_product_ids().await.unwrap_err();
    assert!(
        matches!(err, DbError::UnexpectedStatus { status: 401, ref body, .. } if body == "Invalid API key"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn replace_all_over_rest_skips_delete_for_empty_table() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let summary = replace_all_products(&test_store(&server), &[vase()])
        .await
        .expect("replace");
    assert_eq!(summary.deleted, 0);
    assert_eq!(summary.inserted, 1);
}

#[tokio::test]
async fn replace_all_over_rest_reports_failed_insert_batch() {
    let server = MockServer::start().await;
    let existing = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": existing}])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(400).set_body_string("violates check constraint"))
        .mount(&server)
        .await;

    let err = replace_all_products(&test_store(&server), &[vase()])
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReplaceError::InsertBatch { batch: 1, total_batches: 1, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn replace_all_over_rest_deletes_every_page_of_existing_rows() {
    let server = MockServer::start().await;
    let ids: Vec<Uuid> = (0..1500).map(|_| Uuid::new_v4()).collect();

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-999/1500")
                .set_body_json(id_rows(&ids[..1000])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("offset", "1000"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "1000-1499/1500")
                .set_body_json(id_rows(&ids[1000..])),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(204))
        .expect(8)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let summary = replace_all_products(&test_store(&server), &[vase()])
        .await
        .expect("replace");
    assert_eq!(summary.deleted, 1500);
    assert_eq!(summary.inserted, 1);
}
