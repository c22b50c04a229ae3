//! Integration tests for `SheetsClient::read_sheet`.
//!
//! Uses `wiremock` to stand in for both the OAuth token endpoint and the
//! Sheets API, so no real network traffic is made. The service-account
//! fixture carries a throwaway RSA key that only exists for these tests.

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atelier_sheets::{
    normalize_rows, ServiceAccountKey, SheetReader, SheetsClient, SheetsError,
};

const SHEET_ID: &str = "sheet-123";

fn test_key(server: &MockServer) -> ServiceAccountKey {
    let mut key: ServiceAccountKey =
        serde_json::from_str(include_str!("fixtures/service_account.json"))
            .expect("fixture key parses");
    key.token_uri = format!("{}/token", server.uri());
    key
}

fn test_client(server: &MockServer) -> SheetsClient {
    SheetsClient::with_base_url(&server.uri(), 5).expect("failed to build test SheetsClient")
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_values(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}/values/A2:J100")))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_grid(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}")))
        .and(query_param("includeGridData", "true"))
        .and(query_param("ranges", "A2:J100"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn read_sheet_returns_rows_and_hyperlink_overlay() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_values(
        &server,
        json!({
            "range": "Sheet1!A2:J100",
            "majorDimension": "ROWS",
            "values": [
                ["Vase A", "Lalique", "", "", "5", "₽1,200.00", "Front", "https://cdn.example.com/vase-back.jpg"],
                ["", "", "", "", "3"],
                ["Plate B", "Bernardaud", "", "", "0", "₽900.00"]
            ]
        }),
    )
    .await;
    mount_grid(
        &server,
        json!({
            "sheets": [{
                "data": [{
                    "startRow": 1,
                    "rowData": [
                        {"values": [{}, {}, {}, {}, {}, {},
                            {"hyperlink": "https://cdn.example.com/vase-front.jpg"},
                            {}
                        ]},
                        {},
                        {}
                    ]
                }]
            }]
        }),
    )
    .await;

    let client = test_client(&server);
    let sheet = client
        .read_sheet(&test_key(&server), SHEET_ID)
        .await
        .expect("read_sheet");

    assert_eq!(sheet.rows.len(), 3);
    assert_eq!(
        sheet.hyperlinks.get(&(0, 6)).map(String::as_str),
        Some("https://cdn.example.com/vase-front.jpg")
    );

    let products = normalize_rows(&sheet);
    assert_eq!(products.len(), 1);
    let vase = &products[0];
    assert_eq!(vase.name, "Vase A");
    assert_eq!(vase.brand.as_deref(), Some("Lalique"));
    assert_eq!(vase.stock, 5);
    assert_eq!(vase.price.map(|p| p.to_string()).as_deref(), Some("1200.00"));
    assert_eq!(
        vase.image_url_1.as_deref(),
        Some("https://cdn.example.com/vase-front.jpg")
    );
    assert_eq!(
        vase.image_url_2.as_deref(),
        Some("https://cdn.example.com/vase-back.jpg")
    );
}

#[tokio::test]
async fn read_sheet_handles_empty_range() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_values(&server, json!({"range": "Sheet1!A2:J100", "majorDimension": "ROWS"})).await;
    mount_grid(&server, json!({"sheets": [{"data": [{"startRow": 1}]}]})).await;

    let sheet = test_client(&server)
        .read_sheet(&test_key(&server), SHEET_ID)
        .await
        .expect("read_sheet");

    assert!(sheet.rows.is_empty());
    assert!(sheet.hyperlinks.is_empty());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn token_rejection_is_a_token_exchange_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server)
        .read_sheet(&test_key(&server), SHEET_ID)
        .await
        .unwrap_err();

    assert!(
        matches!(err, SheetsError::TokenExchange { status: 400, ref body } if body.contains("invalid_grant")),
        "expected TokenExchange(400), got: {err:?}"
    );
}

#[tokio::test]
async fn forbidden_values_read_aborts_without_grid_read() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}/values/A2:J100")))
        .respond_with(ResponseTemplate::new(403).set_body_string("caller lacks permission"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .read_sheet(&test_key(&server), SHEET_ID)
        .await
        .unwrap_err();

    assert!(
        matches!(err, SheetsError::UnexpectedStatus { status: 403, .. }),
        "expected UnexpectedStatus(403), got: {err:?}"
    );
}

#[tokio::test]
async fn grid_read_failure_is_fatal() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_values(&server, json!({"values": [["Vase A", "", "", "", "1"]]})).await;
    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}")))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .read_sheet(&test_key(&server), SHEET_ID)
        .await
        .unwrap_err();

    assert!(
        matches!(err, SheetsError::UnexpectedStatus { status: 500, .. }),
        "expected UnexpectedStatus(500), got: {err:?}"
    );
}

#[tokio::test]
async fn malformed_values_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}/values/A2:J100")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .read_sheet(&test_key(&server), SHEET_ID)
        .await
        .unwrap_err();

    assert!(
        matches!(err, SheetsError::Deserialize { ref context, .. } if context == "values response"),
        "expected Deserialize(values response), got: {err:?}"
    );
}
