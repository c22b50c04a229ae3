//! [`ProductStore`] over a PostgREST endpoint (Supabase's `/rest/v1`).
//!
//! Used when the database is only reachable through its HTTP API. Every call
//! authenticates with the service-role key, which bypasses row-level security.

use std::time::Duration;

use atelier_core::NewProduct;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use uuid::Uuid;

use crate::store::ProductStore;
use crate::DbError;

const TABLE: &str = "products";

/// Rows requested per page when listing ids. The server's `max-rows` setting
/// may cap a page lower; paging continues until the `Content-Range` total is
/// reached.
const ID_PAGE_SIZE: usize = 1000;

/// Ids per `DELETE ?id=in.(...)` request.
const DELETE_CHUNK_SIZE: usize = 200;

#[derive(Debug, Deserialize)]
struct IdRow {
    id: Uuid,
}

#[derive(Clone)]
pub struct RestProductStore {
    client: Client,
    table_url: Url,
}

impl std::fmt::Debug for RestProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestProductStore")
            .field("table_url", &self.table_url.as_str())
            .finish_non_exhaustive()
    }
}

impl RestProductStore {
    /// Creates a store for `{endpoint}/rest/v1/products`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidEndpoint`] if `endpoint` does not parse or the
    /// key is not a valid header value, or [`DbError::Http`] if the
    /// `reqwest::Client` cannot be constructed.
    pub fn new(endpoint: &str, service_key: &str, timeout_secs: u64) -> Result<Self, DbError> {
        let invalid = |reason: String| DbError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let base = Url::parse(&format!("{}/", endpoint.trim_end_matches('/')))
            .map_err(|e| invalid(e.to_string()))?;
        let table_url = base
            .join(&format!("rest/v1/{TABLE}"))
            .map_err(|e| invalid(e.to_string()))?;

        let mut headers = HeaderMap::new();
        let mut apikey =
            HeaderValue::from_str(service_key).map_err(|e| invalid(e.to_string()))?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {service_key}"))
            .map_err(|e| invalid(e.to_string()))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, table_url })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DbError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(DbError::UnexpectedStatus {
            status: status.as_u16(),
            url,
            body,
        })
    }
}

impl ProductStore for RestProductStore {
    async fn list_product_ids(&self) -> Result<Vec<Uuid>, DbError> {
        let limit = ID_PAGE_SIZE.to_string();
        let mut ids = Vec::new();

        loop {
            let offset = ids.len().to_string();
            let request = self
                .client
                .get(self.table_url.clone())
                .query(&[
                    ("select", "id"),
                    ("order", "id"),
                    ("offset", offset.as_str()),
                    ("limit", limit.as_str()),
                ])
                .header("Prefer", "count=exact");
            let response = self.send(request).await?;
            let total = parse_content_range_total(&content_range(&response))
                .and_then(|total| usize::try_from(total).ok());

            let body = response.text().await?;
            let rows: Vec<IdRow> =
                serde_json::from_str(&body).map_err(|source| DbError::Deserialize {
                    context: "product id list".to_string(),
                    source,
                })?;
            let fetched = rows.len();
            ids.extend(rows.into_iter().map(|row| row.id));

            let exhausted = match total {
                Some(total) => ids.len() >= total,
                None => fetched < ID_PAGE_SIZE,
            };
            if fetched == 0 || exhausted {
                break;
            }
            tracing::debug!(fetched = ids.len(), ?total, "fetching next page of product ids");
        }

        Ok(ids)
    }

    async fn delete_products(&self, ids: &[Uuid]) -> Result<u64, DbError> {
        for chunk in ids.chunks(DELETE_CHUNK_SIZE) {
            let list = chunk
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let filter = format!("in.({list})");
            let request = self
                .client
                .delete(self.table_url.clone())
                .query(&[("id", filter.as_str())])
                .header("Prefer", "return=minimal");
            self.send(request).await?;
        }
        Ok(ids.len() as u64)
    }

    async fn insert_products(&self, products: &[NewProduct]) -> Result<u64, DbError> {
        if products.is_empty() {
            return Ok(0);
        }

        let request = self
            .client
            .post(self.table_url.clone())
            .header("Prefer", "return=minimal")
            .json(products);
        self.send(request).await?;
        Ok(products.len() as u64)
    }

    async fn count_products(&self) -> Result<i64, DbError> {
        let request = self
            .client
            .get(self.table_url.clone())
            .query(&[("select", "id"), ("limit", "1")])
            .header("Prefer", "count=exact");
        let response = self.send(request).await?;

        let header = content_range(&response);
        parse_content_range_total(&header).ok_or_else(|| DbError::UnexpectedStatus {
            status: response.status().as_u16(),
            url: response.url().to_string(),
            body: format!("missing or invalid Content-Range header: {header:?}"),
        })
    }
}

fn content_range(response: &Response) -> String {
    response
        .headers()
        .get("content-range")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Extracts the total from a PostgREST `Content-Range` value such as
/// `0-0/42` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<i64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}
