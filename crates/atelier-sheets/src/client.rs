//! HTTP client for the Google Sheets v4 REST API.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::auth::{fetch_access_token, AccessToken, SPREADSHEETS_READONLY_SCOPE};
use crate::credentials::ServiceAccountKey;
use crate::error::SheetsError;
use crate::normalize::IMAGE_COLUMNS;
use crate::types::{CellValue, HyperlinkOverlay, RawRow, SheetData, Spreadsheet, ValueRange};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/";

/// Data rows 2–100, columns A–J. Row 1 is the header; the sheet holds at most
/// 99 products.
pub const SHEET_RANGE: &str = "A2:J100";

/// Field mask for the grid read: only link metadata is needed, which keeps
/// the response small even though `includeGridData` is set.
const GRID_FIELDS: &str =
    "sheets(data(startRow,rowData(values(hyperlink,textFormatRuns(format(link(uri)))))))";

/// Source of raw sheet data for a sync run.
pub trait SheetReader {
    /// Reads the product range and its hyperlink overlay.
    fn read_sheet(
        &self,
        key: &ServiceAccountKey,
        spreadsheet_id: &str,
    ) -> impl Future<Output = Result<SheetData, SheetsError>> + Send;
}

/// Client for the Sheets API.
///
/// Use [`SheetsClient::new`] for production or [`SheetsClient::with_base_url`]
/// to point at a mock server in tests. The OAuth token endpoint is taken from
/// the service-account key, not from the base URL.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: Url,
}

impl SheetsClient {
    /// Creates a client pointed at the production Sheets API.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, SheetsError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`SheetsError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("atelier/0.1 (catalog-sync)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SheetsError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Fetches cell values for `range` (`values.get`).
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError`] on transport failure, non-2xx status, or an
    /// undecodable body.
    pub async fn fetch_values(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<RawRow>, SheetsError> {
        let url = self.endpoint(&["v4", "spreadsheets", spreadsheet_id, "values", range])?;
        let body: ValueRange = self.get_json(token, url, &[], "values response").await?;

        Ok(body
            .values
            .into_iter()
            .map(|cells| RawRow(cells.into_iter().map(CellValue::from).collect()))
            .collect())
    }

    /// Fetches grid data for `range` and extracts hyperlinks from the image
    /// columns.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError`] on transport failure, non-2xx status, or an
    /// undecodable body.
    pub async fn fetch_hyperlinks(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<HyperlinkOverlay, SheetsError> {
        let url = self.endpoint(&["v4", "spreadsheets", spreadsheet_id])?;
        let query = [
            ("ranges", range),
            ("includeGridData", "true"),
            ("fields", GRID_FIELDS),
        ];
        let body: Spreadsheet = self.get_json(token, url, &query, "grid response").await?;
        Ok(build_hyperlink_overlay(&body))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SheetsError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        url: Url,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<T, SheetsError> {
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SheetsError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| SheetsError::Deserialize {
            context: context.to_string(),
            source,
        })
    }
}

impl SheetReader for SheetsClient {
    async fn read_sheet(
        &self,
        key: &ServiceAccountKey,
        spreadsheet_id: &str,
    ) -> Result<SheetData, SheetsError> {
        let token = fetch_access_token(&self.client, key, SPREADSHEETS_READONLY_SCOPE).await?;

        let rows = self.fetch_values(&token, spreadsheet_id, SHEET_RANGE).await?;
        let hyperlinks = self
            .fetch_hyperlinks(&token, spreadsheet_id, SHEET_RANGE)
            .await?;

        tracing::info!(
            spreadsheet_id,
            rows = rows.len(),
            hyperlinks = hyperlinks.len(),
            "read product sheet"
        );
        Ok(SheetData { rows, hyperlinks })
    }
}

/// 0-based grid index of the first data row (sheet row 2).
const FIRST_DATA_ROW: usize = 1;

/// Collects link targets for the image columns, keyed by data-row index.
///
/// Each grid reports the sheet row of its first `rowData` entry as
/// `startRow`; rows above the first data row are skipped.
fn build_hyperlink_overlay(spreadsheet: &Spreadsheet) -> HyperlinkOverlay {
    let mut overlay = HyperlinkOverlay::new();

    let grids = spreadsheet.sheets.iter().flat_map(|sheet| sheet.data.iter());
    for grid in grids {
        let start_row = grid
            .start_row
            .and_then(|row| usize::try_from(row).ok())
            .unwrap_or(FIRST_DATA_ROW);
        for (offset, row) in grid.row_data.iter().enumerate() {
            let Some(row_index) = (start_row + offset).checked_sub(FIRST_DATA_ROW) else {
                continue;
            };
            for col in IMAGE_COLUMNS {
                if let Some(link) = row.values.get(col).and_then(|cell| cell.link()) {
                    overlay
                        .entry((row_index, col))
                        .or_insert_with(|| link.to_string());
                }
            }
        }
    }

    overlay
}
