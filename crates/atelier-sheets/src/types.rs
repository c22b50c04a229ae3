//! Sheet data shapes: the raw rows handed to the normalizer and the subset of
//! the Sheets v4 JSON responses we deserialize.

use std::collections::HashMap;

use serde::Deserialize;

/// One cell from a `values.get` response.
///
/// The API renders cells as JSON strings by default but returns numbers and
/// booleans under `UNFORMATTED_VALUE`, so all three are accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Trimmed text of the cell, `None` for empty or whitespace-only cells.
    #[must_use]
    pub fn as_trimmed_text(&self) -> Option<String> {
        let text = match self {
            CellValue::Empty => return None,
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::String(s) => CellValue::Text(s),
            serde_json::Value::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// A data row from the sheet, columns A–J in order.
///
/// The API trims trailing empty cells, so rows may be shorter than ten; a
/// missing column reads as [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow(pub Vec<CellValue>);

impl RawRow {
    #[must_use]
    pub fn cell(&self, col: usize) -> &CellValue {
        self.0.get(col).unwrap_or(&CellValue::Empty)
    }
}

impl<T: Into<CellValue>> FromIterator<T> for RawRow {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        RawRow(iter.into_iter().map(Into::into).collect())
    }
}

/// Link targets recovered from cell metadata, keyed by `(row, col)` where `row`
/// is relative to the first data row (0 = sheet row 2).
pub type HyperlinkOverlay = HashMap<(usize, usize), String>;

/// Everything one sync needs from the sheet.
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub rows: Vec<RawRow>,
    pub hyperlinks: HyperlinkOverlay,
}

// ---------------------------------------------------------------------------
// Sheets v4 response shapes
// ---------------------------------------------------------------------------

/// Response of `GET /v4/spreadsheets/{id}/values/{range}`.
#[derive(Debug, Deserialize)]
pub struct ValueRange {
    /// Absent entirely when the range holds no data.
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

/// Response of `GET /v4/spreadsheets/{id}?includeGridData=true`, trimmed to
/// the fields requested through the `fields` mask.
#[derive(Debug, Default, Deserialize)]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub data: Vec<GridData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    /// 0-based sheet row of the first `row_data` entry.
    #[serde(default)]
    pub start_row: Option<u32>,
    #[serde(default)]
    pub row_data: Vec<RowData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RowData {
    #[serde(default)]
    pub values: Vec<CellData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    #[serde(default)]
    pub hyperlink: Option<String>,
    #[serde(default)]
    pub text_format_runs: Vec<TextFormatRun>,
}

impl CellData {
    /// The cell-level link, falling back to the first linked rich-text run.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.hyperlink
            .as_deref()
            .or_else(|| {
                self.text_format_runs
                    .iter()
                    .find_map(|run| run.format.as_ref()?.link.as_ref()?.uri.as_deref())
            })
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TextFormatRun {
    #[serde(default)]
    pub format: Option<TextFormat>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextFormat {
    #[serde(default)]
    pub link: Option<Link>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub uri: Option<String>,
}
