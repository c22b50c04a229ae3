//! Normalization from raw sheet rows to [`atelier_core::NewProduct`].
//!
//! Every cell is parsed leniently: a malformed price or stock value degrades
//! to "absent" or `0` instead of failing the run. A row only disappears when
//! it has no name or no positive stock.

use std::str::FromStr;
use std::sync::LazyLock;

use atelier_core::NewProduct;
use regex::Regex;
use rust_decimal::Decimal;
use url::Url;

use crate::types::{CellValue, HyperlinkOverlay, RawRow, SheetData};

pub const NAME_COLUMN: usize = 0;
pub const BRAND_COLUMN: usize = 1;
// Columns C and D are not read.
pub const STOCK_COLUMN: usize = 4;
pub const PRICE_COLUMN: usize = 5;
pub const IMAGE_COLUMNS: [usize; 2] = [6, 7];

/// Largest price the `products.price NUMERIC(12, 2)` column can hold.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Ruble sign plus the Cyrillic and Latin abbreviations seen in price cells.
static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)₽|руб(?:лей|ля|ль)?\.?|rub(?:les?)?\.?|р\.|\bр\b")
        .expect("valid currency regex")
});

static EMBEDDED_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s"'<>()]+"#).expect("valid url regex"));

/// Normalizes every row of `sheet`, dropping rows that cannot become products.
///
/// Output order follows sheet order.
#[must_use]
pub fn normalize_rows(sheet: &SheetData) -> Vec<NewProduct> {
    let products: Vec<NewProduct> = sheet
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| normalize_row(index, row, &sheet.hyperlinks))
        .collect();

    tracing::debug!(
        rows = sheet.rows.len(),
        kept = products.len(),
        dropped = sheet.rows.len() - products.len(),
        "normalized sheet rows"
    );
    products
}

/// Normalizes the row at `index` (0 = first data row).
///
/// Returns `None` when the name is blank or stock is not positive.
#[must_use]
pub fn normalize_row(
    index: usize,
    row: &RawRow,
    hyperlinks: &HyperlinkOverlay,
) -> Option<NewProduct> {
    let name = row.cell(NAME_COLUMN).as_trimmed_text()?;
    let [first, second] =
        IMAGE_COLUMNS.map(|col| resolve_image_url(index, col, row.cell(col), hyperlinks));

    let product = NewProduct {
        name,
        brand: row.cell(BRAND_COLUMN).as_trimmed_text(),
        price: parse_price(row.cell(PRICE_COLUMN)),
        stock: parse_stock(row.cell(STOCK_COLUMN)),
        image_url_1: first,
        image_url_2: second,
    };
    if !product.is_persistable() {
        tracing::trace!(
            index,
            name = %product.name,
            stock = product.stock,
            "skipping row without stock"
        );
        return None;
    }
    Some(product)
}

/// Reads a stock count.
///
/// Numbers are truncated toward zero. Text is read by its leading integer, so
/// `"12 pcs"` is 12 and `"5.7"` is 5. Anything else, including values outside
/// the `i32` range, is 0.
#[must_use]
pub fn parse_stock(cell: &CellValue) -> i32 {
    match cell {
        CellValue::Number(n) => truncate_to_i32(*n).unwrap_or(0),
        CellValue::Text(text) => leading_integer(text.trim()).unwrap_or(0),
        CellValue::Empty | CellValue::Bool(_) => 0,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_to_i32(n: f64) -> Option<i32> {
    let truncated = n.trunc();
    (truncated.is_finite()
        && truncated >= f64::from(i32::MIN)
        && truncated <= f64::from(i32::MAX))
    .then(|| truncated as i32)
}

fn leading_integer(text: &str) -> Option<i32> {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let digits = unsigned
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(unsigned.len(), |(i, _)| i);
    if digits == 0 {
        return None;
    }
    let sign_len = text.len() - unsigned.len();
    text[..sign_len + digits].parse().ok()
}

/// Reads a price in rubles.
///
/// Numeric cells are taken as-is. Text has the currency marker, whitespace,
/// and thousands-separator commas removed before parsing, so `"₽27,000.00"`
/// reads as `27000.00`. Unparsable or negative values are `None`, as are
/// values that round above [`MAX_PRICE`] at two decimal places.
#[must_use]
pub fn parse_price(cell: &CellValue) -> Option<Decimal> {
    let price = match cell {
        CellValue::Number(n) => Decimal::try_from(*n).ok()?,
        CellValue::Text(text) => {
            let stripped = CURRENCY_RE.replace_all(text, "");
            let cleaned: String = stripped
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',')
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            Decimal::from_str(&cleaned).ok()?
        }
        CellValue::Empty | CellValue::Bool(_) => return None,
    };

    if price.is_sign_negative() {
        return None;
    }
    if price.round_dp(2) > MAX_PRICE {
        tracing::trace!(%price, "price exceeds column precision");
        return None;
    }
    Some(price)
}

/// Picks the image URL for one cell, in order of preference: the cell's link
/// target, the cell text when it is itself a URL, then the first URL embedded
/// in the text.
fn resolve_image_url(
    index: usize,
    col: usize,
    cell: &CellValue,
    hyperlinks: &HyperlinkOverlay,
) -> Option<String> {
    if let Some(link) = hyperlinks.get(&(index, col)).and_then(|l| absolute_http_url(l)) {
        return Some(link);
    }

    let text = cell.as_trimmed_text()?;
    if starts_with_http_scheme(&text) {
        if let Some(url) = absolute_http_url(&text) {
            return Some(url);
        }
    }

    EMBEDDED_URL_RE
        .find(&text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', '!', '?']))
        .and_then(absolute_http_url)
}

fn starts_with_http_scheme(text: &str) -> bool {
    let lower = text.get(..8).unwrap_or(text).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Returns the trimmed input if it parses as an absolute `http(s)` URL with a
/// host.
fn absolute_http_url(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    let url = Url::parse(candidate).ok()?;
    let http = matches!(url.scheme(), "http" | "https");
    (http && url.host_str().is_some_and(|h| !h.is_empty())).then(|| candidate.to_string())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
