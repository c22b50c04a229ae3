//! Google Sheets ingestion: service-account credentials, the two-read sheet
//! fetch (values plus hyperlink metadata), and row normalization into
//! [`atelier_core::NewProduct`].

pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod normalize;
pub mod types;

pub use auth::{fetch_access_token, AccessToken, SPREADSHEETS_READONLY_SCOPE};
pub use client::{SheetReader, SheetsClient, SHEET_RANGE};
pub use credentials::{load_service_account, CredentialSource, ServiceAccountKey};
pub use error::{CredentialsError, SheetsError};
pub use normalize::{normalize_row, normalize_rows, parse_price, parse_stock};
pub use types::{CellValue, HyperlinkOverlay, RawRow, SheetData};
