//! Service-account credential resolution.
//!
//! Credentials come from one of two places: an inline base64-encoded JSON
//! document (convenient for hosted environments where files are awkward) or a
//! path to the JSON file downloaded from the Google Cloud console. The inline
//! value wins when both are set.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

use crate::error::CredentialsError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Where to look for the service-account key.
#[derive(Clone, Default)]
pub struct CredentialSource {
    pub inline_base64: Option<String>,
    pub path: Option<PathBuf>,
}

impl CredentialSource {
    #[must_use]
    pub fn from_app_config(config: &atelier_core::AppConfig) -> Self {
        Self {
            inline_base64: config.credentials_base64.clone(),
            path: config.credentials_path.clone(),
        }
    }
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSource")
            .field(
                "inline_base64",
                &self.inline_base64.as_ref().map(|_| "[redacted]"),
            )
            .field("path", &self.path)
            .finish()
    }
}

/// The subset of a Google service-account JSON key the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[redacted]")
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Resolve the service-account key from `source`.
///
/// # Errors
///
/// - [`CredentialsError::Decode`] / [`CredentialsError::Parse`] when the inline
///   value is not base64 or not a service-account document.
/// - [`CredentialsError::FileNotFound`] / [`CredentialsError::Io`] when the
///   path cannot be read.
/// - [`CredentialsError::Missing`] when neither source is set.
pub fn load_service_account(
    source: &CredentialSource,
) -> Result<ServiceAccountKey, CredentialsError> {
    if let Some(inline) = source
        .inline_base64
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        tracing::debug!("loading service-account key from inline base64 value");
        return decode_inline(inline);
    }

    if let Some(path) = source.path.as_deref() {
        tracing::debug!(path = %path.display(), "loading service-account key from file");
        return read_key_file(path);
    }

    Err(CredentialsError::Missing)
}

fn decode_inline(encoded: &str) -> Result<ServiceAccountKey, CredentialsError> {
    // Tolerate line-wrapped output from `base64` without `-w0`.
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    serde_json::from_slice(&bytes).map_err(|source| CredentialsError::Parse {
        origin: "GOOGLE_CREDENTIALS_BASE64".to_string(),
        source,
    })
}

fn read_key_file(path: &Path) -> Result<ServiceAccountKey, CredentialsError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CredentialsError::FileNotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(CredentialsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&contents).map_err(|source| CredentialsError::Parse {
        origin: path.display().to_string(),
        source,
    })
}
