//! OAuth 2.0 service-account flow: sign a JWT assertion with the key's RSA
//! private key and trade it for a short-lived bearer token.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::credentials::ServiceAccountKey;
use crate::error::SheetsError;

/// Read-only access to spreadsheets; the sync never writes back to the sheet.
pub const SPREADSHEETS_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/spreadsheets.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Bearer token returned by the token endpoint.
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[redacted]")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Builds the signed RS256 assertion for `key`.
///
/// # Errors
///
/// Returns [`SheetsError::Signing`] if the private key is not a valid RSA PEM.
pub fn sign_assertion(key: &ServiceAccountKey, scope: &str) -> Result<String, SheetsError> {
    let now = Utc::now();
    let claims = Claims {
        iss: &key.client_email,
        scope,
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid.clone_from(&key.private_key_id);

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(encode(&header, &claims, &encoding_key)?)
}

/// Exchanges a signed assertion for an access token at `key.token_uri`.
///
/// # Errors
///
/// - [`SheetsError::Signing`] if the assertion cannot be signed.
/// - [`SheetsError::Http`] on network failure.
/// - [`SheetsError::TokenExchange`] on a non-2xx response.
/// - [`SheetsError::Deserialize`] if the response body is not a token.
pub async fn fetch_access_token(
    client: &Client,
    key: &ServiceAccountKey,
    scope: &str,
) -> Result<AccessToken, SheetsError> {
    let assertion = sign_assertion(key, scope)?;

    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(SheetsError::TokenExchange {
            status: status.as_u16(),
            body,
        });
    }

    let token: AccessToken =
        serde_json::from_str(&body).map_err(|source| SheetsError::Deserialize {
            context: "token response".to_string(),
            source,
        })?;

    tracing::debug!(
        client_email = %key.client_email,
        expires_in = ?token.expires_in,
        "obtained Sheets access token"
    );
    Ok(token)
}
