use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::api::SyncResponse;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Shared secret guarding the sync trigger.
#[derive(Clone)]
pub struct SyncAuth {
    secret: Option<Arc<str>>,
}

impl std::fmt::Debug for SyncAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncAuth")
            .field("configured", &self.secret.is_some())
            .finish()
    }
}

impl SyncAuth {
    /// A blank secret counts as unset; requests are then refused with 500
    /// rather than let through.
    #[must_use]
    pub fn new(secret: Option<String>) -> Self {
        let secret = secret.filter(|s| !s.trim().is_empty()).map(Arc::from);
        if secret.is_none() {
            tracing::warn!("SYNC_SECRET not set; POST /api/sync will reject every request");
        }
        Self { secret }
    }

    fn allows(secret: &str, token: &str) -> bool {
        token.as_bytes().ct_eq(secret.as_bytes()).into()
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing the sync bearer secret.
///
/// The downstream handler never runs unless the token matches.
pub async fn require_sync_secret(
    State(auth): State<SyncAuth>,
    req: Request,
    next: Next,
) -> Response {
    let Some(secret) = auth.secret.as_deref() else {
        tracing::error!("sync requested but SYNC_SECRET is not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SyncResponse::failed("Sync secret is not configured")),
        )
            .into_response();
    };

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if SyncAuth::allows(secret, token) => next.run(req).await,
        _ => {
            tracing::warn!("rejected sync request with missing or invalid bearer token");
            (
                StatusCode::UNAUTHORIZED,
                Json(SyncResponse::failed("Unauthorized")),
            )
                .into_response()
        }
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
