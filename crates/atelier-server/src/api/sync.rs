use atelier_db::ProductStore;
use atelier_sheets::SheetReader;
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;

use super::AppState;
use crate::middleware::RequestId;

/// Body of every `POST /api/sync` response, including auth rejections.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SyncResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResponse {
    #[must_use]
    pub fn completed(count: usize) -> Self {
        Self {
            success: true,
            count: Some(count),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            count: None,
            error: Some(message.into()),
        }
    }
}

/// Runs the sync pipeline once. Reached only through `require_sync_secret`.
pub(super) async fn trigger_sync<R, S>(
    State(state): State<AppState<R, S>>,
    Extension(req_id): Extension<RequestId>,
) -> (StatusCode, Json<SyncResponse>)
where
    R: SheetReader + Send + Sync + 'static,
    S: ProductStore + Send + Sync + 'static,
{
    tracing::info!(request_id = %req_id.0, "sync triggered over HTTP");

    match state.job.run(|_| {}).await {
        Ok(report) => {
            tracing::info!(
                request_id = %req_id.0,
                inserted = report.inserted,
                deleted = report.deleted,
                dropped = report.dropped,
                "HTTP-triggered sync complete"
            );
            (StatusCode::OK, Json(SyncResponse::completed(report.inserted)))
        }
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "HTTP-triggered sync failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SyncResponse::failed(e.to_string())),
            )
        }
    }
}
