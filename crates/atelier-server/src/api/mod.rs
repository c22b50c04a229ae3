mod sync;

use std::sync::Arc;

use atelier_db::ProductStore;
use atelier_sheets::SheetReader;
use atelier_sync::SyncJob;
use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, require_sync_secret, RequestId, SyncAuth};

pub use sync::SyncResponse;

pub struct AppState<R, S> {
    pub job: Arc<SyncJob<R, S>>,
}

impl<R, S> Clone for AppState<R, S> {
    fn clone(&self) -> Self {
        Self {
            job: Arc::clone(&self.job),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    products: Option<i64>,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn sync_router<R, S>(auth: SyncAuth) -> Router<AppState<R, S>>
where
    R: SheetReader + Send + Sync + 'static,
    S: ProductStore + Send + Sync + 'static,
{
    Router::new()
        .route("/api/sync", post(sync::trigger_sync::<R, S>))
        .route_layer(axum::middleware::from_fn_with_state(
            auth,
            require_sync_secret,
        ))
}

pub fn build_app<R, S>(state: AppState<R, S>, auth: SyncAuth) -> Router
where
    R: SheetReader + Send + Sync + 'static,
    S: ProductStore + Send + Sync + 'static,
{
    let public_routes = Router::new().route("/api/v1/health", get(health::<R, S>));

    Router::new()
        .merge(public_routes)
        .merge(sync_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health<R, S>(
    State(state): State<AppState<R, S>>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse
where
    R: SheetReader + Send + Sync + 'static,
    S: ProductStore + Send + Sync + 'static,
{
    let meta = ResponseMeta::new(req_id.0);

    match state.job.store().count_products().await {
        Ok(count) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    store: "ok",
                    products: Some(count),
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: product store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        store: "unavailable",
                        products: None,
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
