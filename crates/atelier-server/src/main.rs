mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use atelier_db::StoreBackend;
use atelier_sheets::SheetsClient;
use atelier_sync::SyncJob;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::SyncAuth,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = atelier_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = StoreBackend::connect(&config).await?;
    if let StoreBackend::Postgres(pg) = &store {
        let applied = atelier_db::run_migrations(pg.pool()).await?;
        tracing::info!(applied, "database migrations up to date");
    }
    tracing::info!(env = %config.env, store = store.name(), "product store ready");

    let reader = SheetsClient::new(config.http_timeout_secs)?;
    let job = Arc::new(SyncJob::from_app_config(&config, reader, store));

    let _scheduler = match config.sync_cron.as_deref() {
        Some(schedule) => Some(scheduler::build_scheduler(Arc::clone(&job), schedule).await?),
        None => None,
    };

    let auth = SyncAuth::new(config.sync_secret.clone());
    let app = build_app(AppState { job }, auth);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
