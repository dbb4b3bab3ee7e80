use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::cache::MemoryCache;
use crate::config::ServerConfig;
use crate::forecast_resolver::ForecastResolver;

/// Full application router, API nested under `/api`
pub fn app(resolver: ForecastResolver) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(resolver))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Periodically evict expired forecasts. Reads still expire lazily without it.
pub fn spawn_sweeper(cache: Arc<MemoryCache>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            cache.purge_expired().await;
        }
    })
}

pub async fn run(
    config: &ServerConfig,
    resolver: ForecastResolver,
    cache: Arc<MemoryCache>,
) -> anyhow::Result<()> {
    if config.sweep_interval_secs > 0 {
        spawn_sweeper(cache, Duration::from_secs(config.sweep_interval_secs));
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app(resolver))
        .await
        .context("Web server stopped unexpectedly")?;
    Ok(())
}
