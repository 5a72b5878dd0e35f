use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use rent_manager::analytics::{analytics_router, ComplianceSettings};
use rent_manager::portfolio::{portfolio_router, PortfolioStore};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Record management and reporting routes plus the operational probes.
pub(crate) fn with_portfolio_routes<S>(store: Arc<S>, settings: ComplianceSettings) -> Router
where
    S: PortfolioStore + 'static,
{
    portfolio_router(Arc::clone(&store))
        .merge(analytics_router(store, settings))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
