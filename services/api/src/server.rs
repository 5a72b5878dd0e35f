use crate::cli::ServeArgs;
use crate::infra::{seed_demo_portfolio, AppState};
use crate::routes::with_portfolio_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use rent_manager::config::AppConfig;
use rent_manager::error::AppError;
use rent_manager::portfolio::InMemoryPortfolioStore;
use rent_manager::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryPortfolioStore::new());
    if args.seed_demo {
        seed_demo_portfolio(store.as_ref(), Local::now().date_naive())?;
    }

    let app = with_portfolio_routes(store, config.compliance.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        area_median_income = config.compliance.area_median_income,
        "rent manager ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
