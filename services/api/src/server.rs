use crate::cli::ServeArgs;
use crate::infra::{seed_demo_catalog, AppState, OutboxNotifier};
use crate::routes::with_catalog_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use shelter::catalog::{EngagementService, InMemoryStore};
use shelter::config::AppConfig;
use shelter::error::AppError;
use shelter::telemetry;
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
    if args.no_seed {
        config.seed.demo_catalog = false;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(OutboxNotifier::default());
    let service = EngagementService::new(store, notifier);
    if config.seed.demo_catalog {
        seed_demo_catalog(&service)?;
    }

    let app = with_catalog_routes(Arc::new(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "shelter engagement service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
