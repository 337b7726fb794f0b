use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryLoanLedger, InMemorySessionStore};
use crate::routes::api_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use karma_passport::config::AppConfig;
use karma_passport::data::MockDataSource;
use karma_passport::error::AppError;
use karma_passport::loans::LoanApplicationService;
use karma_passport::session::SessionService;
use karma_passport::telemetry;
use std::path::PathBuf;
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

    let data = Arc::new(load_data_source(args.tasks_csv.take())?);
    let sessions = Arc::new(SessionService::new(
        Arc::new(InMemorySessionStore::default()),
        config.session.ttl(),
    ));
    let loans = Arc::new(LoanApplicationService::new(
        data.clone(),
        Arc::new(InMemoryLoanLedger::default()),
    ));

    let app = api_router(sessions, data, loans)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = config.environment.label(),
        %addr,
        session_ttl_minutes = config.session.ttl_minutes,
        "karma passport api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn load_data_source(tasks_csv: Option<PathBuf>) -> Result<MockDataSource, AppError> {
    match tasks_csv {
        Some(path) => {
            info!(path = %path.display(), "loading tasks from CSV export");
            Ok(MockDataSource::from_task_csv(path)?)
        }
        None => Ok(MockDataSource::default()),
    }
}
