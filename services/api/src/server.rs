use crate::cli::ServeArgs;
use crate::infra::{
    load_rule_book, AppState, InMemoryCustomerRepository, InMemoryLoanApplicationRepository,
};
use crate::routes::with_loan_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::scoring::LoanScoringService;
use loan_risk::telemetry;
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

    let rule_book = load_rule_book(config.scoring.rules_csv.as_deref())?;
    let scoring_service = Arc::new(LoanScoringService::new(
        Arc::new(InMemoryCustomerRepository::default()),
        Arc::new(InMemoryLoanApplicationRepository::default()),
        Arc::new(rule_book),
    ));

    let app = with_loan_routes(scoring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan risk scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
