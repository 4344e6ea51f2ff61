use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{CustomerId, LoanId, NewCustomer};
use super::repository::{CustomerRepository, LoanApplicationRepository, RepositoryError};
use super::rules::RuleSource;
use super::service::{LoanApplicationRequest, LoanScoringService, LoanServiceError};

type SharedService<C, L, S> = Arc<LoanScoringService<C, L, S>>;

/// Router builder exposing customer, loan application and rule endpoints.
pub fn loan_router<C, L, S>(service: SharedService<C, L, S>) -> Router
where
    C: CustomerRepository + 'static,
    L: LoanApplicationRepository + 'static,
    S: RuleSource + 'static,
{
    Router::new()
        .route("/customers", post(create_customer_handler::<C, L, S>))
        .route(
            "/customers/:customer_id",
            get(customer_handler::<C, L, S>),
        )
        .route("/loan/apply", post(apply_handler::<C, L, S>))
        .route("/loan/:loan_id", get(application_handler::<C, L, S>))
        .route("/rules", get(rules_handler::<C, L, S>))
        .with_state(service)
}

pub(crate) async fn create_customer_handler<C, L, S>(
    State(service): State<SharedService<C, L, S>>,
    axum::Json(customer): axum::Json<NewCustomer>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanApplicationRepository + 'static,
    S: RuleSource + 'static,
{
    match service.create_customer(customer) {
        Ok(profile) => (StatusCode::CREATED, axum::Json(profile)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn customer_handler<C, L, S>(
    State(service): State<SharedService<C, L, S>>,
    Path(customer_id): Path<u64>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanApplicationRepository + 'static,
    S: RuleSource + 'static,
{
    match service.customer(&CustomerId(customer_id)) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn apply_handler<C, L, S>(
    State(service): State<SharedService<C, L, S>>,
    axum::Json(application): axum::Json<LoanApplicationRequest>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanApplicationRepository + 'static,
    S: RuleSource + 'static,
{
    match service.apply(application) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.response_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn application_handler<C, L, S>(
    State(service): State<SharedService<C, L, S>>,
    Path(loan_id): Path<u64>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanApplicationRepository + 'static,
    S: RuleSource + 'static,
{
    match service.application(&LoanId(loan_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.response_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn rules_handler<C, L, S>(State(service): State<SharedService<C, L, S>>) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanApplicationRepository + 'static,
    S: RuleSource + 'static,
{
    match service.active_rules() {
        Ok(rules) => (StatusCode::OK, axum::Json(rules)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: LoanServiceError) -> Response {
    let status = match &err {
        LoanServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LoanServiceError::CustomerNotFound(_)
        | LoanServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LoanServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LoanServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
