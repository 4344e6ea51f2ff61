use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::scoring::router::{apply_handler, application_handler, customer_handler};
use crate::scoring::service::LoanScoringService;
use crate::scoring::RuleBook;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serializable")))
        .expect("request builds")
}

#[tokio::test]
async fn create_customer_route_returns_created_profile() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/customers",
            json!({
                "name": "Jordan Reyes",
                "age": 29,
                "annual_income": "48000.00",
                "credit_score": 690,
                "employment_status": "Employed",
                "existing_debt": "1200.00"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert!(payload.get("id").and_then(Value::as_u64).is_some());
    assert_eq!(payload.get("credit_score"), Some(&json!(690)));
}

#[tokio::test]
async fn apply_route_returns_scored_response() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let customer = service.create_customer(new_customer()).expect("customer stored");
    let router = crate::scoring::loan_router(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/loan/apply",
            json!({
                "customer_id": customer.id.0,
                "loan_amount": "12000",
                "loan_purpose": "Home Renovation",
                "requested_term_months": 48
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("risk_score"), Some(&json!(680)));
    assert_eq!(payload.get("risk_level"), Some(&json!("Low")));
    assert_eq!(payload.get("decision"), Some(&json!("APPROVED")));
    assert_eq!(
        payload.get("explanation"),
        Some(&json!(["Excellent credit", "Low loan ratio"]))
    );
}

#[tokio::test]
async fn apply_handler_maps_missing_customer_to_not_found() {
    let (service, _, _) = build_service();

    let response = apply_handler(
        State(Arc::new(service)),
        axum::Json(application_for(crate::scoring::CustomerId(u64::MAX))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("not found"));
}

#[tokio::test]
async fn apply_handler_maps_validation_errors_to_unprocessable() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let customer = service.create_customer(new_customer()).expect("customer stored");
    let mut application = application_for(customer.id);
    application.loan_purpose = None;

    let response = apply_handler(State(service), axum::Json(application)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn apply_handler_maps_storage_outage_to_internal_error() {
    let customers = Arc::new(MemoryCustomers::default());
    let service = Arc::new(LoanScoringService::new(
        customers,
        Arc::new(UnavailableApplications),
        Arc::new(RuleBook::default()),
    ));
    let customer = service.create_customer(new_customer()).expect("customer stored");

    let response = apply_handler(State(service), axum::Json(application_for(customer.id))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn lookups_return_not_found_for_unknown_ids() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);

    let customer = customer_handler(State(service.clone()), Path(u64::MAX)).await;
    let application = application_handler(State(service), Path(u64::MAX)).await;

    assert_eq!(customer.status(), StatusCode::NOT_FOUND);
    assert_eq!(application.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stored_application_is_retrievable_by_id() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let customer = service.create_customer(new_customer()).expect("customer stored");
    let record = service
        .apply(application_for(customer.id))
        .expect("application scored");
    let router = crate::scoring::loan_router(service);

    let response = router
        .oneshot(
            Request::get(format!("/loan/{}", record.request.id.0))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("loan_id"), Some(&json!(record.request.id.0)));
    assert_eq!(payload.get("decision"), Some(&json!("APPROVED")));
}

#[tokio::test]
async fn rules_route_lists_active_rules() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/rules")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let names: Vec<&str> = payload
        .as_array()
        .expect("array payload")
        .iter()
        .filter_map(|rule| rule.get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(names, vec!["Excellent credit", "Low loan ratio", "Unemployed"]);
}
