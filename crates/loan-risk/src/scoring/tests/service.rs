use std::sync::Arc;

use super::common::*;
use crate::scoring::domain::{CustomerId, LoanId};
use crate::scoring::engine::{LendingDecision, RiskTier};
use crate::scoring::repository::{LoanApplicationRepository, RepositoryError};
use crate::scoring::service::{LoanScoringService, LoanServiceError, ValidationError};

#[test]
fn create_customer_assigns_distinct_ids() {
    let (service, customers, _) = build_service();

    let first = service.create_customer(new_customer()).expect("customer stored");
    let second = service.create_customer(new_customer()).expect("customer stored");

    assert_ne!(first.id, second.id);
    assert_eq!(first.name.as_deref(), Some("Dana Whitfield"));
    assert_eq!(customers.records.lock().expect("mutex").len(), 2);
    assert_eq!(service.customer(&first.id).expect("customer found"), first);
}

#[test]
fn customer_lookup_propagates_not_found() {
    let (service, _, _) = build_service();

    match service.customer(&CustomerId(u64::MAX)) {
        Err(LoanServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn apply_scores_and_persists_the_application() {
    let (service, _, applications) = build_service();
    let customer = service.create_customer(new_customer()).expect("customer stored");

    let record = service
        .apply(application_for(customer.id))
        .expect("application scored");

    // Excellent credit (+80) and loan ratio 0.1412 (+100).
    assert_eq!(record.evaluation.risk_score, 680);
    assert_eq!(record.evaluation.risk_level, RiskTier::Low);
    assert_eq!(record.evaluation.decision, LendingDecision::Approve);
    assert_eq!(
        record.evaluation.explanation,
        vec!["Excellent credit".to_string(), "Low loan ratio".to_string()]
    );
    assert_eq!(record.request.customer_id, customer.id);

    let stored = applications
        .fetch(&record.request.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, record);
    assert_eq!(service.application(&record.request.id).expect("found"), record);
}

#[test]
fn apply_routes_unemployed_applicants_to_manual_review() {
    let (service, _, _) = build_service();
    let mut customer = new_customer();
    customer.employment_status = Some("Unemployed".to_string());
    customer.credit_score = Some(640);
    let customer = service.create_customer(customer).expect("customer stored");

    let record = service
        .apply(application_for(customer.id))
        .expect("application scored");

    // Low loan ratio (+100), unemployed (-150).
    assert_eq!(record.evaluation.risk_score, 450);
    assert_eq!(record.evaluation.decision, LendingDecision::ManualReview);
}

#[test]
fn apply_rejects_unknown_customers() {
    let (service, _, applications) = build_service();

    match service.apply(application_for(CustomerId(u64::MAX))) {
        Err(LoanServiceError::CustomerNotFound(id)) => assert_eq!(id, CustomerId(u64::MAX)),
        other => panic!("expected missing customer, got {other:?}"),
    }
    assert_eq!(applications.len(), 0);
}

#[test]
fn apply_validates_before_touching_storage() {
    let (service, _, applications) = build_service();
    let customer = service.create_customer(new_customer()).expect("customer stored");

    let mut zero_amount = application_for(customer.id);
    zero_amount.loan_amount = Some(dec("0.50"));
    let mut blank_purpose = application_for(customer.id);
    blank_purpose.loan_purpose = Some("   ".to_string());
    let mut no_term = application_for(customer.id);
    no_term.requested_term_months = None;
    let mut short_term = application_for(customer.id);
    short_term.requested_term_months = Some(0);

    let cases = [
        (zero_amount, ValidationError::LoanAmountNotPositive(dec("0.50"))),
        (blank_purpose, ValidationError::BlankLoanPurpose),
        (no_term, ValidationError::Missing("requested_term_months")),
        (short_term, ValidationError::TermTooShort(0)),
    ];

    for (application, expected) in cases {
        match service.apply(application) {
            Err(LoanServiceError::Validation(err)) => assert_eq!(err, expected),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
    assert_eq!(applications.len(), 0);
}

#[test]
fn apply_surfaces_repository_failures() {
    let customers = Arc::new(MemoryCustomers::default());
    let service = LoanScoringService::new(
        customers,
        Arc::new(UnavailableApplications),
        Arc::new(rule_book()),
    );
    let customer = service.create_customer(new_customer()).expect("customer stored");

    match service.apply(application_for(customer.id)) {
        Err(LoanServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
}

#[test]
fn application_lookup_propagates_not_found() {
    let (service, _, _) = build_service();

    assert!(matches!(
        service.application(&LoanId(u64::MAX)),
        Err(LoanServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn active_rules_are_exposed_in_priority_order() {
    let (service, _, _) = build_service();

    let rules = service.active_rules().expect("rules load");

    assert_eq!(rules.len(), 3);
    assert!(rules.windows(2).all(|pair| pair[0].priority <= pair[1].priority));
}

#[test]
fn response_view_mirrors_the_evaluation() {
    let (service, _, _) = build_service();
    let customer = service.create_customer(new_customer()).expect("customer stored");
    let record = service
        .apply(application_for(customer.id))
        .expect("application scored");

    let view = record.response_view();

    assert_eq!(view.loan_id, record.request.id);
    assert_eq!(view.risk_score, record.evaluation.risk_score);
    assert_eq!(view.explanation, record.evaluation.explanation);
}
