use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::scoring::domain::{
    ApplicantProfile, CustomerId, LoanId, LoanRequest, NewCustomer, RuleId, ScoringRule,
};
use crate::scoring::repository::{
    CustomerRepository, LoanApplicationRecord, LoanApplicationRepository, RepositoryError,
};
use crate::scoring::rules::RuleBook;
use crate::scoring::service::{LoanApplicationRequest, LoanScoringService};
use crate::scoring::loan_router;

pub(super) fn dec(raw: &str) -> Decimal {
    raw.parse().expect("valid decimal literal")
}

pub(super) fn profile() -> ApplicantProfile {
    ApplicantProfile {
        id: CustomerId(1),
        name: Some("Test Customer".to_string()),
        age: Some(35),
        annual_income: Some(dec("60000.00")),
        credit_score: Some(700),
        employment_status: Some("Employed".to_string()),
        existing_debt: Some(dec("5000.00")),
    }
}

pub(super) fn request() -> LoanRequest {
    LoanRequest {
        id: LoanId(1),
        customer_id: CustomerId(1),
        loan_amount: Some(dec("10000.00")),
        loan_purpose: Some("Car Purchase".to_string()),
        requested_term_months: Some(36),
    }
}

pub(super) fn rule(
    id: u64,
    name: &str,
    field: &str,
    operator: &str,
    value: &str,
    risk_points: i32,
) -> ScoringRule {
    ScoringRule {
        id: RuleId(id),
        name: name.to_string(),
        field: field.to_string(),
        operator: operator.to_string(),
        value: value.to_string(),
        risk_points,
        priority: id as i32,
        enabled: true,
    }
}

pub(super) fn new_customer() -> NewCustomer {
    NewCustomer {
        name: Some("Dana Whitfield".to_string()),
        age: Some(42),
        annual_income: Some(dec("85000.00")),
        credit_score: Some(780),
        employment_status: Some("Employed".to_string()),
        existing_debt: Some(dec("4000.00")),
    }
}

pub(super) fn application_for(customer_id: CustomerId) -> LoanApplicationRequest {
    LoanApplicationRequest {
        customer_id,
        loan_amount: Some(dec("12000")),
        loan_purpose: Some("Home Renovation".to_string()),
        requested_term_months: Some(48),
    }
}

/// Small catalog: one approval booster, one penalty, one disabled rule.
pub(super) fn rule_book() -> RuleBook {
    let mut disabled = rule(3, "Disabled penalty", "age", ">", "0", -400);
    disabled.enabled = false;
    RuleBook::new(vec![
        rule(2, "Low loan ratio", "loanRatio", "<", "0.2", 100),
        rule(1, "Excellent credit", "creditScore", ">=", "750", 80),
        disabled,
        rule(4, "Unemployed", "employmentStatus", "==", "unemployed", -150),
    ])
}

pub(super) type TestService = LoanScoringService<MemoryCustomers, MemoryApplications, RuleBook>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryCustomers>,
    Arc<MemoryApplications>,
) {
    let customers = Arc::new(MemoryCustomers::default());
    let applications = Arc::new(MemoryApplications::default());
    let service = LoanScoringService::new(
        customers.clone(),
        applications.clone(),
        Arc::new(rule_book()),
    );
    (service, customers, applications)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    loan_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryCustomers {
    pub(super) records: Arc<Mutex<HashMap<CustomerId, ApplicantProfile>>>,
}

impl CustomerRepository for MemoryCustomers {
    fn insert(&self, profile: ApplicantProfile) -> Result<ApplicantProfile, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&profile.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(profile.id, profile.clone());
        Ok(profile)
    }

    fn fetch(&self, id: &CustomerId) -> Result<Option<ApplicantProfile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplications {
    pub(super) records: Arc<Mutex<HashMap<LoanId, LoanApplicationRecord>>>,
}

impl MemoryApplications {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl LoanApplicationRepository for MemoryApplications {
    fn insert(
        &self,
        record: LoanApplicationRecord,
    ) -> Result<LoanApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.request.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &LoanId) -> Result<Option<LoanApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableApplications;

impl LoanApplicationRepository for UnavailableApplications {
    fn insert(
        &self,
        _record: LoanApplicationRecord,
    ) -> Result<LoanApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &LoanId) -> Result<Option<LoanApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
