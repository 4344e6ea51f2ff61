use loan_risk::scoring::{
    ApplicantProfile, CustomerId, CustomerRepository, LoanApplicationRecord,
    LoanApplicationRepository, LoanId, RepositoryError, RuleBook, RuleCatalogError, RuleId,
    ScoringRule,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCustomerRepository {
    records: Arc<Mutex<HashMap<CustomerId, ApplicantProfile>>>,
}

impl CustomerRepository for InMemoryCustomerRepository {
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
pub(crate) struct InMemoryLoanApplicationRepository {
    records: Arc<Mutex<HashMap<LoanId, LoanApplicationRecord>>>,
}

impl LoanApplicationRepository for InMemoryLoanApplicationRepository {
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

/// Load the catalog at `path`, or fall back to the built-in catalog when none is configured.
pub(crate) fn load_rule_book(path: Option<&Path>) -> Result<RuleBook, RuleCatalogError> {
    match path {
        Some(path) => {
            let book = RuleBook::from_csv_path(path)?;
            info!(path = %path.display(), rules = book.rules().len(), "rule catalog loaded");
            Ok(book)
        }
        None => {
            let book = default_rule_book();
            info!(rules = book.rules().len(), "using built-in rule catalog");
            Ok(book)
        }
    }
}

pub(crate) fn default_rule_book() -> RuleBook {
    RuleBook::new(vec![
        rule(1, "Low credit score", "creditScore", "<", "600", -100, 1),
        rule(2, "Excellent credit score", "creditScore", ">=", "750", 100, 2),
        rule(3, "Unemployed applicant", "employmentStatus", "==", "Unemployed", -150, 3),
        rule(4, "High loan-to-income ratio", "loanRatio", ">", "0.5", -100, 4),
        rule(5, "High existing debt ratio", "existingDebtRatio", ">", "0.4", -75, 5),
        rule(6, "Young applicant", "age", "<", "21", -25, 6),
        rule(7, "Long repayment term", "requestedTermMonths", ">", "60", -25, 7),
        rule(8, "Stable employment", "employmentStatus", "==", "Employed", 75, 8),
        rule(9, "Modest loan ratio", "loanRatio", "<=", "0.2", 50, 9),
    ])
}

fn rule(
    id: u64,
    name: &str,
    field: &str,
    operator: &str,
    value: &str,
    risk_points: i32,
    priority: i32,
) -> ScoringRule {
    ScoringRule {
        id: RuleId(id),
        name: name.to_string(),
        field: field.to_string(),
        operator: operator.to_string(),
        value: value.to_string(),
        risk_points,
        priority,
        enabled: true,
    }
}
