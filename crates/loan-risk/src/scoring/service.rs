use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{ApplicantProfile, CustomerId, LoanId, LoanRequest, NewCustomer, ScoringRule};
use super::engine;
use super::repository::{
    CustomerRepository, LoanApplicationRecord, LoanApplicationRepository, RepositoryError,
};
use super::rules::RuleSource;

/// Incoming loan application before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplicationRequest {
    pub customer_id: CustomerId,
    #[serde(default)]
    pub loan_amount: Option<Decimal>,
    #[serde(default)]
    pub loan_purpose: Option<String>,
    #[serde(default)]
    pub requested_term_months: Option<i32>,
}

impl LoanApplicationRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.loan_amount {
            None => return Err(ValidationError::Missing("loan_amount")),
            Some(amount) if amount < Decimal::ONE => {
                return Err(ValidationError::LoanAmountNotPositive(amount))
            }
            Some(_) => {}
        }

        match self.loan_purpose.as_deref() {
            None => return Err(ValidationError::Missing("loan_purpose")),
            Some(purpose) if purpose.trim().is_empty() => {
                return Err(ValidationError::BlankLoanPurpose)
            }
            Some(_) => {}
        }

        match self.requested_term_months {
            None => Err(ValidationError::Missing("requested_term_months")),
            Some(months) if months < 1 => Err(ValidationError::TermTooShort(months)),
            Some(_) => Ok(()),
        }
    }

    fn into_loan_request(self, id: LoanId) -> LoanRequest {
        LoanRequest {
            id,
            customer_id: self.customer_id,
            loan_amount: self.loan_amount,
            loan_purpose: self.loan_purpose,
            requested_term_months: self.requested_term_months,
        }
    }
}

/// Rejected loan application payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("loan amount must be positive (got {0})")]
    LoanAmountNotPositive(Decimal),
    #[error("loan purpose cannot be blank")]
    BlankLoanPurpose,
    #[error("requested term must be at least 1 month (got {0})")]
    TermTooShort(i32),
}

/// Service composing customer storage, application storage, the rule catalog and the engine.
pub struct LoanScoringService<C, L, S> {
    customers: Arc<C>,
    applications: Arc<L>,
    rules: Arc<S>,
}

static CUSTOMER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static LOAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_customer_id() -> CustomerId {
    CustomerId(CUSTOMER_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_loan_id() -> LoanId {
    LoanId(LOAN_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

impl<C, L, S> LoanScoringService<C, L, S>
where
    C: CustomerRepository + 'static,
    L: LoanApplicationRepository + 'static,
    S: RuleSource + 'static,
{
    pub fn new(customers: Arc<C>, applications: Arc<L>, rules: Arc<S>) -> Self {
        Self {
            customers,
            applications,
            rules,
        }
    }

    /// Store a new customer under a freshly assigned id.
    pub fn create_customer(
        &self,
        customer: NewCustomer,
    ) -> Result<ApplicantProfile, LoanServiceError> {
        let profile = customer.into_profile(next_customer_id());
        let stored = self.customers.insert(profile)?;
        info!(customer_id = %stored.id, "customer created");
        Ok(stored)
    }

    pub fn customer(&self, id: &CustomerId) -> Result<ApplicantProfile, LoanServiceError> {
        let profile = self
            .customers
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(profile)
    }

    /// Validate, score and persist a loan application.
    pub fn apply(
        &self,
        application: LoanApplicationRequest,
    ) -> Result<LoanApplicationRecord, LoanServiceError> {
        application.validate()?;

        let customer_id = application.customer_id;
        let profile = self
            .customers
            .fetch(&customer_id)?
            .ok_or(LoanServiceError::CustomerNotFound(customer_id))?;

        let request = application.into_loan_request(next_loan_id());
        let rules = self.rules.active_rules()?;
        let evaluation = engine::evaluate(&rules, &request, &profile);

        let record = LoanApplicationRecord {
            request,
            evaluation,
            created_at: Utc::now(),
        };

        let stored = self.applications.insert(record)?;
        Ok(stored)
    }

    pub fn application(&self, id: &LoanId) -> Result<LoanApplicationRecord, LoanServiceError> {
        let record = self
            .applications
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Enabled rules in the order evaluation applies them.
    pub fn active_rules(&self) -> Result<Vec<ScoringRule>, LoanServiceError> {
        Ok(self.rules.active_rules()?)
    }
}

/// Error raised by the loan scoring service.
#[derive(Debug, thiserror::Error)]
pub enum LoanServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
