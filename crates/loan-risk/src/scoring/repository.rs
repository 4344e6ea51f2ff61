use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicantProfile, CustomerId, LoanId, LoanRequest};
use super::engine::{EvaluationResult, LendingDecision, RiskTier};

/// Stored loan application: the request as submitted plus the evaluation it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplicationRecord {
    pub request: LoanRequest,
    pub evaluation: EvaluationResult,
    pub created_at: DateTime<Utc>,
}

impl LoanApplicationRecord {
    pub fn response_view(&self) -> LoanApplicationResponse {
        LoanApplicationResponse {
            loan_id: self.request.id,
            risk_score: self.evaluation.risk_score,
            risk_level: self.evaluation.risk_level,
            decision: self.evaluation.decision,
            explanation: self.evaluation.explanation.clone(),
        }
    }
}

/// Outward representation of a scored application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplicationResponse {
    pub loan_id: LoanId,
    pub risk_score: i32,
    pub risk_level: RiskTier,
    pub decision: LendingDecision,
    pub explanation: Vec<String>,
}

/// Customer storage abstraction.
pub trait CustomerRepository: Send + Sync {
    fn insert(&self, profile: ApplicantProfile) -> Result<ApplicantProfile, RepositoryError>;
    fn fetch(&self, id: &CustomerId) -> Result<Option<ApplicantProfile>, RepositoryError>;
}

/// Loan application storage abstraction.
pub trait LoanApplicationRepository: Send + Sync {
    fn insert(
        &self,
        record: LoanApplicationRecord,
    ) -> Result<LoanApplicationRecord, RepositoryError>;
    fn fetch(&self, id: &LoanId) -> Result<Option<LoanApplicationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
