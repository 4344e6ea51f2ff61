//! Loan application risk scoring: customer and application intake, the rule catalog, and the
//! rule evaluation engine that turns an application into a score, risk tier and decision.

pub mod domain;
pub mod engine;
pub mod repository;
pub mod router;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantProfile, CustomerId, LoanId, LoanRequest, NewCustomer, RuleId, ScoringRule,
};
pub use engine::{
    evaluate, evaluate_with_trace, EvaluationResult, LendingDecision, RiskTier, RuleOutcome,
    RuleTrace, ScoringReport, SkipReason, BASE_SCORE,
};
pub use repository::{
    CustomerRepository, LoanApplicationRecord, LoanApplicationRepository,
    LoanApplicationResponse, RepositoryError,
};
pub use router::loan_router;
pub use rules::{RuleBook, RuleCatalogError, RuleSource};
pub use service::{LoanApplicationRequest, LoanScoringService, LoanServiceError, ValidationError};
