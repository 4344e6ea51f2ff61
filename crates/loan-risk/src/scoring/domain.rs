use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub u64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for submitted loan applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoanId(pub u64);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for authored scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub u64);

/// Applicant attributes the rules can reference. Stored records may leave any attribute blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub id: CustomerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub annual_income: Option<Decimal>,
    #[serde(default)]
    pub credit_score: Option<i32>,
    #[serde(default)]
    pub employment_status: Option<String>,
    #[serde(default)]
    pub existing_debt: Option<Decimal>,
}

/// Customer payload accepted before an identifier has been assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub annual_income: Option<Decimal>,
    #[serde(default)]
    pub credit_score: Option<i32>,
    #[serde(default)]
    pub employment_status: Option<String>,
    #[serde(default)]
    pub existing_debt: Option<Decimal>,
}

impl NewCustomer {
    pub fn into_profile(self, id: CustomerId) -> ApplicantProfile {
        ApplicantProfile {
            id,
            name: self.name,
            age: self.age,
            annual_income: self.annual_income,
            credit_score: self.credit_score,
            employment_status: self.employment_status,
            existing_debt: self.existing_debt,
        }
    }
}

/// The loan being asked for. Scoring only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub id: LoanId,
    pub customer_id: CustomerId,
    #[serde(default)]
    pub loan_amount: Option<Decimal>,
    #[serde(default)]
    pub loan_purpose: Option<String>,
    #[serde(default)]
    pub requested_term_months: Option<i32>,
}

/// Externally authored scoring rule.
///
/// `value` stays textual until comparison time, when it is interpreted according to the type
/// of the field it is compared against. `name` doubles as the explanation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub id: RuleId,
    pub name: String,
    pub field: String,
    pub operator: String,
    pub value: String,
    pub risk_points: i32,
    pub priority: i32,
    pub enabled: bool,
}
