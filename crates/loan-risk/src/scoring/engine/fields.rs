use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::super::domain::{ApplicantProfile, LoanRequest};

/// Fractional digits kept on derived ratio fields.
pub const RATIO_SCALE: u32 = 4;

/// `10^RATIO_SCALE`.
const RATIO_UNIT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Closed vocabulary of fields a rule may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Age,
    AnnualIncome,
    CreditScore,
    EmploymentStatus,
    ExistingDebt,
    Name,
    LoanAmount,
    LoanPurpose,
    RequestedTermMonths,
    LoanRatio,
    ExistingDebtRatio,
}

impl FieldKey {
    pub const ALL: [FieldKey; 11] = [
        FieldKey::Age,
        FieldKey::AnnualIncome,
        FieldKey::CreditScore,
        FieldKey::EmploymentStatus,
        FieldKey::ExistingDebt,
        FieldKey::Name,
        FieldKey::LoanAmount,
        FieldKey::LoanPurpose,
        FieldKey::RequestedTermMonths,
        FieldKey::LoanRatio,
        FieldKey::ExistingDebtRatio,
    ];

    /// Name used by rule authors.
    pub const fn name(self) -> &'static str {
        match self {
            FieldKey::Age => "age",
            FieldKey::AnnualIncome => "annualIncome",
            FieldKey::CreditScore => "creditScore",
            FieldKey::EmploymentStatus => "employmentStatus",
            FieldKey::ExistingDebt => "existingDebt",
            FieldKey::Name => "name",
            FieldKey::LoanAmount => "loanAmount",
            FieldKey::LoanPurpose => "loanPurpose",
            FieldKey::RequestedTermMonths => "requestedTermMonths",
            FieldKey::LoanRatio => "loanRatio",
            FieldKey::ExistingDebtRatio => "existingDebtRatio",
        }
    }

    /// Case-insensitive lookup against the authored names.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(raw))
    }

    /// Read the field's current value from the applicant and the loan request.
    pub fn read(
        self,
        profile: &ApplicantProfile,
        request: &LoanRequest,
    ) -> Result<FieldValue, Unresolved> {
        let value = match self {
            FieldKey::Age => profile.age.map(FieldValue::from),
            FieldKey::AnnualIncome => profile.annual_income.map(FieldValue::Decimal),
            FieldKey::CreditScore => profile.credit_score.map(FieldValue::from),
            FieldKey::EmploymentStatus => profile.employment_status.clone().map(FieldValue::Text),
            FieldKey::ExistingDebt => profile.existing_debt.map(FieldValue::Decimal),
            FieldKey::Name => profile.name.clone().map(FieldValue::Text),
            FieldKey::LoanAmount => request.loan_amount.map(FieldValue::Decimal),
            FieldKey::LoanPurpose => request.loan_purpose.clone().map(FieldValue::Text),
            FieldKey::RequestedTermMonths => request.requested_term_months.map(FieldValue::from),
            FieldKey::LoanRatio => {
                return ratio(self, request.loan_amount, profile.annual_income);
            }
            FieldKey::ExistingDebtRatio => {
                return ratio(self, profile.existing_debt, profile.annual_income);
            }
        };

        value.ok_or(Unresolved::MissingValue(self))
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved field value, typed for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Decimal(Decimal),
    Text(String),
}

impl FieldValue {
    /// Exact numeric view; `None` for text.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Integer(value) => Some(Decimal::from(*value)),
            FieldValue::Decimal(value) => Some(*value),
            FieldValue::Text(_) => None,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            FieldValue::Integer(_) => "integer",
            FieldValue::Decimal(_) => "decimal",
            FieldValue::Text(_) => "text",
        }
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Decimal(value) => write!(f, "{value}"),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

/// Why a rule's field produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unresolved {
    BlankName,
    UnknownField(String),
    MissingValue(FieldKey),
    UndefinedRatio(FieldKey),
    RatioOverflow(FieldKey),
}

impl Unresolved {
    /// Arithmetic failures are faults worth surfacing; the rest are ordinary data gaps.
    pub const fn is_fault(&self) -> bool {
        matches!(self, Unresolved::RatioOverflow(_))
    }
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::BlankName => f.write_str("field name is blank"),
            Unresolved::UnknownField(name) => write!(f, "unknown field '{name}'"),
            Unresolved::MissingValue(key) => write!(f, "field '{key}' has no value"),
            Unresolved::UndefinedRatio(key) => write!(
                f,
                "cannot derive '{key}': operand missing or annual income not positive"
            ),
            Unresolved::RatioOverflow(key) => write!(f, "decimal overflow deriving '{key}'"),
        }
    }
}

/// Resolve a rule's field name against the applicant and the loan request.
pub fn resolve(
    profile: &ApplicantProfile,
    request: &LoanRequest,
    field: &str,
) -> Result<FieldValue, Unresolved> {
    if field.trim().is_empty() {
        return Err(Unresolved::BlankName);
    }

    let key = FieldKey::parse(field).ok_or_else(|| Unresolved::UnknownField(field.to_string()))?;
    key.read(profile, request)
}

fn ratio(
    key: FieldKey,
    dividend: Option<Decimal>,
    divisor: Option<Decimal>,
) -> Result<FieldValue, Unresolved> {
    let (Some(dividend), Some(divisor)) = (dividend, divisor) else {
        return Err(Unresolved::UndefinedRatio(key));
    };
    if divisor <= Decimal::ZERO {
        return Err(Unresolved::UndefinedRatio(key));
    }

    let overflow = || Unresolved::RatioOverflow(key);

    // Whole ten-thousandths and an exact remainder; the quotient is rounded only once,
    // half away from zero.
    let scaled = dividend.checked_mul(RATIO_UNIT).ok_or_else(overflow)?;
    let remainder = scaled.checked_rem(divisor).ok_or_else(overflow)?;
    let mut units = scaled
        .checked_sub(remainder)
        .and_then(|whole| whole.checked_div(divisor))
        .ok_or_else(overflow)?;
    if remainder.abs() >= divisor - remainder.abs() {
        let step = if scaled.is_sign_negative() {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ONE
        };
        units = units.checked_add(step).ok_or_else(overflow)?;
    }

    let mut quotient = units.checked_div(RATIO_UNIT).ok_or_else(overflow)?;
    quotient.rescale(RATIO_SCALE);

    Ok(FieldValue::Decimal(quotient))
}
