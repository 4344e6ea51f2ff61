use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use super::fields::FieldValue;
use super::number::ExactNumber;

/// Comparison operators a rule may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "!=")]
    NotEqual,
}

impl Operator {
    /// Exact symbol match; anything else is not an operator.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "<" => Some(Operator::LessThan),
            ">" => Some(Operator::GreaterThan),
            "==" => Some(Operator::Equal),
            "<=" => Some(Operator::LessOrEqual),
            ">=" => Some(Operator::GreaterOrEqual),
            "!=" => Some(Operator::NotEqual),
            _ => None,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::Equal => "==",
            Operator::LessOrEqual => "<=",
            Operator::GreaterOrEqual => ">=",
            Operator::NotEqual => "!=",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Operator::LessThan => ordering.is_lt(),
            Operator::GreaterThan => ordering.is_gt(),
            Operator::Equal => ordering.is_eq(),
            Operator::LessOrEqual => ordering.is_le(),
            Operator::GreaterOrEqual => ordering.is_ge(),
            Operator::NotEqual => ordering.is_ne(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A rule operand interpreted against the type of the value it is compared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Numeric(ExactNumber),
    Text(String),
    Unparseable(String),
}

impl Operand {
    pub fn interpret(raw: &str, value: &FieldValue) -> Self {
        let trimmed = raw.trim();
        match value {
            FieldValue::Text(_) => Operand::Text(trimmed.to_string()),
            FieldValue::Integer(_) | FieldValue::Decimal(_) => match trimmed.parse() {
                Ok(number) => Operand::Numeric(number),
                Err(_) => Operand::Unparseable(raw.to_string()),
            },
        }
    }
}

/// Detailed comparison outcome; [`compare`] collapses it to a boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Matched,
    NotMatched,
    Incomparable(Incomparable),
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        matches!(self, Comparison::Matched)
    }

    fn from_bool(matched: bool) -> Self {
        if matched {
            Comparison::Matched
        } else {
            Comparison::NotMatched
        }
    }
}

/// Why a value and a rule operand could not be compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Incomparable {
    MissingValue,
    UnknownOperator(String),
    UnsupportedTextOperator(Operator),
    UnparseableOperand(String),
}

impl fmt::Display for Incomparable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Incomparable::MissingValue => f.write_str("no value to compare"),
            Incomparable::UnknownOperator(raw) => write!(f, "unknown operator '{raw}'"),
            Incomparable::UnsupportedTextOperator(operator) => {
                write!(f, "operator '{operator}' is not supported for text values")
            }
            Incomparable::UnparseableOperand(raw) => {
                write!(f, "operand '{raw}' is not a number")
            }
        }
    }
}

/// Compare a resolved value with a rule's operator and textual operand.
pub fn comparison(value: Option<&FieldValue>, operator: &str, operand: &str) -> Comparison {
    let Some(value) = value else {
        return Comparison::Incomparable(Incomparable::MissingValue);
    };
    let Some(operator) = Operator::parse(operator) else {
        return Comparison::Incomparable(Incomparable::UnknownOperator(operator.to_string()));
    };

    match (value, Operand::interpret(operand, value)) {
        (FieldValue::Text(actual), Operand::Text(expected)) => {
            let equal = actual.to_lowercase() == expected.to_lowercase();
            match operator {
                Operator::Equal => Comparison::from_bool(equal),
                Operator::NotEqual => Comparison::from_bool(!equal),
                other => Comparison::Incomparable(Incomparable::UnsupportedTextOperator(other)),
            }
        }
        (_, Operand::Numeric(expected)) => match value.as_decimal() {
            Some(actual) => {
                Comparison::from_bool(operator.holds(ExactNumber::from(actual).cmp(&expected)))
            }
            None => Comparison::NotMatched,
        },
        (_, Operand::Unparseable(raw)) => {
            Comparison::Incomparable(Incomparable::UnparseableOperand(raw))
        }
        (_, Operand::Text(_)) => Comparison::NotMatched,
    }
}

/// Boolean view of [`comparison`]: anything other than a clean match is `false`.
pub fn compare(value: Option<&FieldValue>, operator: &str, operand: &str) -> bool {
    comparison(value, operator, operand).is_match()
}
