use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;

/// A decimal number held as significant digits and a decimal exponent, never rounded.
///
/// Rule operands may carry more precision, or a larger or smaller magnitude, than `Decimal`
/// can represent; comparing through this type keeps those comparisons exact.
/// The value is `0.d1d2..dn * 10^exponent`; zero has no digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactNumber {
    negative: bool,
    digits: Vec<u8>,
    exponent: i64,
}

impl ExactNumber {
    fn from_digits(negative: bool, digits: Vec<u8>, exponent: i64) -> Self {
        let leading = digits.iter().take_while(|digit| **digit == 0).count();
        let mut significant = digits[leading..].to_vec();
        while significant.last() == Some(&0) {
            significant.pop();
        }

        if significant.is_empty() {
            return Self {
                negative: false,
                digits: Vec::new(),
                exponent: 0,
            };
        }

        Self {
            negative,
            digits: significant,
            exponent: exponent - leading as i64,
        }
    }

    fn signum(&self) -> i8 {
        match (self.digits.is_empty(), self.negative) {
            (true, _) => 0,
            (false, true) => -1,
            (false, false) => 1,
        }
    }
}

impl From<Decimal> for ExactNumber {
    fn from(value: Decimal) -> Self {
        let mantissa = value.mantissa().unsigned_abs().to_string();
        let exponent = mantissa.len() as i64 - i64::from(value.scale());
        let digits = mantissa.bytes().map(|byte| byte - b'0').collect();
        Self::from_digits(value.is_sign_negative(), digits, exponent)
    }
}

/// Accepts an optional sign, digits with at most one decimal point, and an optional
/// `e`/`E` exponent. Nothing else: no separators, no whitespace, no named values.
impl FromStr for ExactNumber {
    type Err = MalformedNumber;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedNumber(raw.to_string());

        let (negative, unsigned) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };

        let (significand, exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
            Some(at) => {
                let exponent = parse_exponent(&unsigned[at + 1..]).ok_or_else(malformed)?;
                (&unsigned[..at], exponent)
            }
            None => (unsigned, 0),
        };

        let (integer, fraction) = significand.split_once('.').unwrap_or((significand, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(malformed());
        }

        let mut digits = Vec::with_capacity(integer.len() + fraction.len());
        for byte in integer.bytes().chain(fraction.bytes()) {
            if !byte.is_ascii_digit() {
                return Err(malformed());
            }
            digits.push(byte - b'0');
        }

        Ok(Self::from_digits(
            negative,
            digits,
            integer.len() as i64 + exponent,
        ))
    }
}

fn parse_exponent(raw: &str) -> Option<i64> {
    let unsigned = raw.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(raw);
    if unsigned.is_empty() || !unsigned.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i32>().ok().map(i64::from)
}

impl Ord for ExactNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_sign = self.signum().cmp(&other.signum());
        if by_sign != Ordering::Equal || self.digits.is_empty() {
            return by_sign;
        }

        let magnitude = self
            .exponent
            .cmp(&other.exponent)
            .then_with(|| self.digits.cmp(&other.digits));

        if self.negative {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl PartialOrd for ExactNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a decimal number")]
pub struct MalformedNumber(pub String);
