//! Rule evaluation: resolve each rule's field, compare it with the rule operand, accumulate the
//! score, then map the total to a risk tier and lending decision.
//!
//! Evaluation is pure. It reads the applicant, the loan request and the rule slice, never
//! mutates them, and always produces a complete result: rules that cannot be evaluated are
//! skipped and recorded in the trace instead of aborting the run.

mod compare;
mod decision;
mod fields;
mod number;

pub use compare::{compare, comparison, Comparison, Incomparable, Operand, Operator};
pub use decision::{
    decide, LendingDecision, RiskTier, UnknownRiskTier, HIGH_RISK_CEILING, LOW_RISK_FLOOR,
};
pub use fields::{resolve, FieldKey, FieldValue, Unresolved, RATIO_SCALE};
pub use number::{ExactNumber, MalformedNumber};

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::domain::{ApplicantProfile, LoanRequest, RuleId, ScoringRule};

/// Score every application starts from before rule adjustments.
pub const BASE_SCORE: i32 = 500;

/// Final score, tier, decision and the names of the rules that matched, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub risk_score: i32,
    pub risk_level: RiskTier,
    pub decision: LendingDecision,
    pub explanation: Vec<String>,
}

/// What happened to a single rule during evaluation.
///
/// `NotComparable` is a non-match: the field resolved but the operator or operand does not
/// apply to its value. Only `Skipped` rules never reached a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    Matched { risk_points: i32 },
    NotMatched,
    NotComparable(Incomparable),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Unresolved(Unresolved),
    ScoreOverflow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unresolved(reason) => fmt::Display::fmt(reason, f),
            SkipReason::ScoreOverflow => f.write_str("risk score overflow"),
        }
    }
}

/// Per-rule audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTrace {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub field: String,
    pub outcome: RuleOutcome,
}

/// Evaluation result together with the outcome of every rule that was considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoringReport {
    pub result: EvaluationResult,
    pub trace: Vec<RuleTrace>,
}

impl ScoringReport {
    pub fn skipped(&self) -> impl Iterator<Item = &RuleTrace> {
        self.trace
            .iter()
            .filter(|entry| matches!(entry.outcome, RuleOutcome::Skipped(_)))
    }
}

/// Evaluate `rules` (already filtered to enabled rules and sorted by priority) in order.
pub fn evaluate(
    rules: &[ScoringRule],
    request: &LoanRequest,
    profile: &ApplicantProfile,
) -> EvaluationResult {
    evaluate_with_trace(rules, request, profile).result
}

pub fn evaluate_with_trace(
    rules: &[ScoringRule],
    request: &LoanRequest,
    profile: &ApplicantProfile,
) -> ScoringReport {
    info!(
        loan_id = %request.id,
        customer_id = %profile.id,
        base_score = BASE_SCORE,
        rules = rules.len(),
        "starting scoring evaluation"
    );

    let mut risk_score = BASE_SCORE;
    let mut explanation = Vec::new();
    let mut trace = Vec::with_capacity(rules.len());

    for rule in rules {
        let mut outcome = evaluate_rule(rule, request, profile);

        if let RuleOutcome::Matched { risk_points } = outcome {
            match risk_score.checked_add(risk_points) {
                Some(total) => {
                    risk_score = total;
                    explanation.push(rule.name.clone());
                    debug!(rule = %rule.name, risk_points, risk_score, "rule matched");
                }
                None => {
                    error!(
                        rule = %rule.name,
                        rule_id = rule.id.0,
                        risk_points,
                        risk_score,
                        "risk score overflow; skipping rule"
                    );
                    outcome = RuleOutcome::Skipped(SkipReason::ScoreOverflow);
                }
            }
        }

        trace.push(RuleTrace {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            field: rule.field.clone(),
            outcome,
        });
    }

    let (risk_level, decision) = decide(risk_score);

    info!(
        loan_id = %request.id,
        risk_score,
        risk_level = %risk_level,
        decision = %decision,
        "scoring evaluation completed"
    );

    ScoringReport {
        result: EvaluationResult {
            risk_score,
            risk_level,
            decision,
            explanation,
        },
        trace,
    }
}

fn evaluate_rule(
    rule: &ScoringRule,
    request: &LoanRequest,
    profile: &ApplicantProfile,
) -> RuleOutcome {
    let value = match resolve(profile, request, &rule.field) {
        Ok(value) => value,
        Err(reason) => {
            if reason.is_fault() {
                error!(
                    rule = %rule.name,
                    rule_id = rule.id.0,
                    field = %rule.field,
                    %reason,
                    "error resolving rule field; skipping rule"
                );
            } else {
                warn!(rule = %rule.name, field = %rule.field, %reason, "skipping rule");
            }
            return RuleOutcome::Skipped(SkipReason::Unresolved(reason));
        }
    };

    debug!(
        rule = %rule.name,
        field = %rule.field,
        operator = %rule.operator,
        rule_value = %rule.value,
        actual = %value,
        "comparing rule"
    );

    match comparison(Some(&value), &rule.operator, &rule.value) {
        Comparison::Matched => RuleOutcome::Matched {
            risk_points: rule.risk_points,
        },
        Comparison::NotMatched => RuleOutcome::NotMatched,
        Comparison::Incomparable(reason) => {
            warn!(
                rule = %rule.name,
                field = %rule.field,
                kind = value.kind(),
                %reason,
                "rule not comparable; treating as no match"
            );
            RuleOutcome::NotComparable(reason)
        }
    }
}
