use crate::infra::load_rule_book;
use clap::Args;
use loan_risk::error::AppError;
use loan_risk::scoring::{
    evaluate_with_trace, ApplicantProfile, LoanRequest, RuleSource, ScoringReport,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON document with `profile` and `request` objects
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Rule catalog CSV (defaults to the built-in catalog)
    #[arg(long)]
    pub(crate) rules_csv: Option<PathBuf>,
    /// Include the per-rule outcome trace in the output
    #[arg(long)]
    pub(crate) trace: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreInput {
    pub(crate) profile: ApplicantProfile,
    pub(crate) request: LoanRequest,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreOutput {
    pub(crate) risk_score: i32,
    pub(crate) risk_level: String,
    pub(crate) decision: String,
    pub(crate) explanation: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) trace: Option<Vec<TraceLine>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TraceLine {
    pub(crate) rule: String,
    pub(crate) field: String,
    pub(crate) outcome: String,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        input,
        rules_csv,
        trace,
    } = args;

    let reader = BufReader::new(File::open(&input)?);
    let rendered = score_document(reader, rules_csv.as_deref(), trace)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn score_document<R: Read>(
    reader: R,
    rules_csv: Option<&std::path::Path>,
    include_trace: bool,
) -> Result<String, AppError> {
    let ScoreInput { profile, request } = serde_json::from_reader(reader)?;
    let rules = load_rule_book(rules_csv)?.active_rules()?;
    let report = evaluate_with_trace(&rules, &request, &profile);
    let output = render(report, include_trace);
    Ok(serde_json::to_string_pretty(&output)?)
}

fn render(report: ScoringReport, include_trace: bool) -> ScoreOutput {
    let ScoringReport { result, trace } = report;
    let trace = include_trace.then(|| {
        trace
            .into_iter()
            .map(|entry| TraceLine {
                outcome: describe(&entry.outcome),
                rule: entry.rule_name,
                field: entry.field,
            })
            .collect()
    });

    ScoreOutput {
        risk_score: result.risk_score,
        risk_level: result.risk_level.label().to_string(),
        decision: result.decision.label().to_string(),
        explanation: result.explanation,
        trace,
    }
}

fn describe(outcome: &loan_risk::scoring::RuleOutcome) -> String {
    use loan_risk::scoring::RuleOutcome;

    match outcome {
        RuleOutcome::Matched { risk_points } => format!("matched ({risk_points:+})"),
        RuleOutcome::NotMatched => "not matched".to_string(),
        RuleOutcome::NotComparable(reason) => format!("not matched: {reason}"),
        RuleOutcome::Skipped(reason) => format!("skipped: {reason}"),
    }
}
