use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::error;

/// Scores strictly below this are high risk.
pub const HIGH_RISK_CEILING: i32 = 450;
/// Scores at or above this are low risk.
pub const LOW_RISK_FLOOR: i32 = 650;

/// Coarse risk bucket derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const fn from_score(score: i32) -> Self {
        if score < HIGH_RISK_CEILING {
            RiskTier::High
        } else if score < LOW_RISK_FLOOR {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized risk tier '{0}'")]
pub struct UnknownRiskTier(pub String);

impl FromStr for RiskTier {
    type Err = UnknownRiskTier;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTier::Low),
            "medium" => Ok(RiskTier::Medium),
            "high" => Ok(RiskTier::High),
            _ => Err(UnknownRiskTier(raw.to_string())),
        }
    }
}

/// Lending outcome attached to a scored application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LendingDecision {
    #[serde(rename = "APPROVED")]
    Approve,
    #[serde(rename = "MANUAL_REVIEW")]
    ManualReview,
    #[serde(rename = "DECLINED")]
    Decline,
    /// The tier could not be mapped; indicates a programming or data error upstream.
    #[serde(rename = "ERROR")]
    MappingError,
}

impl LendingDecision {
    pub const fn for_tier(tier: RiskTier) -> Self {
        match tier {
            RiskTier::Low => LendingDecision::Approve,
            RiskTier::Medium => LendingDecision::ManualReview,
            RiskTier::High => LendingDecision::Decline,
        }
    }

    /// Map a tier held as text (e.g. a persisted label). Unknown labels never fail.
    pub fn from_tier_label(label: &str) -> Self {
        match label.parse::<RiskTier>() {
            Ok(tier) => Self::for_tier(tier),
            Err(err) => {
                error!(%err, "cannot map risk tier to a lending decision");
                LendingDecision::MappingError
            }
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LendingDecision::Approve => "APPROVED",
            LendingDecision::ManualReview => "MANUAL_REVIEW",
            LendingDecision::Decline => "DECLINED",
            LendingDecision::MappingError => "ERROR",
        }
    }
}

impl fmt::Display for LendingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score → tier → decision.
pub fn decide(score: i32) -> (RiskTier, LendingDecision) {
    let tier = RiskTier::from_score(score);
    (tier, LendingDecision::for_tier(tier))
}
