use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::domain::{RuleId, ScoringRule};
use super::repository::RepositoryError;

/// Supplies the rules an evaluation runs against.
pub trait RuleSource: Send + Sync {
    /// Enabled rules, ascending by priority.
    fn active_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError>;
}

/// Read-only, in-memory rule catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBook {
    rules: Vec<ScoringRule>,
}

impl RuleBook {
    pub fn new(rules: Vec<ScoringRule>) -> Self {
        Self { rules }
    }

    /// Every authored rule, enabled or not, in catalog order.
    pub fn rules(&self) -> &[ScoringRule] {
        &self.rules
    }

    /// Load a catalog with header `id,name,field,operator,value,risk_points,priority,enabled`.
    /// `enabled` may be left blank, which means enabled.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, RuleCatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rules = Vec::new();

        for record in csv_reader.deserialize::<RuleRow>() {
            rules.push(record?.into_rule());
        }

        Ok(Self { rules })
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, RuleCatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RuleCatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_reader(file)
    }
}

impl RuleSource for RuleBook {
    fn active_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError> {
        let mut active: Vec<ScoringRule> = self
            .rules
            .iter()
            .filter(|rule| rule.enabled)
            .cloned()
            .collect();
        active.sort_by_key(|rule| rule.priority);
        Ok(active)
    }
}

/// Failure loading a rule catalog.
#[derive(Debug, thiserror::Error)]
pub enum RuleCatalogError {
    #[error("unable to open rule catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed rule catalog: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    id: u64,
    name: String,
    field: String,
    operator: String,
    #[serde(default)]
    value: String,
    risk_points: i32,
    priority: i32,
    #[serde(default = "enabled_by_default", deserialize_with = "blank_as_enabled")]
    enabled: bool,
}

impl RuleRow {
    fn into_rule(self) -> ScoringRule {
        ScoringRule {
            id: RuleId(self.id),
            name: self.name,
            field: self.field,
            operator: self.operator,
            value: self.value,
            risk_points: self.risk_points,
            priority: self.priority,
            enabled: self.enabled,
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

fn blank_as_enabled<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(true),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(serde::de::Error::custom(format!(
                "invalid enabled flag '{value}'"
            ))),
        },
    }
}
