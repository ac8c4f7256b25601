//! Policy configuration: the operator-selected risk posture.
//!
//! A [`PolicyConfig`] is plain data. It is validated once, before any decision
//! is attempted, and an invalid configuration is a fatal error rather than
//! something the engine clamps or works around.

mod flat;

pub use flat::FlatKey;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TightenError};
use crate::model::DataCategory;

/// How permissive the engine is when evidence supports tightening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskMode {
    /// Never tightens on data evidence alone.
    Cautious,
    /// Tightens when a full-sample probe is clean.
    EvidenceGated,
    /// Also tightens on partial samples and undeclared intent.
    Aggressive,
}

impl RiskMode {
    pub fn label(&self) -> &'static str {
        match self {
            RiskMode::Cautious => "cautious",
            RiskMode::EvidenceGated => "evidence_gated",
            RiskMode::Aggressive => "aggressive",
        }
    }

    pub fn all() -> &'static [RiskMode] {
        &[RiskMode::Cautious, RiskMode::EvidenceGated, RiskMode::Aggressive]
    }
}

impl fmt::Display for RiskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskMode {
    type Err = TightenError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "cautious" => Ok(RiskMode::Cautious),
            "evidencegated" | "gated" => Ok(RiskMode::EvidenceGated),
            "aggressive" => Ok(RiskMode::Aggressive),
            _ => Err(TightenError::Config(format!("unknown risk mode '{}'", s))),
        }
    }
}

/// Foreign key creation scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForeignKeyOptions {
    pub enable_creation: bool,
    pub allow_cross_schema: bool,
    pub allow_cross_catalog: bool,
    /// Treat a relationship without a declared delete rule as Ignore.
    pub treat_missing_delete_rule_as_ignore: bool,
    /// Allow WITH NOCHECK creation when only a partial sample is clean.
    pub allow_no_check_creation: bool,
}

impl Default for ForeignKeyOptions {
    fn default() -> Self {
        Self {
            enable_creation: true,
            allow_cross_schema: false,
            allow_cross_catalog: false,
            treat_missing_delete_rule_as_ignore: true,
            allow_no_check_creation: false,
        }
    }
}

/// Uniqueness enforcement scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniquenessOptions {
    pub enforce_single_column: bool,
    pub enforce_multi_column: bool,
}

impl Default for UniquenessOptions {
    fn default() -> Self {
        Self {
            enforce_single_column: true,
            enforce_multi_column: true,
        }
    }
}

impl UniquenessOptions {
    /// Whether a candidate of this arity may be enforced.
    pub fn allows(&self, composite: bool) -> bool {
        if composite {
            self.enforce_multi_column
        } else {
            self.enforce_single_column
        }
    }
}

/// Literal backfill values per data category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sentinels {
    pub numeric: String,
    pub text: String,
    pub temporal: String,
    pub boolean: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            numeric: "0".to_string(),
            text: "''".to_string(),
            temporal: "'1900-01-01'".to_string(),
            boolean: "0".to_string(),
        }
    }
}

impl Sentinels {
    /// Sentinel for a category. `Other` has none.
    pub fn for_category(&self, category: DataCategory) -> Option<&str> {
        match category {
            DataCategory::Numeric => Some(self.numeric.as_str()),
            DataCategory::Text => Some(self.text.as_str()),
            DataCategory::Temporal => Some(self.temporal.as_str()),
            DataCategory::Boolean => Some(self.boolean.as_str()),
            DataCategory::Other => None,
        }
    }
}

/// Pre-deployment remediation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationOptions {
    pub generate_pre_scripts: bool,
    /// Largest number of rows a default-value backfill may touch.
    pub max_rows_default_backfill: u64,
    pub sentinels: Sentinels,
}

impl Default for RemediationOptions {
    fn default() -> Self {
        Self {
            generate_pre_scripts: true,
            max_rows_default_backfill: 100_000,
            sentinels: Sentinels::default(),
        }
    }
}

/// Complete tightening policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub mode: RiskMode,
    /// Fraction of sampled rows allowed to be NULL while still offering a
    /// remediate-then-tighten plan. In [0, 1].
    pub null_budget: f64,
    pub foreign_keys: ForeignKeyOptions,
    pub uniqueness: UniquenessOptions,
    pub remediation: RemediationOptions,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::default_policy()
    }
}

impl PolicyConfig {
    /// The documented default policy. A fresh value on every call.
    pub fn default_policy() -> Self {
        Self {
            mode: RiskMode::EvidenceGated,
            null_budget: 0.0,
            foreign_keys: ForeignKeyOptions::default(),
            uniqueness: UniquenessOptions::default(),
            remediation: RemediationOptions::default(),
        }
    }

    pub fn with_mode(mut self, mode: RiskMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_null_budget(mut self, budget: f64) -> Self {
        self.null_budget = budget;
        self
    }

    pub fn with_foreign_keys(mut self, options: ForeignKeyOptions) -> Self {
        self.foreign_keys = options;
        self
    }

    pub fn with_uniqueness(mut self, options: UniquenessOptions) -> Self {
        self.uniqueness = options;
        self
    }

    pub fn with_remediation(mut self, options: RemediationOptions) -> Self {
        self.remediation = options;
        self
    }

    /// Parse a policy document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: PolicyConfig = serde_json::from_str(json)?;
        policy.validated()
    }

    /// Consume and return the policy if valid.
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Reject out-of-range values and contradictory toggles.
    pub fn validate(&self) -> Result<()> {
        if !self.null_budget.is_finite() || !(0.0..=1.0).contains(&self.null_budget) {
            return Err(TightenError::Config(format!(
                "null budget {} is outside [0, 1]",
                self.null_budget
            )));
        }

        let fk = &self.foreign_keys;
        if fk.allow_no_check_creation && !fk.enable_creation {
            return Err(TightenError::Config(
                "no-check foreign key creation requires foreign key creation to be enabled"
                    .to_string(),
            ));
        }
        if fk.allow_cross_catalog && !fk.allow_cross_schema {
            return Err(TightenError::Config(
                "cross-catalog foreign keys require cross-schema foreign keys to be allowed"
                    .to_string(),
            ));
        }

        let remediation = &self.remediation;
        if self.null_budget > 0.0 && !remediation.generate_pre_scripts {
            return Err(TightenError::Config(
                "a non-zero null budget requires pre-deployment remediation scripts".to_string(),
            ));
        }
        if remediation.generate_pre_scripts {
            let s = &remediation.sentinels;
            for (name, value) in [
                ("numeric", &s.numeric),
                ("text", &s.text),
                ("temporal", &s.temporal),
                ("boolean", &s.boolean),
            ] {
                if value.trim().is_empty() {
                    return Err(TightenError::Config(format!(
                        "{} sentinel is empty while remediation scripts are enabled",
                        name
                    )));
                }
            }
        }

        Ok(())
    }
}
