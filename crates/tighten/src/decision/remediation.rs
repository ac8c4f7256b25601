//! Remediation pre-steps attached to nullability contradictions.

use serde::{Deserialize, Serialize};

/// What a pre-deployment script must do before NOT NULL can be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RemediationAction {
    /// Backfill NULLs with the column's default definition.
    BackfillDefault { value: String },
    /// Backfill NULLs with the policy sentinel for the data category.
    BackfillSentinel { value: String },
    /// No automatic backfill is safe; a human must fix the rows.
    ManualReview { reason: String },
}

impl RemediationAction {
    pub fn label(&self) -> &'static str {
        match self {
            RemediationAction::BackfillDefault { .. } => "Backfill with default",
            RemediationAction::BackfillSentinel { .. } => "Backfill with sentinel",
            RemediationAction::ManualReview { .. } => "Manual review",
        }
    }

    /// Whether a script can perform the step unattended.
    pub fn is_automatic(&self) -> bool {
        !matches!(self, RemediationAction::ManualReview { .. })
    }
}

/// A remediate-then-tighten plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationPlan {
    pub action: RemediationAction,
    /// Rows the pre-step touches (observed NULLs).
    pub affected_rows: u64,
    /// Observed NULL fraction of the examined sample.
    pub null_fraction: f64,
}
