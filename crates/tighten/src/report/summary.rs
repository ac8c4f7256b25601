//! Counts and per-module rollups.

use serde::{Deserialize, Serialize};

use crate::decision::{Category, Decision, Domain, RiskLevel};

/// Decision counts by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub validation: usize,
    pub recommendation: usize,
    pub contradiction: usize,
    pub no_action: usize,
}

impl CategoryCounts {
    pub fn record(&mut self, category: Category) {
        match category {
            Category::Validation => self.validation += 1,
            Category::Recommendation => self.recommendation += 1,
            Category::Contradiction => self.contradiction += 1,
            Category::NoAction => self.no_action += 1,
        }
    }

    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Validation => self.validation,
            Category::Recommendation => self.recommendation,
            Category::Contradiction => self.contradiction,
            Category::NoAction => self.no_action,
        }
    }

    pub fn total(&self) -> usize {
        self.validation + self.recommendation + self.contradiction + self.no_action
    }
}

/// Decision counts by risk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub safe_to_apply: usize,
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
}

impl RiskCounts {
    pub fn record(&mut self, risk: RiskLevel) {
        match risk {
            RiskLevel::SafeToApply => self.safe_to_apply += 1,
            RiskLevel::Low => self.low += 1,
            RiskLevel::Moderate => self.moderate += 1,
            RiskLevel::High => self.high += 1,
        }
    }

    pub fn get(&self, risk: RiskLevel) -> usize {
        match risk {
            RiskLevel::SafeToApply => self.safe_to_apply,
            RiskLevel::Low => self.low,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::High => self.high,
        }
    }
}

/// Decision counts by domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCounts {
    pub nullability: usize,
    pub uniqueness: usize,
    pub foreign_key: usize,
}

impl DomainCounts {
    pub fn record(&mut self, domain: Domain) {
        match domain {
            Domain::Nullability => self.nullability += 1,
            Domain::Uniqueness => self.uniqueness += 1,
            Domain::ForeignKey => self.foreign_key += 1,
        }
    }
}

/// Global totals for a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_decisions: usize,
    pub by_category: CategoryCounts,
    pub by_risk: RiskCounts,
    pub by_domain: DomainCounts,
    pub total_diagnostics: usize,
}

impl ReportSummary {
    pub fn compute(decisions: &[Decision], diagnostics: usize) -> Self {
        let mut summary = Self {
            total_decisions: decisions.len(),
            total_diagnostics: diagnostics,
            ..Self::default()
        };
        for decision in decisions {
            summary.by_category.record(decision.category());
            summary.by_risk.record(decision.risk());
            summary.by_domain.record(decision.domain());
        }
        summary
    }

    /// One-line verdict for humans.
    pub fn recommendation(&self) -> String {
        let c = &self.by_category;
        if c.contradiction > 0 {
            format!(
                "{} contradiction(s) need manual remediation before tightening.",
                c.contradiction
            )
        } else if c.recommendation > 0 {
            format!("{} constraint(s) can be tightened.", c.recommendation)
        } else if c.no_action == self.total_decisions && self.total_decisions > 0 {
            "No claims made. Gather more evidence.".to_string()
        } else {
            "Existing constraints confirmed. Nothing to tighten.".to_string()
        }
    }
}

/// Per-module counts plus the coordinates that need human attention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRollup {
    pub by_category: CategoryCounts,
    pub by_risk: RiskCounts,
    /// Contradiction coordinates, in report order.
    pub contradictions: Vec<String>,
}

impl ModuleRollup {
    pub fn record(&mut self, decision: &Decision) {
        self.by_category.record(decision.category());
        self.by_risk.record(decision.risk());
        if decision.category() == Category::Contradiction {
            self.contradictions.push(decision.coordinate());
        }
    }

    pub fn total(&self) -> usize {
        self.by_category.total()
    }
}
