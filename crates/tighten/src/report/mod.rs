//! Decision report: the aggregated, canonically ordered output of a run.

mod summary;

pub use summary::{CategoryCounts, DomainCounts, ModuleRollup, ReportSummary, RiskCounts};

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::codex::CODEX_VERSION;
use crate::decision::{Category, Decision};
use crate::engine::Diagnostic;
use crate::error::{Result, TightenError};
use crate::policy::PolicyConfig;

/// Everything a run decided, plus the configuration that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionReport {
    pub codex_version: String,
    /// False when the run was cancelled before every coordinate was seen.
    pub complete: bool,
    /// Policy used, verbatim.
    pub policy: PolicyConfig,
    /// The same policy as flat telemetry keys.
    pub policy_flat: IndexMap<String, String>,
    pub summary: ReportSummary,
    pub modules: BTreeMap<String, ModuleRollup>,
    pub diagnostics: Vec<Diagnostic>,
    pub decisions: Vec<Decision>,
}

impl DecisionReport {
    /// Build a report, sorting decisions and diagnostics canonically.
    pub fn from_decisions(
        policy: &PolicyConfig,
        mut decisions: Vec<Decision>,
        mut diagnostics: Vec<Diagnostic>,
        complete: bool,
    ) -> Self {
        decisions.sort_by_cached_key(|d| {
            (d.sort_key(), d.module().to_string(), d.header().entity.clone())
        });
        diagnostics.sort();
        diagnostics.dedup();

        let mut modules: BTreeMap<String, ModuleRollup> = BTreeMap::new();
        for decision in &decisions {
            modules
                .entry(decision.module().to_string())
                .or_default()
                .record(decision);
        }

        Self {
            codex_version: CODEX_VERSION.to_string(),
            complete,
            policy: policy.clone(),
            policy_flat: policy.to_flat_map(),
            summary: ReportSummary::compute(&decisions, diagnostics.len()),
            modules,
            diagnostics,
            decisions,
        }
    }

    /// Combine two reports produced under the same policy.
    ///
    /// The result is re-sorted, so merge order never shows in the output. A
    /// coordinate present in both reports is kept once; the two records must
    /// be identical.
    pub fn merge(self, other: DecisionReport) -> Result<Self> {
        if self.policy != other.policy {
            return Err(TightenError::Config(
                "cannot merge reports produced under different policies".to_string(),
            ));
        }
        if self.codex_version != other.codex_version {
            return Err(TightenError::Config(format!(
                "cannot merge reports with codex versions {} and {}",
                self.codex_version, other.codex_version
            )));
        }
        let mut by_coordinate = BTreeMap::new();
        for decision in self.decisions.into_iter().chain(other.decisions) {
            let key = (
                decision.sort_key(),
                decision.module().to_string(),
                decision.header().entity.clone(),
            );
            match by_coordinate.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(decision);
                }
                Entry::Occupied(slot) if *slot.get() == decision => {}
                Entry::Occupied(_) => {
                    return Err(TightenError::Config(format!(
                        "reports disagree on {}",
                        decision.coordinate()
                    )));
                }
            }
        }
        let decisions = by_coordinate.into_values().collect();
        let mut diagnostics = self.diagnostics;
        diagnostics.extend(other.diagnostics);
        Ok(Self::from_decisions(
            &self.policy,
            decisions,
            diagnostics,
            self.complete && other.complete,
        ))
    }

    /// Decisions an emitter renders as safe-to-apply output.
    pub fn safe_to_apply(&self) -> impl Iterator<Item = &Decision> {
        self.decisions
            .iter()
            .filter(|d| d.category().is_safe_output())
    }

    /// Decisions an emitter renders as needs-remediation output.
    pub fn needs_remediation(&self) -> impl Iterator<Item = &Decision> {
        self.decisions
            .iter()
            .filter(|d| d.category() == Category::Contradiction)
    }

    /// Contradiction coordinates across all modules, in module order.
    pub fn contradictions(&self) -> Vec<&str> {
        self.modules
            .values()
            .flat_map(|m| m.contradictions.iter().map(String::as_str))
            .collect()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a report written by [`DecisionReport::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| TightenError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_pretty()?).map_err(|e| TightenError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// SHA-256 over the compact JSON form.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("sha256:{:x}", hasher.finalize()))
    }
}
