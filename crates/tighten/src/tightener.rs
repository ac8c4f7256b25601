//! `Tightener`: the public entry point tying policy, engine and report together.

use tracing::info;

use crate::engine::{self, CancellationToken, EngineOptions};
use crate::error::Result;
use crate::evidence::EvidenceSnapshot;
use crate::model::SchemaModel;
use crate::policy::PolicyConfig;
use crate::report::DecisionReport;

/// Evaluates schema models against profiling evidence under one policy.
#[derive(Debug, Clone, Default)]
pub struct Tightener {
    policy: PolicyConfig,
    options: EngineOptions,
}

impl Tightener {
    /// Create a tightener with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `policy`, rejecting it when invalid.
    pub fn with_policy(mut self, policy: PolicyConfig) -> Result<Self> {
        self.policy = policy.validated()?;
        Ok(self)
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Evaluate every coordinate of `model`.
    ///
    /// Fails only on malformed inputs. Missing or failed evidence becomes
    /// `NoAction` decisions with diagnostics.
    pub fn evaluate(
        &self,
        model: &SchemaModel,
        snapshot: &EvidenceSnapshot,
    ) -> Result<DecisionReport> {
        self.evaluate_with_cancel(model, snapshot, &CancellationToken::new())
    }

    /// Like [`Tightener::evaluate`], stopping early once `cancel` fires.
    /// A cancelled run still yields a sorted report with `complete = false`.
    pub fn evaluate_with_cancel(
        &self,
        model: &SchemaModel,
        snapshot: &EvidenceSnapshot,
        cancel: &CancellationToken,
    ) -> Result<DecisionReport> {
        self.policy.validate()?;
        model.validate()?;
        snapshot.validate()?;
        let index = snapshot.index()?;

        let run = engine::run(model, &index, &self.policy, &self.options, cancel)?;
        let report = DecisionReport::from_decisions(
            &self.policy,
            run.decisions,
            run.diagnostics,
            run.complete,
        );
        info!(
            validations = report.summary.by_category.validation,
            recommendations = report.summary.by_category.recommendation,
            contradictions = report.summary.by_category.contradiction,
            no_action = report.summary.by_category.no_action,
            "report ready"
        );
        Ok(report)
    }
}
