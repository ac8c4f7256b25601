//! Decision engine: evaluates every coordinate of a schema model against
//! profiling evidence under a policy.
//!
//! Each domain has an [`Evaluator`]. The runner enumerates coordinates in
//! model order, fans them out over a dedicated rayon pool and checks the
//! [`CancellationToken`] before each one. Evaluation itself is pure.

mod cancel;
mod diagnostic;
mod foreign_key;
mod nullability;
mod uniqueness;

pub use cancel::CancellationToken;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use foreign_key::ForeignKeyEvaluator;
pub use nullability::NullabilityEvaluator;
pub use uniqueness::UniquenessEvaluator;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::codex::{CodexDomain, RationaleCode, RationaleSet};
use crate::decision::{Category, Citations, Decision, DecisionHeader, Domain, RiskLevel};
use crate::error::{Result, TightenError};
use crate::evidence::{EvidenceIndex, ProbeOutcome};
use crate::model::{Attribute, Entity, Index, Module, Relationship, SchemaModel};
use crate::policy::PolicyConfig;

/// Runtime options that do not affect decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Worker threads. `1` evaluates sequentially on the caller's thread,
    /// `0` lets rayon pick.
    pub max_parallelism: usize,
}

impl EngineOptions {
    pub fn sequential() -> Self {
        Self { max_parallelism: 1 }
    }

    pub fn with_max_parallelism(mut self, threads: usize) -> Self {
        self.max_parallelism = threads;
        self
    }
}

/// The module and entity a coordinate belongs to.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub module: &'a Module,
    pub entity: &'a Entity,
}

/// Read-only inputs shared by every evaluator.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub policy: &'a PolicyConfig,
    pub evidence: &'a EvidenceIndex<'a>,
}

/// One decision plus the diagnostics raised while reaching it.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub decision: Decision,
    pub diagnostics: Vec<Diagnostic>,
}

/// Trait for per-domain evaluators.
pub trait Evaluator {
    /// The model element this evaluator decides on.
    type Subject;

    /// Produce exactly one decision for `subject`.
    fn evaluate(
        &self,
        scope: Scope<'_>,
        subject: &Self::Subject,
        ctx: &EvaluationContext<'_>,
    ) -> Evaluation;
}

/// Output of a run before aggregation.
#[derive(Debug, Clone, Default)]
pub struct EngineRun {
    pub decisions: Vec<Decision>,
    pub diagnostics: Vec<Diagnostic>,
    /// False when cancellation stopped the run early.
    pub complete: bool,
}

enum Coordinate<'a> {
    Column(Scope<'a>, &'a Attribute),
    Unique(Scope<'a>, &'a Index),
    ForeignKey(Scope<'a>, &'a Relationship),
}

impl Coordinate<'_> {
    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Evaluation {
        match self {
            Coordinate::Column(scope, attribute) => {
                NullabilityEvaluator.evaluate(*scope, attribute, ctx)
            }
            Coordinate::Unique(scope, index) => UniquenessEvaluator.evaluate(*scope, index, ctx),
            Coordinate::ForeignKey(scope, relationship) => {
                ForeignKeyEvaluator.evaluate(*scope, relationship, ctx)
            }
        }
    }
}

fn coordinates(model: &SchemaModel) -> Vec<Coordinate<'_>> {
    let mut out = Vec::with_capacity(model.coordinate_count());
    for (module, entity) in model.entities() {
        let scope = Scope { module, entity };
        out.extend(entity.attributes.iter().map(|a| Coordinate::Column(scope, a)));
        out.extend(entity.unique_indexes().map(|i| Coordinate::Unique(scope, i)));
        out.extend(
            entity
                .relationships
                .iter()
                .map(|r| Coordinate::ForeignKey(scope, r)),
        );
    }
    out
}

/// Evaluate every coordinate of `model`.
///
/// Decisions come back in evaluation order; the report sorts them.
#[instrument(skip_all, fields(mode = %policy.mode, coordinates = tracing::field::Empty))]
pub fn run(
    model: &SchemaModel,
    evidence: &EvidenceIndex<'_>,
    policy: &PolicyConfig,
    options: &EngineOptions,
    cancel: &CancellationToken,
) -> Result<EngineRun> {
    let coordinates = coordinates(model);
    tracing::Span::current().record("coordinates", coordinates.len());
    let ctx = EvaluationContext { policy, evidence };

    let evaluate = |coordinate: &Coordinate<'_>| {
        if cancel.is_cancelled() {
            None
        } else {
            Some(coordinate.evaluate(&ctx))
        }
    };

    let results: Vec<Option<Evaluation>> = if options.max_parallelism == 1 {
        coordinates.iter().map(evaluate).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_parallelism)
            .build()
            .map_err(|e| TightenError::Config(format!("failed to start worker pool: {}", e)))?;
        pool.install(|| coordinates.par_iter().map(evaluate).collect())
    };

    let mut run = EngineRun {
        complete: true,
        ..EngineRun::default()
    };
    for result in results {
        let Some(evaluation) = result else {
            run.complete = false;
            continue;
        };
        let decision = evaluation.decision;
        debug!(
            coordinate = %decision.coordinate(),
            category = decision.category().label(),
            risk = decision.risk().label(),
            rationale = ?decision.rationales().codes(),
            "decision"
        );
        for diagnostic in &evaluation.diagnostics {
            warn!(
                coordinate = %diagnostic.coordinate,
                kind = diagnostic.kind.label(),
                "{}",
                diagnostic.detail
            );
        }
        run.decisions.push(decision);
        run.diagnostics.extend(evaluation.diagnostics);
    }

    if !run.complete {
        warn!(
            evaluated = run.decisions.len(),
            total = coordinates.len(),
            "evaluation cancelled"
        );
    }
    info!(
        decisions = run.decisions.len(),
        diagnostics = run.diagnostics.len(),
        complete = run.complete,
        "evaluation finished"
    );
    Ok(run)
}

/// Rationale and diagnostics collected for one coordinate.
pub(crate) struct Findings {
    module: String,
    entity: String,
    domain: Domain,
    coordinate: String,
    rationales: RationaleSet,
    diagnostics: Vec<Diagnostic>,
}

impl Findings {
    pub(crate) fn new(scope: Scope<'_>, domain: Domain, coordinate: String) -> Self {
        Self {
            module: scope.module.name.clone(),
            entity: scope.entity.name.clone(),
            domain,
            coordinate,
            rationales: RationaleSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn note(&mut self, code: RationaleCode) {
        self.rationales.insert(code);
    }

    pub(crate) fn note_if(&mut self, condition: bool, code: RationaleCode) {
        self.rationales.insert_if(condition, code);
    }

    pub(crate) fn has(&self, code: RationaleCode) -> bool {
        self.rationales.contains(code)
    }

    pub(crate) fn missing_profile(&mut self) {
        self.note(RationaleCode::ProfileMissing);
        self.diagnose(DiagnosticKind::ProfileMissing, "no profiling evidence".to_string());
    }

    /// Record a failed or skipped probe. Returns false for succeeded probes.
    pub(crate) fn probe_gap(&mut self, probe: &ProbeOutcome) -> bool {
        let Some(kind) = DiagnosticKind::for_probe(probe) else {
            return false;
        };
        self.note(kind.code());
        let captured = probe.captured_at.to_rfc3339();
        let detail = match &probe.note {
            Some(note) => format!("{} at {}: {}", probe.status.label(), captured, note),
            None => format!("{} at {}", probe.status.label(), captured),
        };
        self.diagnose(kind, detail);
        true
    }

    /// Record a partial sample as a diagnostic only.
    pub(crate) fn partial_sample(&mut self, sample_size: u64, row_count: u64) {
        self.diagnose(
            DiagnosticKind::PartialSample,
            format!("sampled {} of {} rows", sample_size, row_count),
        );
    }

    fn diagnose(&mut self, kind: DiagnosticKind, detail: String) {
        self.diagnostics.push(Diagnostic::new(
            self.module.clone(),
            self.domain,
            self.coordinate.clone(),
            kind,
            detail,
        ));
    }

    /// Risk for a withheld decision: evidence gaps are Moderate, policy or
    /// intent withholding is Low.
    pub(crate) fn withheld_risk(&self) -> RiskLevel {
        if self
            .rationales
            .iter()
            .any(|c| c.domain() == CodexDomain::Evidence)
        {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub(crate) fn finish(
        self,
        category: Category,
        risk: RiskLevel,
        citations: Citations,
        build: impl FnOnce(DecisionHeader) -> Decision,
    ) -> Evaluation {
        let header = DecisionHeader::new(
            self.module,
            self.entity,
            category,
            risk,
            self.rationales,
            citations,
        );
        Evaluation {
            decision: build(header),
            diagnostics: self.diagnostics,
        }
    }
}
