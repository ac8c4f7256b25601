//! Unique constraint decisions for indexes the model declares unique.

use crate::codex::RationaleCode;
use crate::decision::{Category, Citations, Decision, Domain, RiskLevel, UniquenessDecision};
use crate::evidence::{ColumnRef, EvidenceIndex};
use crate::model::{Entity, Index};
use crate::policy::RiskMode;

use super::{Evaluation, EvaluationContext, Evaluator, Findings, Scope};

/// Decides whether a declared unique index can be enforced.
pub struct UniquenessEvaluator;

impl Evaluator for UniquenessEvaluator {
    type Subject = Index;

    fn evaluate(
        &self,
        scope: Scope<'_>,
        index: &Index,
        ctx: &EvaluationContext<'_>,
    ) -> Evaluation {
        let entity = scope.entity;
        let composite = index.is_composite();
        let coordinate = format!(
            "{}.{}({}) [{}]",
            entity.schema,
            entity.table,
            index.columns.join(","),
            index.name
        );
        let mut findings = Findings::new(scope, Domain::Uniqueness, coordinate);

        let no_nulls = columns_free_of_nulls(entity, index, ctx.evidence);
        let no_nulls_code = if composite {
            RationaleCode::CompositeUniqueNoNulls
        } else {
            RationaleCode::UniqueNoNulls
        };
        let single_column_key = !composite
            && index
                .columns
                .first()
                .and_then(|c| ctx.evidence.column(&column_ref(entity, c)))
                .is_some_and(|c| c.is_unique_key || c.is_primary_key);

        let build = |header| {
            Decision::Uniqueness(UniquenessDecision {
                header,
                schema: entity.schema.clone(),
                table: entity.table.clone(),
                index: index.name.clone(),
                columns: index.columns.clone(),
            })
        };

        let Some(evidence) =
            ctx.evidence
                .unique_candidate(&entity.schema, &entity.table, &index.columns)
        else {
            if single_column_key {
                findings.note(RationaleCode::PhysicalUniqueKey);
                findings.note_if(no_nulls, no_nulls_code);
                return findings.finish(
                    Category::Validation,
                    RiskLevel::Low,
                    Citations::new(),
                    build,
                );
            }
            findings.missing_profile();
            let risk = findings.withheld_risk();
            return findings.finish(Category::NoAction, risk, Citations::new(), build);
        };

        let constraint_present = evidence.constraint_present || single_column_key;
        let full = evidence.is_full_sample();
        let mut citations = Citations::new()
            .with_probe(&evidence.probe)
            .with_row_count(evidence.row_count)
            .with_constraint(constraint_present, constraint_present);
        if let Some(duplicates) = evidence.observed_duplicates() {
            citations = citations.with_duplicates(duplicates, evidence.duplicate_groups);
        }
        if evidence.probe.is_authoritative() && !full {
            findings.partial_sample(evidence.probe.sample_size, evidence.row_count);
        }

        let observed = evidence.observed_duplicates();
        if observed == Some(true) {
            findings.note(if composite {
                RationaleCode::CompositeUniqueDuplicatesPresent
            } else {
                RationaleCode::UniqueDuplicatesPresent
            });
            let risk = if covers_primary_key(entity, index, ctx.evidence) {
                RiskLevel::High
            } else {
                RiskLevel::Moderate
            };
            return findings.finish(Category::Contradiction, risk, citations, build);
        }

        findings.note_if(no_nulls, no_nulls_code);

        if constraint_present {
            findings.note(RationaleCode::PhysicalUniqueKey);
            findings.probe_gap(&evidence.probe);
            return findings.finish(Category::Validation, RiskLevel::Low, citations, build);
        }

        if observed.is_none() {
            findings.probe_gap(&evidence.probe);
            let risk = findings.withheld_risk();
            return findings.finish(Category::NoAction, risk, citations, build);
        }

        let (category, risk) = if !ctx.policy.uniqueness.allows(composite) {
            findings.note(RationaleCode::UniquePolicyDisabled);
            (Category::NoAction, RiskLevel::Low)
        } else {
            match (ctx.policy.mode, full) {
                (RiskMode::Cautious, _) => {
                    findings.note(RationaleCode::CautiousMode);
                    (Category::NoAction, RiskLevel::Low)
                }
                (RiskMode::EvidenceGated, false) => {
                    findings.note(RationaleCode::PartialSample);
                    (Category::NoAction, RiskLevel::Moderate)
                }
                (RiskMode::Aggressive, false) => {
                    findings.note(RationaleCode::PartialSample);
                    (Category::Recommendation, RiskLevel::Moderate)
                }
                (_, true) if no_nulls => (Category::Recommendation, RiskLevel::SafeToApply),
                (_, true) => (Category::Recommendation, RiskLevel::Moderate),
            }
        };
        findings.finish(category, risk, citations, build)
    }
}

fn column_ref(entity: &Entity, column: &str) -> ColumnRef {
    ColumnRef::new(&entity.schema, &entity.table, column)
}

/// Every participating column has succeeded evidence with zero NULLs.
fn columns_free_of_nulls(entity: &Entity, index: &Index, evidence: &EvidenceIndex<'_>) -> bool {
    index.columns.iter().all(|column| {
        evidence
            .column(&column_ref(entity, column))
            .and_then(|c| c.observed_nulls())
            == Some(0)
    })
}

fn covers_primary_key(entity: &Entity, index: &Index, evidence: &EvidenceIndex<'_>) -> bool {
    index.columns.iter().any(|column| {
        entity
            .identifier_columns()
            .any(|id| id.eq_ignore_ascii_case(column))
            || evidence
                .column(&column_ref(entity, column))
                .is_some_and(|c| c.is_primary_key)
    })
}
