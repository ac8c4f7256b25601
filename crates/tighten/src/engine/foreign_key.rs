//! Foreign key decisions for declared relationships.

use crate::codex::RationaleCode;
use crate::decision::{
    Category, Citations, ConstraintCreation, Decision, Domain, ForeignKeyDecision, RiskLevel,
};
use crate::evidence::{ColumnRef, ForeignKeyEvidence};
use crate::model::{DeleteRule, Entity, Relationship};
use crate::policy::{PolicyConfig, RiskMode};

use super::{Evaluation, EvaluationContext, Evaluator, Findings, Scope};

/// Decides whether a relationship can be backed by a foreign key constraint.
pub struct ForeignKeyEvaluator;

impl Evaluator for ForeignKeyEvaluator {
    type Subject = Relationship;

    fn evaluate(
        &self,
        scope: Scope<'_>,
        relationship: &Relationship,
        ctx: &EvaluationContext<'_>,
    ) -> Evaluation {
        let entity = scope.entity;
        let policy = ctx.policy;
        let source = ColumnRef::new(&entity.schema, &entity.table, &relationship.column);
        let target = ColumnRef::new(
            &relationship.target_schema,
            &relationship.target_table,
            &relationship.target_column,
        );
        let coordinate = format!("{} -> {} [{}]", source, target, relationship.name);
        let mut findings = Findings::new(scope, Domain::ForeignKey, coordinate);

        let delete_rule = relationship.delete_rule.or_else(|| {
            policy
                .foreign_keys
                .treat_missing_delete_rule_as_ignore
                .then_some(DeleteRule::Ignore)
        });
        let enforced = delete_rule.is_some_and(|r| r.is_enforced());
        findings.note_if(enforced, RationaleCode::FkEnforced);
        findings.note_if(delete_rule == Some(DeleteRule::Ignore), RationaleCode::DeleteRuleIgnore);
        findings.note_if(delete_rule.is_none(), RationaleCode::DeleteRuleUndeclared);

        let evidence = ctx.evidence.foreign_key(
            &source,
            &relationship.target_schema,
            &relationship.target_table,
        );
        let citations = evidence.map(citations_for).unwrap_or_default();
        let mut creation = None;
        let (category, risk) = match evidence {
            Some(evidence) => classify(
                entity,
                relationship,
                evidence,
                policy,
                enforced,
                &mut findings,
                &mut creation,
            ),
            None => match scope_block(entity, relationship, policy) {
                Some(code) => {
                    findings.note(code);
                    (Category::NoAction, RiskLevel::Low)
                }
                None => {
                    findings.missing_profile();
                    (Category::NoAction, findings.withheld_risk())
                }
            },
        };

        findings.finish(category, risk, citations, |header| {
            Decision::ForeignKey(ForeignKeyDecision {
                header,
                name: relationship.name.clone(),
                source,
                target,
                delete_rule,
                creation,
            })
        })
    }
}

fn citations_for(evidence: &ForeignKeyEvidence) -> Citations {
    let citations = Citations::new()
        .with_probe(&evidence.probe)
        .with_row_count(evidence.row_count)
        .with_constraint(evidence.has_constraint, evidence.is_trusted_constraint());
    match evidence.observed_orphans() {
        Some(orphans) => citations.with_orphans(orphans, evidence.orphan_count),
        None => citations,
    }
}

/// Policy scope or creation toggle that withholds a new constraint.
fn scope_block(
    entity: &Entity,
    relationship: &Relationship,
    policy: &PolicyConfig,
) -> Option<RationaleCode> {
    let options = &policy.foreign_keys;
    let cross_catalog = match (&relationship.target_catalog, &entity.catalog) {
        (Some(target), Some(source)) => !target.eq_ignore_ascii_case(source),
        (Some(_), None) => true,
        (None, _) => false,
    };
    let cross_schema = !relationship.target_schema.eq_ignore_ascii_case(&entity.schema);

    if cross_catalog && !options.allow_cross_catalog {
        Some(RationaleCode::CrossCatalogBlocked)
    } else if cross_schema && !options.allow_cross_schema {
        Some(RationaleCode::CrossSchemaBlocked)
    } else if !options.enable_creation {
        Some(RationaleCode::FkCreationDisabled)
    } else {
        None
    }
}

fn classify(
    entity: &Entity,
    relationship: &Relationship,
    evidence: &ForeignKeyEvidence,
    policy: &PolicyConfig,
    enforced: bool,
    findings: &mut Findings,
    creation: &mut Option<ConstraintCreation>,
) -> (Category, RiskLevel) {
    let full = evidence.is_full_sample();
    let observed = evidence.observed_orphans();
    if evidence.probe.is_authoritative() && !full {
        findings.partial_sample(evidence.probe.sample_size, evidence.row_count);
    }
    findings.note_if(evidence.is_trusted_constraint(), RationaleCode::DbConstraintPresent);
    findings.note_if(
        evidence.has_constraint && !evidence.is_trusted_constraint(),
        RationaleCode::DbConstraintNotTrusted,
    );

    // Orphans win over every mode and constraint state.
    if observed == Some(true) {
        findings.note(RationaleCode::DataHasOrphans);
        return (Category::Contradiction, RiskLevel::High);
    }
    findings.note_if(observed == Some(false), RationaleCode::DataNoOrphans);

    if evidence.is_trusted_constraint() {
        findings.probe_gap(&evidence.probe);
        return (Category::Validation, RiskLevel::Low);
    }

    if evidence.has_constraint {
        if findings.probe_gap(&evidence.probe) {
            return (Category::NoAction, findings.withheld_risk());
        }
        *creation = Some(ConstraintCreation::WithCheck);
        return if full {
            (Category::Recommendation, RiskLevel::SafeToApply)
        } else {
            findings.note(RationaleCode::PartialSample);
            (Category::Recommendation, RiskLevel::Moderate)
        };
    }

    if let Some(code) = scope_block(entity, relationship, policy) {
        findings.note(code);
        return (Category::NoAction, RiskLevel::Low);
    }
    if findings.probe_gap(&evidence.probe) {
        return (Category::NoAction, findings.withheld_risk());
    }

    let allow_no_check = policy.foreign_keys.allow_no_check_creation;
    match policy.mode {
        RiskMode::Cautious => {
            if enforced && full {
                *creation = Some(ConstraintCreation::WithCheck);
                (Category::Recommendation, RiskLevel::SafeToApply)
            } else {
                findings.note(RationaleCode::CautiousMode);
                findings.note_if(!full, RationaleCode::PartialSample);
                (Category::NoAction, findings.withheld_risk())
            }
        }
        RiskMode::EvidenceGated => {
            if !enforced {
                (Category::NoAction, RiskLevel::Low)
            } else if full {
                *creation = Some(ConstraintCreation::WithCheck);
                (Category::Recommendation, RiskLevel::SafeToApply)
            } else if allow_no_check {
                findings.note(RationaleCode::NoCheckCreation);
                findings.note(RationaleCode::PartialSample);
                *creation = Some(ConstraintCreation::NoCheck);
                (Category::Recommendation, RiskLevel::Moderate)
            } else {
                findings.note(RationaleCode::PartialSample);
                (Category::NoAction, RiskLevel::Moderate)
            }
        }
        RiskMode::Aggressive => {
            if full {
                *creation = Some(ConstraintCreation::WithCheck);
                let risk = if enforced {
                    RiskLevel::SafeToApply
                } else {
                    RiskLevel::Moderate
                };
                (Category::Recommendation, risk)
            } else {
                findings.note(RationaleCode::PartialSample);
                if allow_no_check {
                    findings.note(RationaleCode::NoCheckCreation);
                    *creation = Some(ConstraintCreation::NoCheck);
                } else {
                    *creation = Some(ConstraintCreation::WithCheck);
                }
                (Category::Recommendation, RiskLevel::Moderate)
            }
        }
    }
}
