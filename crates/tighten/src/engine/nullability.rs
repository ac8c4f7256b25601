//! NOT NULL decisions for declared attributes.

use crate::codex::RationaleCode;
use crate::decision::{
    Category, Citations, Decision, Domain, NullabilityDecision, RemediationAction,
    RemediationPlan, RiskLevel,
};
use crate::evidence::{ColumnEvidence, ColumnRef};
use crate::model::Attribute;
use crate::policy::{PolicyConfig, RiskMode};

use super::{Evaluation, EvaluationContext, Evaluator, Findings, Scope};

/// Decides whether an attribute's column can be made NOT NULL.
pub struct NullabilityEvaluator;

impl Evaluator for NullabilityEvaluator {
    type Subject = Attribute;

    fn evaluate(
        &self,
        scope: Scope<'_>,
        attribute: &Attribute,
        ctx: &EvaluationContext<'_>,
    ) -> Evaluation {
        let column = ColumnRef::new(&scope.entity.schema, &scope.entity.table, &attribute.column);
        let mut findings = Findings::new(scope, Domain::Nullability, column.to_string());
        findings.note_if(attribute.is_mandatory, RationaleCode::Mandatory);

        let Some(evidence) = ctx.evidence.column(&column) else {
            findings.missing_profile();
            let risk = findings.withheld_risk();
            return findings.finish(Category::NoAction, risk, Citations::new(), |header| {
                Decision::Nullability(NullabilityDecision {
                    header,
                    column,
                    remediation: None,
                })
            });
        };

        let citations = Citations::new()
            .with_probe(&evidence.probe)
            .with_row_count(evidence.row_count)
            .with_default_definition(evidence.default_definition.as_deref());
        let citations = match evidence.observed_nulls() {
            Some(nulls) => citations.with_null_count(nulls),
            None => citations,
        };

        let (category, risk, remediation) =
            classify(attribute, evidence, ctx.policy, &mut findings);
        findings.finish(category, risk, citations, |header| {
            Decision::Nullability(NullabilityDecision {
                header,
                column,
                remediation,
            })
        })
    }
}

fn classify(
    attribute: &Attribute,
    evidence: &ColumnEvidence,
    policy: &PolicyConfig,
    findings: &mut Findings,
) -> (Category, RiskLevel, Option<RemediationPlan>) {
    let physical = evidence.is_physically_not_null();
    let full = evidence.is_full_sample();
    findings.note_if(physical, RationaleCode::PhysicalNotNull);
    findings.note_if(evidence.is_primary_key, RationaleCode::Pk);
    findings.note_if(
        evidence.default_definition.is_some() || attribute.default_value.is_some(),
        RationaleCode::DefaultPresent,
    );

    let computed = evidence.is_computed && !physical;
    findings.note_if(computed, RationaleCode::ComputedColumn);

    if evidence.probe.is_authoritative() && !full {
        findings.partial_sample(evidence.probe.sample_size, evidence.row_count);
    }

    let Some(nulls) = evidence.observed_nulls() else {
        findings.probe_gap(&evidence.probe);
        // The catalog alone is conclusive for columns that are already NOT NULL.
        return if physical {
            (Category::Validation, RiskLevel::Low, None)
        } else {
            (Category::NoAction, findings.withheld_risk(), None)
        };
    };

    if nulls > 0 {
        findings.note(RationaleCode::DataHasNulls);
        if !(attribute.is_mandatory || physical) {
            return (Category::NoAction, RiskLevel::Low, None);
        }
        let risk = if evidence.is_primary_key || attribute.is_identifier {
            RiskLevel::High
        } else {
            RiskLevel::Moderate
        };
        // A computed column cannot be backfilled.
        let plan = if computed {
            None
        } else {
            remediation_plan(attribute, evidence, nulls, policy)
        };
        if plan.is_some() {
            findings.note(RationaleCode::NullBudgetWithin);
            findings.note(RationaleCode::RemediateBeforeTighten);
        }
        return (Category::Contradiction, risk, plan);
    }

    findings.note(RationaleCode::DataNoNulls);

    if physical {
        let risk = if !evidence.is_nullable && !evidence.is_primary_key && full {
            RiskLevel::SafeToApply
        } else {
            RiskLevel::Low
        };
        return (Category::Validation, risk, None);
    }

    if computed {
        return (Category::NoAction, RiskLevel::Low, None);
    }

    if !attribute.is_mandatory {
        findings.note(RationaleCode::NotDeclaredMandatory);
        return if policy.mode == RiskMode::Aggressive && full {
            (Category::Recommendation, RiskLevel::Moderate, None)
        } else {
            (Category::NoAction, RiskLevel::Low, None)
        };
    }

    match (policy.mode, full) {
        (RiskMode::Cautious, true) if evidence.is_unique_key => {
            (Category::Recommendation, RiskLevel::SafeToApply, None)
        }
        (RiskMode::Cautious, _) => {
            findings.note(RationaleCode::CautiousMode);
            (Category::NoAction, RiskLevel::Low, None)
        }
        (_, true) => (Category::Recommendation, RiskLevel::SafeToApply, None),
        (RiskMode::EvidenceGated, false) => {
            findings.note(RationaleCode::PartialSample);
            (Category::NoAction, RiskLevel::Moderate, None)
        }
        (RiskMode::Aggressive, false) => {
            findings.note(RationaleCode::PartialSample);
            (Category::Recommendation, RiskLevel::Moderate, None)
        }
    }
}

/// A pre-step plan, when the null budget and remediation settings allow one.
fn remediation_plan(
    attribute: &Attribute,
    evidence: &ColumnEvidence,
    nulls: u64,
    policy: &PolicyConfig,
) -> Option<RemediationPlan> {
    let sample = evidence.probe.sample_size;
    if policy.mode == RiskMode::Cautious
        || !policy.remediation.generate_pre_scripts
        || sample == 0
    {
        return None;
    }
    let null_fraction = nulls as f64 / sample as f64;
    if null_fraction > policy.null_budget {
        return None;
    }

    let remediation = &policy.remediation;
    let default = evidence
        .default_definition
        .as_deref()
        .or(attribute.default_value.as_deref());
    let action = if nulls > remediation.max_rows_default_backfill {
        RemediationAction::ManualReview {
            reason: format!(
                "{} NULL rows exceed the backfill cap of {}",
                nulls, remediation.max_rows_default_backfill
            ),
        }
    } else if let Some(value) = default {
        RemediationAction::BackfillDefault {
            value: value.to_string(),
        }
    } else if let Some(value) = remediation
        .sentinels
        .for_category(attribute.data_type.category())
    {
        RemediationAction::BackfillSentinel {
            value: value.to_string(),
        }
    } else {
        RemediationAction::ManualReview {
            reason: format!("no sentinel for data type {:?}", attribute.data_type),
        }
    };

    Some(RemediationPlan {
        action,
        affected_rows: nulls,
        null_fraction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{EvidenceSnapshot, ProbeOutcome};
    use crate::model::{DataType, Entity, Module};
    use chrono::{TimeZone, Utc};

    fn evaluate(
        attribute: Attribute,
        evidence: Option<ColumnEvidence>,
        policy: &PolicyConfig,
    ) -> Decision {
        let entity =
            Entity::new("Order", "dbo", "OSUSR_ABC_ORDER").with_attribute(attribute.clone());
        let module = Module::new("Sales");
        let snapshot = evidence
            .into_iter()
            .fold(EvidenceSnapshot::new(), |s, e| s.with_column(e));
        let index = snapshot.index().unwrap();
        let ctx = EvaluationContext {
            policy,
            evidence: &index,
        };
        NullabilityEvaluator
            .evaluate(
                Scope {
                    module: &module,
                    entity: &entity,
                },
                &attribute,
                &ctx,
            )
            .decision
    }

    fn probe(sample: u64) -> ProbeOutcome {
        ProbeOutcome::succeeded(Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap(), sample)
    }

    fn column(rows: u64, sample: u64) -> ColumnEvidence {
        ColumnEvidence::new(ColumnRef::new("dbo", "OSUSR_ABC_ORDER", "C"), rows, probe(sample))
    }

    fn remediation(decision: &Decision) -> Option<&RemediationPlan> {
        match decision {
            Decision::Nullability(d) => d.remediation.as_ref(),
            _ => None,
        }
    }

    #[test]
    fn test_missing_evidence_is_no_action() {
        let d = evaluate(Attribute::new("C", "C").mandatory(), None, &PolicyConfig::default());
        assert_eq!(d.category(), Category::NoAction);
        assert_eq!(d.risk(), RiskLevel::Moderate);
        assert!(d.rationales().contains(RationaleCode::ProfileMissing));
    }

    #[test]
    fn test_clean_mandatory_column_by_mode() {
        let attribute = Attribute::new("C", "C").mandatory();
        let evidence = column(100, 100);

        let gated = evaluate(attribute.clone(), Some(evidence.clone()), &PolicyConfig::default());
        assert_eq!(gated.category(), Category::Recommendation);
        assert_eq!(gated.risk(), RiskLevel::SafeToApply);

        let cautious = evaluate(
            attribute,
            Some(evidence),
            &PolicyConfig::default().with_mode(RiskMode::Cautious),
        );
        assert_eq!(cautious.category(), Category::NoAction);
        assert!(cautious.rationales().contains(RationaleCode::CautiousMode));
    }

    #[test]
    fn test_cautious_needs_physical_key_evidence() {
        let cautious = PolicyConfig::default().with_mode(RiskMode::Cautious);

        let declared_only = evaluate(
            Attribute::new("Id", "C").identifier(),
            Some(column(100, 100)),
            &cautious,
        );
        assert_eq!(declared_only.category(), Category::NoAction);
        assert!(declared_only.rationales().contains(RationaleCode::CautiousMode));

        let unique_key = evaluate(
            Attribute::new("Code", "C").mandatory(),
            Some(column(100, 100).unique_key()),
            &cautious,
        );
        assert_eq!(unique_key.category(), Category::Recommendation);
        assert_eq!(unique_key.risk(), RiskLevel::SafeToApply);
    }

    #[test]
    fn test_partial_sample_by_mode() {
        let attribute = Attribute::new("C", "C").mandatory();
        let gated = evaluate(attribute.clone(), Some(column(1000, 100)), &PolicyConfig::default());
        assert_eq!(gated.category(), Category::NoAction);
        assert!(gated.rationales().contains(RationaleCode::PartialSample));

        let aggressive = evaluate(
            attribute,
            Some(column(1000, 100)),
            &PolicyConfig::default().with_mode(RiskMode::Aggressive),
        );
        assert_eq!(aggressive.category(), Category::Recommendation);
        assert_eq!(aggressive.risk(), RiskLevel::Moderate);
    }

    #[test]
    fn test_failed_probe_on_not_null_column_validates() {
        let evidence = ColumnEvidence::new(
            ColumnRef::new("dbo", "OSUSR_ABC_ORDER", "C"),
            10,
            ProbeOutcome::failed(Utc::now(), "timeout"),
        )
        .not_null();
        let d = evaluate(
            Attribute::new("C", "C").mandatory(),
            Some(evidence),
            &PolicyConfig::default(),
        );
        assert_eq!(d.category(), Category::Validation);
        assert_eq!(d.risk(), RiskLevel::Low);
        assert!(d.rationales().contains(RationaleCode::ProbeFailed));
    }

    #[test]
    fn test_computed_column_is_left_alone() {
        let d = evaluate(
            Attribute::new("C", "C").mandatory(),
            Some(column(10, 10).computed()),
            &PolicyConfig::default().with_mode(RiskMode::Aggressive),
        );
        assert_eq!(d.category(), Category::NoAction);
        assert!(d.rationales().contains(RationaleCode::ComputedColumn));
    }

    #[test]
    fn test_computed_mandatory_column_with_nulls_is_contradiction() {
        let policy = PolicyConfig::default().with_null_budget(0.5);
        for mode in RiskMode::all() {
            let d = evaluate(
                Attribute::new("C", "C").mandatory(),
                Some(column(100, 100).computed().with_null_count(40)),
                &policy.clone().with_mode(*mode),
            );
            assert_eq!(d.category(), Category::Contradiction, "mode {}", mode);
            assert!(d.rationales().contains(RationaleCode::ComputedColumn));
            assert!(d.rationales().contains(RationaleCode::DataHasNulls));
            assert!(remediation(&d).is_none());
        }
    }

    #[test]
    fn test_nulls_on_identifier_are_high_risk() {
        let d = evaluate(
            Attribute::new("Id", "C").identifier(),
            Some(column(10, 10).with_null_count(1)),
            &PolicyConfig::default().with_mode(RiskMode::Aggressive),
        );
        assert_eq!(d.category(), Category::Contradiction);
        assert_eq!(d.risk(), RiskLevel::High);
    }

    #[test]
    fn test_null_budget_attaches_sentinel_plan() {
        let policy = PolicyConfig::default().with_null_budget(0.1);
        let d = evaluate(
            Attribute::new("Qty", "C").mandatory().with_data_type(DataType::Integer),
            Some(column(100, 100).with_null_count(5)),
            &policy,
        );
        assert_eq!(d.category(), Category::Contradiction);
        assert!(d.rationales().contains(RationaleCode::RemediateBeforeTighten));
        let plan = remediation(&d).unwrap();
        assert_eq!(plan.affected_rows, 5);
        assert_eq!(
            plan.action,
            RemediationAction::BackfillSentinel {
                value: "0".to_string()
            }
        );
    }

    #[test]
    fn test_null_budget_prefers_column_default() {
        let policy = PolicyConfig::default().with_null_budget(0.5);
        let d = evaluate(
            Attribute::new("Status", "C").mandatory().with_data_type(DataType::Text),
            Some(column(10, 10).with_null_count(2).with_default("('NEW')")),
            &policy,
        );
        assert!(d.rationales().contains(RationaleCode::DefaultPresent));
        assert_eq!(
            remediation(&d).unwrap().action,
            RemediationAction::BackfillDefault {
                value: "('NEW')".to_string()
            }
        );
    }

    #[test]
    fn test_null_budget_exceeded_has_no_plan() {
        let policy = PolicyConfig::default().with_null_budget(0.01);
        let d = evaluate(
            Attribute::new("C", "C").mandatory(),
            Some(column(100, 100).with_null_count(5)),
            &policy,
        );
        assert_eq!(d.category(), Category::Contradiction);
        assert!(remediation(&d).is_none());
        assert!(!d.rationales().contains(RationaleCode::NullBudgetWithin));
    }
}
