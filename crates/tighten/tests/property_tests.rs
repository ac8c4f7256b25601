//! Property-based tests for the decision engine.
//!
//! These tests generate random models and evidence and check that the
//! engine's safety properties hold for all of them.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p tighten --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p tighten --test property_tests
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use tighten::codex::RationaleCode;
use tighten::evidence::{ColumnEvidence, ForeignKeyEvidence, UniqueCandidateEvidence};
use tighten::model::{Attribute, DeleteRule, Entity, Index, Module, Relationship};
use tighten::{
    Category, ColumnRef, DecisionReport, Domain, EngineOptions, EvidenceSnapshot, PolicyConfig,
    ProbeOutcome, RiskLevel, RiskMode, SchemaModel, Tightener,
};

// =============================================================================
// Test Strategies
// =============================================================================

const SCHEMA: &str = "dbo";
const TABLE: &str = "OSUSR_GEN_ENTITY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Succeeded,
    Failed,
    Skipped,
}

fn probe_kind() -> impl Strategy<Value = Probe> {
    prop_oneof![
        3 => Just(Probe::Succeeded),
        1 => Just(Probe::Failed),
        1 => Just(Probe::Skipped),
    ]
}

#[derive(Debug, Clone)]
struct ColumnCase {
    mandatory: bool,
    identifier: bool,
    not_null: bool,
    computed: bool,
    profiled: bool,
    rows: u64,
    full: bool,
    nulls: u64,
    probe: Probe,
}

fn column_case() -> impl Strategy<Value = ColumnCase> {
    (
        any::<bool>(),
        prop::bool::weighted(0.15),
        prop::bool::weighted(0.3),
        prop::bool::weighted(0.2),
        prop::bool::weighted(0.9),
        1u64..500,
        any::<bool>(),
        prop_oneof![2 => Just(0u64), 1 => 1u64..20],
        probe_kind(),
    )
        .prop_map(
            |(mandatory, identifier, not_null, computed, profiled, rows, full, nulls, probe)| {
                ColumnCase {
                    mandatory: mandatory || identifier,
                    identifier,
                    not_null,
                    computed,
                    profiled,
                    rows,
                    full,
                    nulls,
                    probe,
                }
            },
        )
}

#[derive(Debug, Clone)]
struct UniqueCase {
    composite: bool,
    duplicates: bool,
    constraint: bool,
    full: bool,
    probe: Probe,
}

fn unique_case() -> impl Strategy<Value = UniqueCase> {
    (
        any::<bool>(),
        prop::bool::weighted(0.3),
        prop::bool::weighted(0.2),
        any::<bool>(),
        probe_kind(),
    )
        .prop_map(|(composite, duplicates, constraint, full, probe)| UniqueCase {
            composite,
            duplicates,
            constraint,
            full,
            probe,
        })
}

#[derive(Debug, Clone)]
struct ForeignKeyCase {
    rule: Option<DeleteRule>,
    orphans: u64,
    constraint: u8,
    cross_schema: bool,
    full: bool,
    probe: Probe,
}

fn foreign_key_case() -> impl Strategy<Value = ForeignKeyCase> {
    (
        prop_oneof![
            Just(None),
            Just(Some(DeleteRule::Protect)),
            Just(Some(DeleteRule::Delete)),
            Just(Some(DeleteRule::Ignore)),
        ],
        prop_oneof![2 => Just(0u64), 1 => 1u64..10],
        0u8..3,
        prop::bool::weighted(0.2),
        any::<bool>(),
        probe_kind(),
    )
        .prop_map(|(rule, orphans, constraint, cross_schema, full, probe)| ForeignKeyCase {
            rule,
            orphans,
            constraint,
            cross_schema,
            full,
            probe,
        })
}

#[derive(Debug, Clone)]
struct Scenario {
    columns: Vec<ColumnCase>,
    uniques: Vec<UniqueCase>,
    foreign_keys: Vec<ForeignKeyCase>,
}

fn scenario() -> impl Strategy<Value = Scenario> {
    prop::collection::vec(column_case(), 2..8).prop_flat_map(|columns| {
        let n = columns.len();
        (
            Just(columns),
            prop::collection::vec(unique_case(), 0..=n),
            prop::collection::vec(foreign_key_case(), 0..=n),
        )
            .prop_map(|(columns, uniques, foreign_keys)| Scenario {
                columns,
                uniques,
                foreign_keys,
            })
    })
}

// =============================================================================
// Scenario construction
// =============================================================================

fn captured_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
}

fn outcome(probe: Probe, rows: u64, full: bool) -> ProbeOutcome {
    match probe {
        Probe::Succeeded => {
            ProbeOutcome::succeeded(captured_at(), if full { rows } else { rows / 2 })
        }
        Probe::Failed => ProbeOutcome::failed(captured_at(), "timeout"),
        Probe::Skipped => ProbeOutcome::skipped(captured_at(), "excluded"),
    }
}

/// Nulls the generated evidence reports, capped at the sample size.
fn observed_nulls(case: &ColumnCase) -> u64 {
    case.nulls.min(outcome(case.probe, case.rows, case.full).sample_size)
}

fn column_name(i: usize) -> String {
    format!("C{}", i)
}

fn index_columns(scenario: &Scenario, k: usize) -> Vec<String> {
    let n = scenario.columns.len();
    if scenario.uniques[k].composite {
        vec![column_name(k), column_name((k + 1) % n)]
    } else {
        vec![column_name(k)]
    }
}

fn build(scenario: &Scenario) -> (SchemaModel, EvidenceSnapshot) {
    let mut entity = Entity::new("Generated", SCHEMA, TABLE);
    let mut snapshot = EvidenceSnapshot::new();

    for (i, case) in scenario.columns.iter().enumerate() {
        let mut attribute = Attribute::new(format!("A{}", i), column_name(i));
        if case.identifier {
            attribute = attribute.identifier();
        } else if case.mandatory {
            attribute = attribute.mandatory();
        }
        entity = entity.with_attribute(attribute);

        if case.profiled {
            let probe = outcome(case.probe, case.rows, case.full);
            let mut evidence =
                ColumnEvidence::new(ColumnRef::new(SCHEMA, TABLE, column_name(i)), case.rows, probe)
                    .with_null_count(observed_nulls(case));
            if case.not_null {
                evidence = evidence.not_null();
            }
            if case.computed {
                evidence = evidence.computed();
            }
            snapshot = snapshot.with_column(evidence);
        }
    }

    for (k, case) in scenario.uniques.iter().enumerate() {
        let columns = index_columns(scenario, k);
        entity = entity.with_index(Index::new(format!("IX_{}", k), columns.clone()).unique());
        let mut evidence = UniqueCandidateEvidence::new(
            SCHEMA,
            TABLE,
            columns,
            100,
            outcome(case.probe, 100, case.full),
        );
        if case.duplicates {
            evidence = evidence.with_duplicates(1);
        }
        if case.constraint {
            evidence = evidence.with_constraint();
        }
        snapshot = snapshot.with_unique_candidate(evidence);
    }

    for (k, case) in scenario.foreign_keys.iter().enumerate() {
        let target_schema = if case.cross_schema { "ref" } else { SCHEMA };
        let target_table = format!("PARENT{}", k);
        entity = entity.with_relationship(Relationship {
            name: format!("FK_{}", k),
            column: column_name(k),
            target_entity: format!("Parent{}", k),
            target_schema: target_schema.to_string(),
            target_table: target_table.clone(),
            target_column: "ID".to_string(),
            target_catalog: None,
            delete_rule: case.rule,
        });
        let mut evidence = ForeignKeyEvidence::new(
            ColumnRef::new(SCHEMA, TABLE, column_name(k)),
            ColumnRef::new(target_schema, target_table, "ID"),
            100,
            outcome(case.probe, 100, case.full),
        );
        evidence = match case.constraint {
            1 => evidence.with_constraint(),
            2 => evidence.with_untrusted_constraint(),
            _ => evidence,
        };
        if case.orphans > 0 {
            evidence = evidence.with_orphans(case.orphans);
        }
        snapshot = snapshot.with_foreign_key(evidence);
    }

    let model = SchemaModel::new().with_module(Module::new("Generated").with_entity(entity));
    (model, snapshot)
}

fn evaluate(scenario: &Scenario, mode: RiskMode, options: EngineOptions) -> DecisionReport {
    let (model, snapshot) = build(scenario);
    Tightener::new()
        .with_policy(PolicyConfig::default().with_mode(mode))
        .unwrap()
        .with_options(options)
        .evaluate(&model, &snapshot)
        .unwrap()
}

fn coordinates_in(report: &DecisionReport, category: Category) -> BTreeSet<String> {
    report
        .decisions
        .iter()
        .filter(|d| d.category() == category)
        .map(|d| d.coordinate())
        .collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every coordinate gets exactly one decision.
    #[test]
    fn prop_one_decision_per_coordinate(scenario in scenario()) {
        let (model, _) = build(&scenario);
        let report = evaluate(&scenario, RiskMode::EvidenceGated, EngineOptions::sequential());
        prop_assert_eq!(report.decisions.len(), model.coordinate_count());
        prop_assert!(report.complete);
    }

    /// Identical inputs give identical reports, whatever the parallelism.
    #[test]
    fn prop_determinism(scenario in scenario(), threads in 0usize..5) {
        for mode in RiskMode::all() {
            let sequential = evaluate(&scenario, *mode, EngineOptions::sequential());
            let options = EngineOptions::default().with_max_parallelism(threads);
            let parallel = evaluate(&scenario, *mode, options);
            prop_assert_eq!(sequential.fingerprint().unwrap(), parallel.fingerprint().unwrap());
            prop_assert_eq!(sequential, parallel);
        }
    }

    /// More permissive modes never recommend less.
    #[test]
    fn prop_monotonic_recommendations(scenario in scenario()) {
        let recommended = |mode| {
            let report = evaluate(&scenario, mode, EngineOptions::sequential());
            coordinates_in(&report, Category::Recommendation)
        };
        let cautious = recommended(RiskMode::Cautious);
        let gated = recommended(RiskMode::EvidenceGated);
        let aggressive = recommended(RiskMode::Aggressive);
        prop_assert!(
            cautious.is_subset(&gated),
            "cautious {:?} not within gated {:?}",
            cautious,
            gated
        );
        prop_assert!(
            gated.is_subset(&aggressive),
            "gated {:?} not within aggressive {:?}",
            gated,
            aggressive
        );
    }

    /// Observed violations of declared intent are Contradictions in every
    /// mode, and Contradictions are never low risk.
    #[test]
    fn prop_contradiction_supremacy(scenario in scenario()) {
        let mut expected = BTreeSet::new();
        for (i, case) in scenario.columns.iter().enumerate() {
            let declared = case.mandatory || case.not_null;
            let observed = case.profiled && case.probe == Probe::Succeeded;
            if observed && observed_nulls(case) > 0 && declared {
                expected.insert(format!("{}.{}.{}", SCHEMA, TABLE, column_name(i)));
            }
        }

        for mode in RiskMode::all() {
            let report = evaluate(&scenario, *mode, EngineOptions::sequential());
            let contradictions = coordinates_in(&report, Category::Contradiction);
            prop_assert!(
                expected.is_subset(&contradictions),
                "{}: expected {:?} within {:?}",
                mode,
                expected,
                contradictions
            );
            for (k, case) in scenario.uniques.iter().enumerate() {
                if case.duplicates && case.probe == Probe::Succeeded {
                    let suffix = format!("[IX_{}]", k);
                    let found = contradictions.iter().any(|c| c.ends_with(&suffix));
                    prop_assert!(found, "{}: {}", mode, suffix);
                }
            }
            for (k, case) in scenario.foreign_keys.iter().enumerate() {
                if case.orphans > 0 && case.probe == Probe::Succeeded {
                    let suffix = format!("[FK_{}]", k);
                    let found = contradictions.iter().any(|c| c.ends_with(&suffix));
                    prop_assert!(found, "{}: {}", mode, suffix);
                }
            }
            for decision in report.needs_remediation() {
                prop_assert!(decision.risk() >= RiskLevel::Moderate);
            }
        }
    }

    /// Without succeeded probes or catalog facts, nothing is claimed.
    #[test]
    fn prop_no_evidence_safety(mut scenario in scenario()) {
        for column in &mut scenario.columns {
            column.not_null = false;
            if column.probe == Probe::Succeeded {
                column.probe = Probe::Failed;
            }
        }
        for unique in &mut scenario.uniques {
            unique.constraint = false;
            if unique.probe == Probe::Succeeded {
                unique.probe = Probe::Skipped;
            }
        }
        for fk in &mut scenario.foreign_keys {
            fk.constraint = 0;
            if fk.probe == Probe::Succeeded {
                fk.probe = Probe::Failed;
            }
        }
        for mode in RiskMode::all() {
            let report = evaluate(&scenario, *mode, EngineOptions::sequential());
            for decision in &report.decisions {
                prop_assert_eq!(decision.category(), Category::NoAction, "{}", decision);
            }
        }
    }

    /// A composite candidate with any NULL-bearing column never cites the
    /// composite no-nulls code and is never SafeToApply.
    #[test]
    fn prop_composite_null_invalidation(mut scenario in scenario()) {
        scenario.columns[0].profiled = true;
        scenario.columns[0].probe = Probe::Succeeded;
        scenario.columns[0].nulls = scenario.columns[0].nulls.max(1);
        scenario.columns[0].rows = scenario.columns[0].rows.max(2);
        scenario.uniques.insert(0, UniqueCase {
            composite: true,
            duplicates: false,
            constraint: false,
            full: true,
            probe: Probe::Succeeded,
        });

        for mode in RiskMode::all() {
            let report = evaluate(&scenario, *mode, EngineOptions::sequential());
            let decision = report
                .decisions
                .iter()
                .find(|d| d.domain() == Domain::Uniqueness && d.coordinate().ends_with("[IX_0]"))
                .unwrap();
            prop_assert!(!decision.rationales().contains(RationaleCode::CompositeUniqueNoNulls));
            prop_assert_ne!(decision.risk(), RiskLevel::SafeToApply);
        }
    }
}
