//! Fuzz target for engine invariants.
//!
//! Builds a single-entity model and evidence from arbitrary input, then
//! checks that every coordinate gets exactly one decision, that results do
//! not depend on thread count, and that observed violations are never
//! reported as safe.

#![no_main]

use arbitrary::Arbitrary;
use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use tighten::evidence::{ColumnEvidence, ForeignKeyEvidence, UniqueCandidateEvidence};
use tighten::model::{Attribute, DeleteRule, Entity, Index, Module, Relationship};
use tighten::{
    Category, ColumnRef, Decision, EngineOptions, EvidenceSnapshot, PolicyConfig, ProbeOutcome,
    RiskMode, SchemaModel, Tightener,
};

#[derive(Debug, Arbitrary)]
struct FuzzColumn {
    mandatory: bool,
    identifier: bool,
    profiled: bool,
    physically_not_null: bool,
    rows: u16,
    sample: u16,
    nulls: u16,
}

#[derive(Debug, Arbitrary)]
struct FuzzScenario {
    mode: u8,
    columns: Vec<FuzzColumn>,
    duplicates: Option<u8>,
    orphans: Option<u8>,
    delete_rule: Option<u8>,
}

const TABLE: &str = "OSUSR_FZ_T";

fuzz_target!(|scenario: FuzzScenario| {
    if scenario.columns.is_empty() || scenario.columns.len() > 16 {
        return;
    }
    let captured = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
    let mode = RiskMode::all()[scenario.mode as usize % 3];

    let mut entity = Entity::new("T", "dbo", TABLE);
    let mut snapshot = EvidenceSnapshot::new();
    for (i, c) in scenario.columns.iter().enumerate() {
        let name = format!("C{}", i);
        let mut attribute = Attribute::new(&name, &name);
        if c.mandatory {
            attribute = attribute.mandatory();
        }
        if c.identifier {
            attribute = attribute.identifier();
        }
        entity = entity.with_attribute(attribute);

        if c.profiled {
            let rows = c.rows as u64;
            let sample = (c.sample as u64).min(rows);
            let mut evidence = ColumnEvidence::new(
                ColumnRef::new("dbo", TABLE, &name),
                rows,
                ProbeOutcome::succeeded(captured, sample),
            )
            .with_null_count(c.nulls as u64);
            if c.physically_not_null {
                evidence = evidence.not_null();
            }
            snapshot = snapshot.with_column(evidence);
        }
    }

    let index = Index::new("IX_FZ", vec!["C0".to_string()]).unique();
    if let Some(groups) = scenario.duplicates {
        let mut candidate = UniqueCandidateEvidence::new(
            "dbo",
            TABLE,
            index.columns.clone(),
            100,
            ProbeOutcome::succeeded(captured, 100),
        );
        if groups > 0 {
            candidate = candidate.with_duplicates(groups as u64);
        }
        snapshot = snapshot.with_unique_candidate(candidate);
    }
    entity = entity.with_index(index);

    entity = entity.with_relationship(Relationship {
        name: "FK_FZ".to_string(),
        column: "C0".to_string(),
        target_entity: "P".to_string(),
        target_schema: "dbo".to_string(),
        target_table: "OSUSR_FZ_P".to_string(),
        target_column: "ID".to_string(),
        target_catalog: None,
        delete_rule: scenario.delete_rule.map(|r| match r % 3 {
            0 => DeleteRule::Protect,
            1 => DeleteRule::Delete,
            _ => DeleteRule::Ignore,
        }),
    });
    if let Some(orphans) = scenario.orphans {
        let mut fk = ForeignKeyEvidence::new(
            ColumnRef::new("dbo", TABLE, "C0"),
            ColumnRef::new("dbo", "OSUSR_FZ_P", "ID"),
            100,
            ProbeOutcome::succeeded(captured, 100),
        );
        if orphans > 0 {
            fk = fk.with_orphans(orphans as u64);
        }
        snapshot = snapshot.with_foreign_key(fk);
    }

    let model = SchemaModel::new().with_module(Module::new("Fuzz").with_entity(entity));
    let policy = PolicyConfig::default().with_mode(mode);
    let Ok(tightener) = Tightener::new().with_policy(policy) else {
        return;
    };

    let Ok(sequential) = tightener
        .clone()
        .with_options(EngineOptions::sequential())
        .evaluate(&model, &snapshot)
    else {
        return;
    };
    let parallel = tightener
        .with_options(EngineOptions::default().with_max_parallelism(4))
        .evaluate(&model, &snapshot)
        .expect("parallel run failed where sequential succeeded");

    assert_eq!(sequential.decisions.len(), model.coordinate_count());
    assert_eq!(sequential, parallel);

    for decision in &sequential.decisions {
        let violated = match decision {
            Decision::Nullability(d) => snapshot
                .columns
                .iter()
                .find(|c| c.column == d.column)
                .and_then(|c| c.observed_nulls())
                .is_some_and(|n| n > 0),
            Decision::Uniqueness(_) => scenario.duplicates.is_some_and(|g| g > 0),
            Decision::ForeignKey(_) => scenario.orphans.is_some_and(|o| o > 0),
        };
        if violated {
            assert!(
                !decision.category().is_safe_output(),
                "violation reported as {:?}: {}",
                decision.category(),
                decision
            );
        }
        if decision.category() == Category::Contradiction {
            assert!(violated, "contradiction without violation: {}", decision);
        }
    }
});
