//! Golden scenario tests for the decision engine.
//!
//! Each case directory under `tests/fixtures/golden/` holds:
//! - `model.json`: the declared schema model
//! - `evidence.json`: the profiling snapshot
//! - `manifest.json`: the modes to run and the decisions expected in each
//!
//! Expected rationale sets are compared exactly, so adding a code to a
//! decision path shows up here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tighten::{
    Category, Decision, DecisionReport, Domain, EngineOptions, EvidenceSnapshot, PolicyConfig,
    RiskLevel, RiskMode, SchemaModel, Tightener,
};

/// Manifest describing a golden test case.
#[derive(Debug, Deserialize)]
#[allow(dead_code)] // Name and description document the fixture
struct GoldenManifest {
    name: String,
    description: String,
    modes: Vec<RiskMode>,
    expected: Vec<ExpectedDecision>,
}

#[derive(Debug, Deserialize)]
struct ExpectedDecision {
    domain: Domain,
    coordinate: String,
    category: Category,
    risk: RiskLevel,
    #[serde(default)]
    rationales: Option<Vec<String>>,
}

fn case_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/golden")
        .join(name)
}

fn read(dir: &Path, file: &str) -> String {
    let path = dir.join(file);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e))
}

fn load_manifest(dir: &Path) -> GoldenManifest {
    serde_json::from_str(&read(dir, "manifest.json"))
        .unwrap_or_else(|e| panic!("Failed to parse manifest in {:?}: {}", dir, e))
}

fn evaluate(dir: &Path, mode: RiskMode, options: EngineOptions) -> DecisionReport {
    let model = SchemaModel::from_json(&read(dir, "model.json"))
        .unwrap_or_else(|e| panic!("Invalid model in {:?}: {}", dir, e));
    let evidence = EvidenceSnapshot::from_json(&read(dir, "evidence.json"))
        .unwrap_or_else(|e| panic!("Invalid evidence in {:?}: {}", dir, e));
    Tightener::new()
        .with_policy(PolicyConfig::default().with_mode(mode))
        .expect("default policy is valid")
        .with_options(options)
        .evaluate(&model, &evidence)
        .expect("evaluation succeeds")
}

fn find<'a>(report: &'a DecisionReport, expected: &ExpectedDecision) -> &'a Decision {
    report
        .decisions
        .iter()
        .find(|d| d.domain() == expected.domain && d.coordinate() == expected.coordinate)
        .unwrap_or_else(|| {
            panic!(
                "No {:?} decision for '{}' in {:?}",
                expected.domain,
                expected.coordinate,
                report.decisions.iter().map(|d| d.coordinate()).collect::<Vec<_>>()
            )
        })
}

fn assert_expected(report: &DecisionReport, manifest: &GoldenManifest, mode: RiskMode) {
    for expected in &manifest.expected {
        let actual = find(report, expected);
        assert_eq!(
            actual.category(),
            expected.category,
            "{} [{}]: category",
            expected.coordinate,
            mode
        );
        assert_eq!(actual.risk(), expected.risk, "{} [{}]: risk", expected.coordinate, mode);
        if let Some(codes) = &expected.rationales {
            assert_eq!(
                actual.rationales().codes(),
                codes.iter().map(String::as_str).collect::<Vec<_>>(),
                "{} [{}]: rationale",
                expected.coordinate,
                mode
            );
        }
    }
}

// =============================================================================
// Golden Test Cases
// =============================================================================

macro_rules! golden_test {
    ($name:ident, $path:expr) => {
        #[test]
        fn $name() {
            let dir = case_dir($path);
            let manifest = load_manifest(&dir);
            assert!(!manifest.modes.is_empty(), "manifest lists no modes");

            for mode in &manifest.modes {
                let report = evaluate(&dir, *mode, EngineOptions::sequential());
                assert!(report.complete);
                assert_expected(&report, &manifest, *mode);

                // Parallel evaluation must not change the report.
                let parallel =
                    evaluate(&dir, *mode, EngineOptions::default().with_max_parallelism(4));
                assert_eq!(report, parallel);
            }
        }
    };
}

golden_test!(test_golden_pk_not_null_validation, "pk_not_null_validation");
golden_test!(test_golden_mandatory_not_null_safe, "mandatory_not_null_safe");
golden_test!(test_golden_mandatory_with_nulls, "mandatory_with_nulls");
golden_test!(test_golden_unique_with_duplicates, "unique_with_duplicates");
golden_test!(test_golden_fk_with_orphans, "fk_with_orphans");
golden_test!(test_golden_fk_trusted_constraint, "fk_trusted_constraint");

// =============================================================================
// Report-level checks on the fixtures
// =============================================================================

#[test]
fn test_golden_reports_are_stable() {
    let dir = case_dir("mandatory_with_nulls");
    let first = evaluate(&dir, RiskMode::EvidenceGated, EngineOptions::sequential());
    let second = evaluate(&dir, RiskMode::EvidenceGated, EngineOptions::sequential());
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
}

#[test]
fn test_golden_partial_sample_is_diagnosed() {
    let dir = case_dir("fk_with_orphans");
    let report = evaluate(&dir, RiskMode::Aggressive, EngineOptions::sequential());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, tighten::engine::DiagnosticKind::PartialSample);
    assert_eq!(report.contradictions().len(), 1);
    assert_eq!(report.modules["Sales"].by_category.contradiction, 1);
}

#[test]
fn test_golden_audit_header_cites_evidence() {
    let dir = case_dir("mandatory_with_nulls");
    let report = evaluate(&dir, RiskMode::EvidenceGated, EngineOptions::sequential());
    let decision = report.needs_remediation().next().expect("one contradiction");
    let header = decision.audit_header();
    assert!(header.contains("-- Rationale: DATA_HAS_NULLS, MANDATORY"));
    assert!(header.contains("rows=1000 sample=100 nulls=5"));
}
