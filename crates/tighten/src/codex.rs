//! Rationale codex: the closed vocabulary used to justify every decision.
//!
//! Each code has a stable text form (the one that appears in reports and
//! emitted script headers), a one-line description and the domain it belongs
//! to. The engine only ever cites codes from this enum, so adding a new reason
//! means adding a variant here first.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Version of the codex vocabulary. Bump when codes are added or retired.
pub const CODEX_VERSION: &str = "1.2.0";

/// Domain a rationale code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodexDomain {
    Nullability,
    Uniqueness,
    ForeignKey,
    /// Facts about the evidence itself (missing, failed, partial).
    Evidence,
    /// Outcomes of the operator policy rather than of the data.
    Policy,
}

/// A canonical rationale code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RationaleCode {
    // Nullability
    Mandatory,
    NotDeclaredMandatory,
    PhysicalNotNull,
    Pk,
    DefaultPresent,
    ComputedColumn,
    DataNoNulls,
    DataHasNulls,
    NullBudgetWithin,
    RemediateBeforeTighten,

    // Uniqueness
    UniqueNoNulls,
    CompositeUniqueNoNulls,
    PhysicalUniqueKey,
    UniqueDuplicatesPresent,
    CompositeUniqueDuplicatesPresent,
    UniquePolicyDisabled,

    // Foreign keys
    FkEnforced,
    DbConstraintPresent,
    DbConstraintNotTrusted,
    DataHasOrphans,
    DataNoOrphans,
    DeleteRuleIgnore,
    DeleteRuleUndeclared,
    CrossSchemaBlocked,
    CrossCatalogBlocked,
    FkCreationDisabled,
    NoCheckCreation,

    // Evidence
    ProfileMissing,
    ProbeFailed,
    ProbeSkipped,
    PartialSample,

    // Policy
    CautiousMode,
}

static BY_CODE: Lazy<HashMap<&'static str, RationaleCode>> = Lazy::new(|| {
    RationaleCode::all()
        .iter()
        .map(|code| (code.code(), *code))
        .collect()
});

impl RationaleCode {
    /// Stable text form of the code.
    pub fn code(&self) -> &'static str {
        match self {
            RationaleCode::Mandatory => "MANDATORY",
            RationaleCode::NotDeclaredMandatory => "NOT_DECLARED_MANDATORY",
            RationaleCode::PhysicalNotNull => "PHYSICAL_NOT_NULL",
            RationaleCode::Pk => "PK",
            RationaleCode::DefaultPresent => "DEFAULT_PRESENT",
            RationaleCode::ComputedColumn => "COMPUTED_COLUMN",
            RationaleCode::DataNoNulls => "DATA_NO_NULLS",
            RationaleCode::DataHasNulls => "DATA_HAS_NULLS",
            RationaleCode::NullBudgetWithin => "NULL_BUDGET_WITHIN",
            RationaleCode::RemediateBeforeTighten => "REMEDIATE_BEFORE_TIGHTEN",
            RationaleCode::UniqueNoNulls => "UNIQUE_NO_NULLS",
            RationaleCode::CompositeUniqueNoNulls => "COMPOSITE_UNIQUE_NO_NULLS",
            RationaleCode::PhysicalUniqueKey => "PHYSICAL_UNIQUE_KEY",
            RationaleCode::UniqueDuplicatesPresent => "UNIQUE_DUPLICATES_PRESENT",
            RationaleCode::CompositeUniqueDuplicatesPresent => {
                "COMPOSITE_UNIQUE_DUPLICATES_PRESENT"
            }
            RationaleCode::UniquePolicyDisabled => "UNIQUE_POLICY_DISABLED",
            RationaleCode::FkEnforced => "FK_ENFORCED",
            RationaleCode::DbConstraintPresent => "DB_CONSTRAINT_PRESENT",
            RationaleCode::DbConstraintNotTrusted => "DB_CONSTRAINT_NOT_TRUSTED",
            RationaleCode::DataHasOrphans => "DATA_HAS_ORPHANS",
            RationaleCode::DataNoOrphans => "DATA_NO_ORPHANS",
            RationaleCode::DeleteRuleIgnore => "DELETE_RULE_IGNORE",
            RationaleCode::DeleteRuleUndeclared => "DELETE_RULE_UNDECLARED",
            RationaleCode::CrossSchemaBlocked => "CROSS_SCHEMA_BLOCKED",
            RationaleCode::CrossCatalogBlocked => "CROSS_CATALOG_BLOCKED",
            RationaleCode::FkCreationDisabled => "FK_CREATION_DISABLED",
            RationaleCode::NoCheckCreation => "NO_CHECK_CREATION",
            RationaleCode::ProfileMissing => "PROFILE_MISSING",
            RationaleCode::ProbeFailed => "PROBE_FAILED",
            RationaleCode::ProbeSkipped => "PROBE_SKIPPED",
            RationaleCode::PartialSample => "PARTIAL_SAMPLE",
            RationaleCode::CautiousMode => "CAUTIOUS_MODE",
        }
    }

    /// One-line human description.
    pub fn description(&self) -> &'static str {
        match self {
            RationaleCode::Mandatory => "Attribute is declared mandatory in the model",
            RationaleCode::NotDeclaredMandatory => {
                "Attribute is not declared mandatory; tightening is data-driven only"
            }
            RationaleCode::PhysicalNotNull => "Column is already NOT NULL in the database",
            RationaleCode::Pk => "Column is part of the primary key",
            RationaleCode::DefaultPresent => "Column carries a default definition",
            RationaleCode::ComputedColumn => "Column is computed and cannot be altered directly",
            RationaleCode::DataNoNulls => "Profiling observed no NULL values",
            RationaleCode::DataHasNulls => "Profiling observed NULL values",
            RationaleCode::NullBudgetWithin => "Observed NULL fraction is within the null budget",
            RationaleCode::RemediateBeforeTighten => {
                "Offending rows must be remediated before the constraint is applied"
            }
            RationaleCode::UniqueNoNulls => "Single-column unique candidate has no NULL values",
            RationaleCode::CompositeUniqueNoNulls => {
                "Every column of the composite unique candidate has no NULL values"
            }
            RationaleCode::PhysicalUniqueKey => "A unique index or constraint already exists",
            RationaleCode::UniqueDuplicatesPresent => "Profiling observed duplicate values",
            RationaleCode::CompositeUniqueDuplicatesPresent => {
                "Profiling observed duplicate value combinations"
            }
            RationaleCode::UniquePolicyDisabled => {
                "Uniqueness enforcement is disabled for this candidate arity"
            }
            RationaleCode::FkEnforced => {
                "The model enforces the relationship through its delete rule"
            }
            RationaleCode::DbConstraintPresent => "A trusted foreign key constraint already exists",
            RationaleCode::DbConstraintNotTrusted => {
                "The existing foreign key constraint is not trusted (created WITH NOCHECK)"
            }
            RationaleCode::DataHasOrphans => "Profiling observed orphaned child rows",
            RationaleCode::DataNoOrphans => "Profiling observed no orphaned child rows",
            RationaleCode::DeleteRuleIgnore => "The relationship delete rule is Ignore",
            RationaleCode::DeleteRuleUndeclared => {
                "The model declares no delete rule for the relationship"
            }
            RationaleCode::CrossSchemaBlocked => "Policy does not allow cross-schema foreign keys",
            RationaleCode::CrossCatalogBlocked => {
                "Policy does not allow cross-catalog foreign keys"
            }
            RationaleCode::FkCreationDisabled => "Policy disables foreign key creation",
            RationaleCode::NoCheckCreation => {
                "Constraint would be created WITH NOCHECK because evidence is incomplete"
            }
            RationaleCode::ProfileMissing => "No profiling evidence exists for this coordinate",
            RationaleCode::ProbeFailed => "The profiling probe failed",
            RationaleCode::ProbeSkipped => "The profiling probe was skipped",
            RationaleCode::PartialSample => "The probe examined fewer rows than the table holds",
            RationaleCode::CautiousMode => "Cautious mode does not tighten on data evidence alone",
        }
    }

    /// Domain this code belongs to.
    pub fn domain(&self) -> CodexDomain {
        match self {
            RationaleCode::Mandatory
            | RationaleCode::NotDeclaredMandatory
            | RationaleCode::PhysicalNotNull
            | RationaleCode::Pk
            | RationaleCode::DefaultPresent
            | RationaleCode::ComputedColumn
            | RationaleCode::DataNoNulls
            | RationaleCode::DataHasNulls
            | RationaleCode::NullBudgetWithin
            | RationaleCode::RemediateBeforeTighten => CodexDomain::Nullability,
            RationaleCode::UniqueNoNulls
            | RationaleCode::CompositeUniqueNoNulls
            | RationaleCode::PhysicalUniqueKey
            | RationaleCode::UniqueDuplicatesPresent
            | RationaleCode::CompositeUniqueDuplicatesPresent => CodexDomain::Uniqueness,
            RationaleCode::FkEnforced
            | RationaleCode::DbConstraintPresent
            | RationaleCode::DbConstraintNotTrusted
            | RationaleCode::DataHasOrphans
            | RationaleCode::DataNoOrphans
            | RationaleCode::DeleteRuleIgnore
            | RationaleCode::DeleteRuleUndeclared => CodexDomain::ForeignKey,
            RationaleCode::ProfileMissing
            | RationaleCode::ProbeFailed
            | RationaleCode::ProbeSkipped
            | RationaleCode::PartialSample => CodexDomain::Evidence,
            RationaleCode::UniquePolicyDisabled
            | RationaleCode::CrossSchemaBlocked
            | RationaleCode::CrossCatalogBlocked
            | RationaleCode::FkCreationDisabled
            | RationaleCode::NoCheckCreation
            | RationaleCode::CautiousMode => CodexDomain::Policy,
        }
    }

    /// Look up a code by its text form (exact, case-sensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        BY_CODE.get(code).copied()
    }

    /// Every code in the codex.
    pub fn all() -> &'static [RationaleCode] {
        &[
            RationaleCode::Mandatory,
            RationaleCode::NotDeclaredMandatory,
            RationaleCode::PhysicalNotNull,
            RationaleCode::Pk,
            RationaleCode::DefaultPresent,
            RationaleCode::ComputedColumn,
            RationaleCode::DataNoNulls,
            RationaleCode::DataHasNulls,
            RationaleCode::NullBudgetWithin,
            RationaleCode::RemediateBeforeTighten,
            RationaleCode::UniqueNoNulls,
            RationaleCode::CompositeUniqueNoNulls,
            RationaleCode::PhysicalUniqueKey,
            RationaleCode::UniqueDuplicatesPresent,
            RationaleCode::CompositeUniqueDuplicatesPresent,
            RationaleCode::UniquePolicyDisabled,
            RationaleCode::FkEnforced,
            RationaleCode::DbConstraintPresent,
            RationaleCode::DbConstraintNotTrusted,
            RationaleCode::DataHasOrphans,
            RationaleCode::DataNoOrphans,
            RationaleCode::DeleteRuleIgnore,
            RationaleCode::DeleteRuleUndeclared,
            RationaleCode::CrossSchemaBlocked,
            RationaleCode::CrossCatalogBlocked,
            RationaleCode::FkCreationDisabled,
            RationaleCode::NoCheckCreation,
            RationaleCode::ProfileMissing,
            RationaleCode::ProbeFailed,
            RationaleCode::ProbeSkipped,
            RationaleCode::PartialSample,
            RationaleCode::CautiousMode,
        ]
    }
}

// Codes order by their text form so rationale sets read alphabetically.
impl Ord for RationaleCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code().cmp(other.code())
    }
}

impl PartialOrd for RationaleCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RationaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Ordered, deduplicated set of rationale codes attached to a decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RationaleSet(BTreeSet<RationaleCode>);

impl RationaleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: RationaleCode) {
        self.0.insert(code);
    }

    /// Insert `code` only when `condition` holds.
    pub fn insert_if(&mut self, condition: bool, code: RationaleCode) {
        if condition {
            self.0.insert(code);
        }
    }

    pub fn contains(&self, code: RationaleCode) -> bool {
        self.0.contains(&code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RationaleCode> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text codes in canonical order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.0.iter().map(|c| c.code()).collect()
    }
}

impl FromIterator<RationaleCode> for RationaleSet {
    fn from_iter<I: IntoIterator<Item = RationaleCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let unique: std::collections::HashSet<_> =
            RationaleCode::all().iter().map(|c| c.code()).collect();
        assert_eq!(unique.len(), RationaleCode::all().len());
    }

    #[test]
    fn test_serde_form_matches_code() {
        for code in RationaleCode::all() {
            let json = serde_json::to_string(code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.code()));
        }
    }

    #[test]
    fn test_from_code_lookup() {
        assert_eq!(RationaleCode::from_code("PK"), Some(RationaleCode::Pk));
        assert_eq!(
            RationaleCode::from_code("DATA_HAS_ORPHANS"),
            Some(RationaleCode::DataHasOrphans)
        );
        assert_eq!(RationaleCode::from_code("pk"), None);
    }

    #[test]
    fn test_rationale_set_orders_by_code_text() {
        let mut set = RationaleSet::new();
        set.insert(RationaleCode::Pk);
        set.insert(RationaleCode::PhysicalNotNull);
        set.insert(RationaleCode::Mandatory);
        set.insert(RationaleCode::DataNoNulls);
        set.insert(RationaleCode::Pk);

        assert_eq!(
            set.codes(),
            vec!["DATA_NO_NULLS", "MANDATORY", "PHYSICAL_NOT_NULL", "PK"]
        );
    }

    #[test]
    fn test_every_code_has_description() {
        assert!(RationaleCode::all().iter().all(|c| !c.description().is_empty()));
        assert_eq!(RationaleCode::CautiousMode.domain(), CodexDomain::Policy);
    }
}
