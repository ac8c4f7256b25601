//! Decision records: one per evaluated column, unique candidate or
//! foreign key.
//!
//! The three domains share a [`DecisionHeader`] but carry different
//! coordinates, so [`Decision`] is a tagged union that consumers can match
//! on exhaustively.

mod citations;
mod remediation;

pub use citations::Citations;
pub use remediation::{RemediationAction, RemediationPlan};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codex::RationaleSet;
use crate::evidence::ColumnRef;
use crate::model::DeleteRule;

/// Constraint family a decision is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Nullability,
    Uniqueness,
    ForeignKey,
}

impl Domain {
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Nullability => "Nullability",
            Domain::Uniqueness => "Uniqueness",
            Domain::ForeignKey => "ForeignKey",
        }
    }
}

/// What the engine concluded for a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Existing constraint confirmed; no change proposed.
    Validation,
    /// Evidence supports adding a constraint.
    Recommendation,
    /// Data violates declared intent; manual remediation needed.
    Contradiction,
    /// Insufficient evidence, or policy withholds a claim.
    NoAction,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Validation => "Validation",
            Category::Recommendation => "Recommendation",
            Category::Contradiction => "Contradiction",
            Category::NoAction => "NoAction",
        }
    }

    /// Whether emission renders this decision as safe-to-apply output.
    pub fn is_safe_output(&self) -> bool {
        matches!(self, Category::Validation | Category::Recommendation)
    }
}

/// Severity/confidence of a decision, strongest assurance first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Backed by a full-sample, zero-violation probe.
    SafeToApply,
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::SafeToApply => "SafeToApply",
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

/// How a recommended foreign key would be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintCreation {
    /// Existing rows are checked on creation.
    WithCheck,
    /// Created WITH NOCHECK; existing rows are not verified.
    NoCheck,
}

/// Fields shared by every decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionHeader {
    pub module: String,
    pub entity: String,
    pub category: Category,
    pub risk: RiskLevel,
    pub rationales: RationaleSet,
    pub citations: Citations,
}

impl DecisionHeader {
    pub fn new(
        module: impl Into<String>,
        entity: impl Into<String>,
        category: Category,
        risk: RiskLevel,
        rationales: RationaleSet,
        citations: Citations,
    ) -> Self {
        // Contradictions are at least Moderate.
        let risk = if category == Category::Contradiction {
            risk.max(RiskLevel::Moderate)
        } else {
            risk
        };
        Self {
            module: module.into(),
            entity: entity.into(),
            category,
            risk,
            rationales,
            citations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullabilityDecision {
    pub header: DecisionHeader,
    pub column: ColumnRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<RemediationPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniquenessDecision {
    pub header: DecisionHeader,
    pub schema: String,
    pub table: String,
    pub index: String,
    pub columns: Vec<String>,
}

impl UniquenessDecision {
    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDecision {
    pub header: DecisionHeader,
    pub name: String,
    pub source: ColumnRef,
    pub target: ColumnRef,
    /// Delete rule after applying the missing-rule policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_rule: Option<DeleteRule>,
    /// Only set on recommendations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation: Option<ConstraintCreation>,
}

/// A decision for one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum Decision {
    Nullability(NullabilityDecision),
    Uniqueness(UniquenessDecision),
    ForeignKey(ForeignKeyDecision),
}

/// Canonical ordering key: schema, table, column set, domain, then name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    schema: String,
    table: String,
    columns: String,
    domain: Domain,
    name: String,
}

impl Decision {
    pub fn header(&self) -> &DecisionHeader {
        match self {
            Decision::Nullability(d) => &d.header,
            Decision::Uniqueness(d) => &d.header,
            Decision::ForeignKey(d) => &d.header,
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            Decision::Nullability(_) => Domain::Nullability,
            Decision::Uniqueness(_) => Domain::Uniqueness,
            Decision::ForeignKey(_) => Domain::ForeignKey,
        }
    }

    pub fn category(&self) -> Category {
        self.header().category
    }

    pub fn risk(&self) -> RiskLevel {
        self.header().risk
    }

    pub fn rationales(&self) -> &RationaleSet {
        &self.header().rationales
    }

    pub fn module(&self) -> &str {
        &self.header().module
    }

    pub fn schema(&self) -> &str {
        match self {
            Decision::Nullability(d) => &d.column.schema,
            Decision::Uniqueness(d) => &d.schema,
            Decision::ForeignKey(d) => &d.source.schema,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            Decision::Nullability(d) => &d.column.table,
            Decision::Uniqueness(d) => &d.table,
            Decision::ForeignKey(d) => &d.source.table,
        }
    }

    pub fn sort_key(&self) -> SortKey {
        let (columns, name) = match self {
            Decision::Nullability(d) => (d.column.column.clone(), String::new()),
            Decision::Uniqueness(d) => (d.columns.join(","), d.index.clone()),
            Decision::ForeignKey(d) => (d.source.column.clone(), d.name.clone()),
        };
        SortKey {
            schema: self.schema().to_string(),
            table: self.table().to_string(),
            columns,
            domain: self.domain(),
            name,
        }
    }

    /// Human-readable coordinate, e.g. `dbo.T.C` or `dbo.T(A,B) [IX_T]`.
    pub fn coordinate(&self) -> String {
        match self {
            Decision::Nullability(d) => d.column.to_string(),
            Decision::Uniqueness(d) => {
                format!("{}.{}({}) [{}]", d.schema, d.table, d.columns.join(","), d.index)
            }
            Decision::ForeignKey(d) => format!("{} -> {} [{}]", d.source, d.target, d.name),
        }
    }

    /// Comment block an emitter prints above the decision's DDL.
    pub fn audit_header(&self) -> String {
        let header = self.header();
        let codes = header.rationales.codes().join(", ");
        let mut lines = vec![
            format!("-- [{}] {}", self.domain().label(), self.coordinate()),
            format!(
                "-- Category: {}  Risk: {}",
                header.category.label(),
                header.risk.label()
            ),
            format!("-- Rationale: {}", if codes.is_empty() { "none" } else { &codes }),
            format!("-- Evidence: {}", header.citations),
        ];
        if let Decision::Nullability(NullabilityDecision {
            remediation: Some(plan),
            ..
        }) = self
        {
            lines.push(format!(
                "-- Remediation: {} ({} rows)",
                plan.action.label(),
                plan.affected_rows
            ));
        }
        if let Decision::ForeignKey(ForeignKeyDecision {
            creation: Some(ConstraintCreation::NoCheck),
            ..
        }) = self
        {
            lines.push("-- Creation: WITH NOCHECK".to_string());
        }
        lines.join("\n")
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.domain().label(),
            self.coordinate(),
            self.category().label(),
            self.risk().label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codex::RationaleCode;

    fn nullability(category: Category, risk: RiskLevel) -> Decision {
        Decision::Nullability(NullabilityDecision {
            header: DecisionHeader::new(
                "Sales",
                "Order",
                category,
                risk,
                [RationaleCode::Mandatory, RationaleCode::DataHasNulls]
                    .into_iter()
                    .collect(),
                Citations::new().with_row_count(10).with_null_count(2),
            ),
            column: ColumnRef::new("dbo", "OSUSR_ABC_ORDER", "DELIVERYDATE"),
            remediation: None,
        })
    }

    #[test]
    fn test_contradiction_risk_floor() {
        let decision = nullability(Category::Contradiction, RiskLevel::Low);
        assert_eq!(decision.risk(), RiskLevel::Moderate);

        let decision = nullability(Category::Validation, RiskLevel::Low);
        assert_eq!(decision.risk(), RiskLevel::Low);
    }

    #[test]
    fn test_risk_ordering() {
        assert!(RiskLevel::SafeToApply < RiskLevel::Low);
        assert!(RiskLevel::Moderate < RiskLevel::High);
    }

    #[test]
    fn test_serialized_domain_tag() {
        let json = serde_json::to_value(nullability(Category::Contradiction, RiskLevel::Moderate))
            .unwrap();
        assert_eq!(json["domain"], "nullability");
        assert_eq!(json["header"]["category"], "contradiction");
        assert_eq!(json["header"]["risk"], "Moderate");
        assert_eq!(
            json["header"]["rationales"],
            serde_json::json!(["DATA_HAS_NULLS", "MANDATORY"])
        );
    }

    #[test]
    fn test_audit_header_cites_codes_and_evidence() {
        let header = nullability(Category::Contradiction, RiskLevel::Moderate).audit_header();
        assert!(header.starts_with("-- [Nullability] dbo.OSUSR_ABC_ORDER.DELIVERYDATE"));
        assert!(header.contains("-- Rationale: DATA_HAS_NULLS, MANDATORY"));
        assert!(header.contains("-- Evidence: rows=10 nulls=2"));
    }

    #[test]
    fn test_sort_key_orders_domain_after_columns() {
        let a = nullability(Category::NoAction, RiskLevel::Low);
        let b = Decision::Uniqueness(UniquenessDecision {
            header: DecisionHeader::new(
                "Sales",
                "Order",
                Category::NoAction,
                RiskLevel::Low,
                RationaleSet::new(),
                Citations::new(),
            ),
            schema: "dbo".into(),
            table: "OSUSR_ABC_ORDER".into(),
            index: "IX".into(),
            columns: vec!["DELIVERYDATE".into()],
        });
        assert!(a.sort_key() < b.sort_key());
    }
}
