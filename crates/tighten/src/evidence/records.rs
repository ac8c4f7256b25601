//! Profiling evidence for columns, unique candidates and foreign keys.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TightenError};

use super::identity::{check_identifier, lookup_key, ColumnRef};
use super::probe::ProbeOutcome;

/// Profiling facts about one physical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnEvidence {
    pub column: ColumnRef,
    /// Physical nullability in the catalog.
    pub is_nullable: bool,
    #[serde(default)]
    pub is_computed: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_unique_key: bool,
    /// Default constraint definition text, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_definition: Option<String>,
    pub row_count: u64,
    #[serde(default)]
    pub null_count: u64,
    pub probe: ProbeOutcome,
}

impl ColumnEvidence {
    /// Create evidence for a nullable, non-key column with no nulls observed.
    pub fn new(column: ColumnRef, row_count: u64, probe: ProbeOutcome) -> Self {
        Self {
            column,
            is_nullable: true,
            is_computed: false,
            is_primary_key: false,
            is_unique_key: false,
            default_definition: None,
            row_count,
            null_count: 0,
            probe,
        }
    }

    /// Mark as physically NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    /// Mark as a primary key column. Primary keys are physically NOT NULL.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    pub fn unique_key(mut self) -> Self {
        self.is_unique_key = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.is_computed = true;
        self
    }

    pub fn with_default(mut self, definition: impl Into<String>) -> Self {
        self.default_definition = Some(definition.into());
        self
    }

    pub fn with_null_count(mut self, null_count: u64) -> Self {
        self.null_count = null_count;
        self
    }

    /// Null count, when the probe is authoritative.
    pub fn observed_nulls(&self) -> Option<u64> {
        self.probe.is_authoritative().then_some(self.null_count)
    }

    /// Whether the probe examined every row.
    pub fn is_full_sample(&self) -> bool {
        self.probe.covers(self.row_count)
    }

    /// Whether the catalog alone proves the column cannot hold NULL.
    pub fn is_physically_not_null(&self) -> bool {
        !self.is_nullable || self.is_primary_key
    }

    pub fn validate(&self) -> Result<()> {
        self.column.validate()?;
        check_counts(&self.column.to_string(), self.row_count, &self.probe)?;
        if self.probe.is_authoritative() && self.null_count > self.probe.sample_size {
            return Err(TightenError::Evidence(format!(
                "{}: null count {} exceeds sample size {}",
                self.column, self.null_count, self.probe.sample_size
            )));
        }
        Ok(())
    }
}

/// Duplicate-probe facts about a single- or multi-column unique candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniqueCandidateEvidence {
    pub schema: String,
    pub table: String,
    /// Participating columns, in key order.
    pub columns: Vec<String>,
    pub has_duplicates: bool,
    /// Number of duplicated key groups, when the collector counted them.
    #[serde(default)]
    pub duplicate_groups: u64,
    /// Whether a unique index or constraint already exists on the column set.
    #[serde(default)]
    pub constraint_present: bool,
    pub row_count: u64,
    pub probe: ProbeOutcome,
}

impl UniqueCandidateEvidence {
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        columns: Vec<String>,
        row_count: u64,
        probe: ProbeOutcome,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            columns,
            has_duplicates: false,
            duplicate_groups: 0,
            constraint_present: false,
            row_count,
            probe,
        }
    }

    pub fn with_duplicates(mut self, groups: u64) -> Self {
        self.has_duplicates = true;
        self.duplicate_groups = groups;
        self
    }

    pub fn with_constraint(mut self) -> Self {
        self.constraint_present = true;
        self
    }

    pub fn is_full_sample(&self) -> bool {
        self.probe.covers(self.row_count)
    }

    /// Whether duplicates were observed by an authoritative probe.
    pub fn observed_duplicates(&self) -> Option<bool> {
        self.probe.is_authoritative().then_some(self.has_duplicates)
    }

    pub(crate) fn key(&self) -> String {
        candidate_key(&self.schema, &self.table, &self.columns)
    }

    pub fn validate(&self) -> Result<()> {
        check_identifier("schema", &self.schema)?;
        check_identifier("table", &self.table)?;
        if self.columns.is_empty() {
            return Err(TightenError::Evidence(format!(
                "{}.{}: unique candidate without columns",
                self.schema, self.table
            )));
        }
        for column in &self.columns {
            check_identifier("column", column)?;
        }
        let label = format!("{}.{}({})", self.schema, self.table, self.columns.join(","));
        check_counts(&label, self.row_count, &self.probe)?;
        if self.duplicate_groups > 0 && !self.has_duplicates {
            return Err(TightenError::Evidence(format!(
                "{}: duplicate groups reported without duplicates flag",
                label
            )));
        }
        Ok(())
    }
}

pub(crate) fn candidate_key(schema: &str, table: &str, columns: &[String]) -> String {
    let mut parts: Vec<&str> = vec![schema, table];
    parts.extend(columns.iter().map(String::as_str));
    lookup_key(&parts)
}

/// Orphan-probe facts about one foreign key reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyEvidence {
    pub source: ColumnRef,
    pub target: ColumnRef,
    /// Whether a database constraint already exists.
    #[serde(default)]
    pub has_constraint: bool,
    /// Whether the existing constraint is untrusted (created WITH NOCHECK).
    #[serde(default)]
    pub is_no_check: bool,
    pub has_orphans: bool,
    #[serde(default)]
    pub orphan_count: u64,
    /// Rows in the source table.
    pub row_count: u64,
    pub probe: ProbeOutcome,
}

impl ForeignKeyEvidence {
    pub fn new(source: ColumnRef, target: ColumnRef, row_count: u64, probe: ProbeOutcome) -> Self {
        Self {
            source,
            target,
            has_constraint: false,
            is_no_check: false,
            has_orphans: false,
            orphan_count: 0,
            row_count,
            probe,
        }
    }

    pub fn with_constraint(mut self) -> Self {
        self.has_constraint = true;
        self
    }

    /// Existing constraint created WITH NOCHECK.
    pub fn with_untrusted_constraint(mut self) -> Self {
        self.has_constraint = true;
        self.is_no_check = true;
        self
    }

    pub fn with_orphans(mut self, count: u64) -> Self {
        self.has_orphans = true;
        self.orphan_count = count;
        self
    }

    pub fn is_full_sample(&self) -> bool {
        self.probe.covers(self.row_count)
    }

    pub fn observed_orphans(&self) -> Option<bool> {
        self.probe.is_authoritative().then_some(self.has_orphans)
    }

    /// A constraint that exists and is enforced for existing rows.
    pub fn is_trusted_constraint(&self) -> bool {
        self.has_constraint && !self.is_no_check
    }

    pub(crate) fn key(&self) -> String {
        fk_key(&self.source, &self.target.schema, &self.target.table)
    }

    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        self.target.validate()?;
        let label = format!("{} -> {}", self.source, self.target);
        check_counts(&label, self.row_count, &self.probe)?;
        if self.is_no_check && !self.has_constraint {
            return Err(TightenError::Evidence(format!(
                "{}: no-check flag set without an existing constraint",
                label
            )));
        }
        if self.orphan_count > 0 && !self.has_orphans {
            return Err(TightenError::Evidence(format!(
                "{}: orphan count reported without orphans flag",
                label
            )));
        }
        Ok(())
    }
}

pub(crate) fn fk_key(source: &ColumnRef, target_schema: &str, target_table: &str) -> String {
    lookup_key(&[
        &source.schema,
        &source.table,
        &source.column,
        target_schema,
        target_table,
    ])
}

fn check_counts(label: &str, row_count: u64, probe: &ProbeOutcome) -> Result<()> {
    if probe.sample_size > row_count {
        return Err(TightenError::Evidence(format!(
            "{}: sample size {} exceeds row count {}",
            label, probe.sample_size, row_count
        )));
    }
    Ok(())
}
