//! Evidence snapshot and the lookup index the engine reads it through.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TightenError};

use super::identity::ColumnRef;
use super::records::{
    candidate_key, fk_key, ColumnEvidence, ForeignKeyEvidence, UniqueCandidateEvidence,
};

/// All profiling evidence gathered for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceSnapshot {
    #[serde(default)]
    pub columns: Vec<ColumnEvidence>,
    #[serde(default)]
    pub unique_candidates: Vec<UniqueCandidateEvidence>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyEvidence>,
}

impl EvidenceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, evidence: ColumnEvidence) -> Self {
        self.columns.push(evidence);
        self
    }

    pub fn with_unique_candidate(mut self, evidence: UniqueCandidateEvidence) -> Self {
        self.unique_candidates.push(evidence);
        self
    }

    pub fn with_foreign_key(mut self, evidence: ForeignKeyEvidence) -> Self {
        self.foreign_keys.push(evidence);
        self
    }

    /// Parse and validate a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: EvidenceSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Validate every record and reject ambiguous duplicates.
    pub fn validate(&self) -> Result<()> {
        for ev in &self.columns {
            ev.validate()?;
        }
        for ev in &self.unique_candidates {
            ev.validate()?;
        }
        for ev in &self.foreign_keys {
            ev.validate()?;
        }
        // Building the index surfaces duplicate coordinates.
        self.index().map(|_| ())
    }

    /// Build the case-insensitive lookup index.
    pub fn index(&self) -> Result<EvidenceIndex<'_>> {
        let mut index = EvidenceIndex::default();
        for ev in &self.columns {
            if index.columns.insert(ev.column.key(), ev).is_some() {
                return Err(duplicate("column", &ev.column.to_string()));
            }
        }
        for ev in &self.unique_candidates {
            if index.unique_candidates.insert(ev.key(), ev).is_some() {
                return Err(duplicate(
                    "unique candidate",
                    &format!("{}.{}({})", ev.schema, ev.table, ev.columns.join(",")),
                ));
            }
        }
        for ev in &self.foreign_keys {
            if index.foreign_keys.insert(ev.key(), ev).is_some() {
                return Err(duplicate("foreign key", &ev.source.to_string()));
            }
        }
        Ok(index)
    }
}

fn duplicate(kind: &str, what: &str) -> TightenError {
    TightenError::Evidence(format!("duplicate {} evidence for {}", kind, what))
}

/// Borrowed lookup tables over an [`EvidenceSnapshot`].
#[derive(Debug, Default)]
pub struct EvidenceIndex<'a> {
    columns: HashMap<String, &'a ColumnEvidence>,
    unique_candidates: HashMap<String, &'a UniqueCandidateEvidence>,
    foreign_keys: HashMap<String, &'a ForeignKeyEvidence>,
}

impl<'a> EvidenceIndex<'a> {
    pub fn column(&self, column: &ColumnRef) -> Option<&'a ColumnEvidence> {
        self.columns.get(&column.key()).copied()
    }

    pub fn unique_candidate(
        &self,
        schema: &str,
        table: &str,
        columns: &[String],
    ) -> Option<&'a UniqueCandidateEvidence> {
        self.unique_candidates
            .get(&candidate_key(schema, table, columns))
            .copied()
    }

    pub fn foreign_key(
        &self,
        source: &ColumnRef,
        target_schema: &str,
        target_table: &str,
    ) -> Option<&'a ForeignKeyEvidence> {
        self.foreign_keys
            .get(&fk_key(source, target_schema, target_table))
            .copied()
    }
}
