//! Evidence citations: the literal facts behind a decision's rationale.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evidence::{ProbeOutcome, ProbeStatus};

/// Facts cited verbatim next to the rationale codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_status: Option<ProbeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_duplicates: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_groups: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_orphans: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphan_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_present: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_trusted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_definition: Option<String>,
}

impl Citations {
    /// Create empty citations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cite a probe. Failed and skipped probes contribute only their
    /// metadata; the attempted sample is still recorded.
    pub fn with_probe(mut self, probe: &ProbeOutcome) -> Self {
        self.probe_status = Some(probe.status);
        self.captured_at = Some(probe.captured_at);
        self.sample_size = Some(probe.sample_size);
        self.probe_note = probe.note.clone();
        self
    }

    pub fn with_row_count(mut self, rows: u64) -> Self {
        self.row_count = Some(rows);
        self
    }

    pub fn with_null_count(mut self, nulls: u64) -> Self {
        self.null_count = Some(nulls);
        self
    }

    pub fn with_duplicates(mut self, has_duplicates: bool, groups: u64) -> Self {
        self.has_duplicates = Some(has_duplicates);
        if groups > 0 {
            self.duplicate_groups = Some(groups);
        }
        self
    }

    pub fn with_orphans(mut self, has_orphans: bool, count: u64) -> Self {
        self.has_orphans = Some(has_orphans);
        if count > 0 {
            self.orphan_count = Some(count);
        }
        self
    }

    pub fn with_constraint(mut self, present: bool, trusted: bool) -> Self {
        self.constraint_present = Some(present);
        if present {
            self.constraint_trusted = Some(trusted);
        }
        self
    }

    pub fn with_default_definition(mut self, definition: Option<&str>) -> Self {
        self.default_definition = definition.map(str::to_string);
        self
    }

    /// Whether nothing at all is cited.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Citations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(rows) = self.row_count {
            parts.push(format!("rows={}", rows));
        }
        if let Some(sample) = self.sample_size {
            parts.push(format!("sample={}", sample));
        }
        if let Some(nulls) = self.null_count {
            parts.push(format!("nulls={}", nulls));
        }
        if let Some(dup) = self.has_duplicates {
            parts.push(format!("duplicates={}", dup));
        }
        if let Some(groups) = self.duplicate_groups {
            parts.push(format!("duplicate_groups={}", groups));
        }
        if let Some(orphans) = self.has_orphans {
            parts.push(format!("orphans={}", orphans));
        }
        if let Some(count) = self.orphan_count {
            parts.push(format!("orphan_count={}", count));
        }
        if let Some(present) = self.constraint_present {
            parts.push(format!("constraint={}", present));
        }
        if let Some(trusted) = self.constraint_trusted {
            parts.push(format!("trusted={}", trusted));
        }
        if let Some(default) = &self.default_definition {
            parts.push(format!("default={}", default));
        }
        if let Some(status) = self.probe_status {
            parts.push(format!("probe={}", status.label()));
        }
        if let Some(at) = self.captured_at {
            parts.push(format!("captured={}", at.to_rfc3339()));
        }
        if let Some(note) = &self.probe_note {
            parts.push(format!("note=\"{}\"", note));
        }
        if parts.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_citation_builder() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        let citations = Citations::new()
            .with_probe(&ProbeOutcome::succeeded(at, 100))
            .with_row_count(1000)
            .with_null_count(5);

        assert_eq!(citations.sample_size, Some(100));
        assert_eq!(
            citations.to_string(),
            "rows=1000 sample=100 nulls=5 probe=Succeeded captured=2025-01-15T10:00:00+00:00"
        );
    }

    #[test]
    fn test_empty_citations() {
        assert!(Citations::new().is_empty());
        assert_eq!(Citations::new().to_string(), "none");
    }
}
