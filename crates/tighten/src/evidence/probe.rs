//! Probe outcomes: how a single evidence-gathering attempt ended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal status of a profiling probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Succeeded,
    Failed,
    Skipped,
}

impl ProbeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProbeStatus::Succeeded => "Succeeded",
            ProbeStatus::Failed => "Failed",
            ProbeStatus::Skipped => "Skipped",
        }
    }
}

/// Outcome of one probe, with the metadata needed to explain it.
///
/// Failed and skipped probes keep their timestamp and attempted sample so
/// diagnostics can say why no claim was made; their counts are never
/// authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub status: ProbeStatus,
    pub captured_at: DateTime<Utc>,
    /// Rows actually examined (attempted, for failed probes).
    #[serde(default)]
    pub sample_size: u64,
    /// Collector-supplied reason for a failure or skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ProbeOutcome {
    pub fn succeeded(captured_at: DateTime<Utc>, sample_size: u64) -> Self {
        Self {
            status: ProbeStatus::Succeeded,
            captured_at,
            sample_size,
            note: None,
        }
    }

    pub fn failed(captured_at: DateTime<Utc>, note: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Failed,
            captured_at,
            sample_size: 0,
            note: Some(note.into()),
        }
    }

    pub fn skipped(captured_at: DateTime<Utc>, note: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Skipped,
            captured_at,
            sample_size: 0,
            note: Some(note.into()),
        }
    }

    /// Set the attempted sample size (useful on failed probes).
    pub fn with_sample_size(mut self, sample_size: u64) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Only succeeded probes carry counts the engine may rely on.
    pub fn is_authoritative(&self) -> bool {
        self.status == ProbeStatus::Succeeded
    }

    /// A succeeded probe that examined every row.
    pub fn covers(&self, row_count: u64) -> bool {
        self.is_authoritative() && self.sample_size >= row_count
    }
}
