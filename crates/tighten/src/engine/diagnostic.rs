//! Evidence diagnostics: gaps the engine worked around.

use serde::{Deserialize, Serialize};

use crate::codex::RationaleCode;
use crate::decision::Domain;
use crate::evidence::{ProbeOutcome, ProbeStatus};

/// Kind of evidence gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    ProfileMissing,
    ProbeFailed,
    ProbeSkipped,
    PartialSample,
}

impl DiagnosticKind {
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::ProfileMissing => "Profile missing",
            DiagnosticKind::ProbeFailed => "Probe failed",
            DiagnosticKind::ProbeSkipped => "Probe skipped",
            DiagnosticKind::PartialSample => "Partial sample",
        }
    }

    /// Codex entry matching this kind.
    pub fn code(&self) -> RationaleCode {
        match self {
            DiagnosticKind::ProfileMissing => RationaleCode::ProfileMissing,
            DiagnosticKind::ProbeFailed => RationaleCode::ProbeFailed,
            DiagnosticKind::ProbeSkipped => RationaleCode::ProbeSkipped,
            DiagnosticKind::PartialSample => RationaleCode::PartialSample,
        }
    }

    /// Kind for a non-succeeded probe.
    pub fn for_probe(probe: &ProbeOutcome) -> Option<Self> {
        match probe.status {
            ProbeStatus::Succeeded => None,
            ProbeStatus::Failed => Some(DiagnosticKind::ProbeFailed),
            ProbeStatus::Skipped => Some(DiagnosticKind::ProbeSkipped),
        }
    }
}

/// A diagnostic attached to a report. Field order is the sort order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Diagnostic {
    pub coordinate: String,
    pub domain: Domain,
    pub kind: DiagnosticKind,
    pub module: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(
        module: impl Into<String>,
        domain: Domain,
        coordinate: impl Into<String>,
        kind: DiagnosticKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            coordinate: coordinate.into(),
            domain,
            kind,
            module: module.into(),
            detail: detail.into(),
        }
    }
}
