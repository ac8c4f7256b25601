//! Evidence model: immutable profiling facts with probe outcomes.

mod identity;
mod probe;
mod records;
mod snapshot;

pub use identity::ColumnRef;
pub use probe::{ProbeOutcome, ProbeStatus};
pub use records::{ColumnEvidence, ForeignKeyEvidence, UniqueCandidateEvidence};
pub use snapshot::{EvidenceIndex, EvidenceSnapshot};
