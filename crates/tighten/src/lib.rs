//! Tighten: evidence-gated constraint tightening for declarative schemas.
//!
//! Given a declared schema model, profiling evidence from a live database
//! and an operator policy, Tighten decides for every column, unique index
//! and foreign key whether a constraint is already confirmed, can be safely
//! added, contradicts the data, or cannot be judged yet.
//!
//! # Core Principles
//!
//! - **Never unsafe**: a recommendation needs clean evidence; absent evidence
//!   only ever produces `NoAction`
//! - **Deterministic**: identical inputs give an identical, identically
//!   ordered report
//! - **Auditable**: every decision cites codex rationale codes and the
//!   evidence behind them
//!
//! # Example
//!
//! ```no_run
//! use tighten::{EvidenceSnapshot, SchemaModel, Tightener};
//!
//! let model = SchemaModel::from_json(&std::fs::read_to_string("model.json").unwrap()).unwrap();
//! let evidence =
//!     EvidenceSnapshot::from_json(&std::fs::read_to_string("evidence.json").unwrap()).unwrap();
//!
//! let report = Tightener::new().evaluate(&model, &evidence).unwrap();
//! for decision in report.needs_remediation() {
//!     println!("{}", decision.audit_header());
//! }
//! ```

pub mod codex;
pub mod decision;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod model;
pub mod policy;
pub mod report;

mod tightener;

pub use crate::tightener::Tightener;
pub use codex::{RationaleCode, RationaleSet, CODEX_VERSION};
pub use decision::{Category, Decision, Domain, RiskLevel};
pub use engine::{CancellationToken, Diagnostic, EngineOptions};
pub use error::{Result, TightenError};
pub use evidence::{ColumnRef, EvidenceSnapshot, ProbeOutcome, ProbeStatus};
pub use model::SchemaModel;
pub use policy::{PolicyConfig, RiskMode};
pub use report::DecisionReport;
