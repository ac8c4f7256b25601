//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tighten::RiskMode;

/// Tighten: evidence-gated constraint tightening for declarative schemas
#[derive(Parser)]
#[command(name = "tighten")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a schema model against profiling evidence
    Evaluate {
        /// Path to the schema model (JSON)
        #[arg(short, long, value_name = "FILE")]
        model: PathBuf,

        /// Path to the evidence snapshot (JSON)
        #[arg(short, long, value_name = "FILE")]
        evidence: PathBuf,

        /// Policy file: JSON document, or flat `key = value` lines
        #[arg(short, long, value_name = "FILE")]
        policy: Option<PathBuf>,

        /// Output path for the report (default: <model>.decisions.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads (1 = sequential, 0 = one per core)
        #[arg(long, default_value = "0")]
        parallelism: usize,

        /// Override the policy's risk mode (cautious, evidence-gated, aggressive)
        #[arg(long)]
        mode: Option<RiskMode>,
    },

    /// Show the rollups of a saved report
    Summary {
        /// Path to a decision report
        #[arg(value_name = "REPORT")]
        report: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default policy
    Policy {
        /// Print flat `key = value` lines instead of JSON
        #[arg(long)]
        flat: bool,
    },

    /// List the rationale codex
    Codex {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
