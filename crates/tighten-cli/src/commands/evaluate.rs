//! Evaluate command - decide constraints for a model and write the report.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tighten::{
    CancellationToken, EngineOptions, EvidenceSnapshot, PolicyConfig, RiskMode, SchemaModel,
    Tightener,
};

use super::summary::print_summary;

pub fn run(
    model_path: PathBuf,
    evidence_path: PathBuf,
    policy_path: Option<PathBuf>,
    output: Option<PathBuf>,
    parallelism: usize,
    mode: Option<RiskMode>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let model = SchemaModel::from_json(&read(&model_path)?)?;
    let evidence = EvidenceSnapshot::from_json(&read(&evidence_path)?)?;

    let mut policy = match &policy_path {
        Some(path) => load_policy(path)?,
        None => PolicyConfig::default(),
    };
    if let Some(mode) = mode {
        policy.mode = mode;
    }
    tracing::debug!(policy = ?policy_path, mode = %policy.mode, "policy loaded");

    let tightener = Tightener::new()
        .with_policy(policy)?
        .with_options(EngineOptions::default().with_max_parallelism(parallelism));

    println!(
        "{} {} ({} coordinates, mode {})",
        "Evaluating".cyan().bold(),
        model_path.display().to_string().white(),
        model.coordinate_count(),
        tightener.policy().mode.to_string().white()
    );

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())?;

    let report = tightener.evaluate_with_cancel(&model, &evidence, &cancel)?;

    let output_path = output.unwrap_or_else(|| {
        let mut p = model_path.clone();
        let stem = p.file_stem().unwrap_or_default().to_string_lossy().to_string();
        p.set_file_name(format!("{}.decisions.json", stem));
        p
    });
    report.save(&output_path)?;

    println!();
    print_summary(&report, verbose);
    println!();
    if !report.complete {
        println!("{}", "Evaluation was cancelled; the report is incomplete.".yellow().bold());
    }
    println!(
        "Report saved to {} ({})",
        output_path.display().to_string().green(),
        report.fingerprint()?
    );

    Ok(())
}

fn read(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e).into())
}

/// JSON policy documents or flat `key = value` lines.
fn load_policy(path: &Path) -> Result<PolicyConfig, Box<dyn std::error::Error>> {
    let text = read(path)?;
    if text.trim_start().starts_with('{') {
        return Ok(PolicyConfig::from_json(&text)?);
    }
    let mut entries = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| {
            format!("{}:{}: expected `key = value`", path.display(), number + 1)
        })?;
        entries.push((key.trim(), value.trim()));
    }
    Ok(PolicyConfig::from_flat_map(entries)?)
}
