//! Summary command - show the rollups of a saved report.

use std::path::PathBuf;

use colored::Colorize;
use tighten::{Category, DecisionReport, RiskLevel};

pub fn run(
    report_path: PathBuf,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !report_path.exists() {
        return Err(format!(
            "Report not found: {}\nRun 'tighten evaluate' first.",
            report_path.display()
        )
        .into());
    }

    let report = DecisionReport::load(&report_path)?;

    if json_output {
        let status = serde_json::json!({
            "codex_version": report.codex_version,
            "complete": report.complete,
            "summary": report.summary,
            "modules": report.modules,
            "fingerprint": report.fingerprint()?,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!(
            "{} {}",
            "Decision report".cyan().bold(),
            report_path.display().to_string().white()
        );
        println!();
        print_summary(&report, verbose);
    }

    Ok(())
}

/// Human-readable rollups shared by `evaluate` and `summary`.
pub fn print_summary(report: &DecisionReport, verbose: bool) {
    let summary = &report.summary;
    let c = &summary.by_category;

    println!("{}", "Decisions:".yellow().bold());
    println!("  Validation:     {}", c.validation.to_string().green());
    println!("  Recommendation: {}", c.recommendation.to_string().blue());
    println!("  Contradiction:  {}", c.contradiction.to_string().red());
    println!("  NoAction:       {}", c.no_action.to_string().white());
    println!();

    println!("{}", "Risk:".yellow().bold());
    for risk in [RiskLevel::SafeToApply, RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High] {
        println!("  {:15} {}", format!("{}:", risk.label()), summary.by_risk.get(risk));
    }
    println!();

    println!("{}", "Modules:".yellow().bold());
    for (name, rollup) in &report.modules {
        println!(
            "  {:20} {} decisions, {} contradictions",
            name,
            rollup.total(),
            rollup.by_category.get(Category::Contradiction).to_string().red()
        );
        for coordinate in &rollup.contradictions {
            println!("    {} {}", "!".red().bold(), coordinate);
        }
    }

    if summary.total_diagnostics > 0 {
        println!();
        println!(
            "{} {}",
            "Diagnostics:".yellow().bold(),
            summary.total_diagnostics
        );
        if verbose {
            for d in &report.diagnostics {
                println!("  [{}] {} - {}", d.kind.label(), d.coordinate, d.detail);
            }
        }
    }

    if verbose {
        println!();
        for decision in report.needs_remediation() {
            println!("{}", decision.audit_header().red());
            println!();
        }
        for decision in report.safe_to_apply() {
            println!("{}", decision.audit_header());
            println!();
        }
    }

    println!();
    println!("{}", summary.recommendation().bold());
}
