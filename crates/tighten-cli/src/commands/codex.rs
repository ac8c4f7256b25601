//! Codex command - list rationale codes.

use colored::Colorize;
use tighten::{RationaleCode, CODEX_VERSION};

pub fn run(json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json_output {
        let entries: Vec<serde_json::Value> = RationaleCode::all()
            .iter()
            .map(|code| {
                serde_json::json!({
                    "code": code.code(),
                    "domain": code.domain(),
                    "description": code.description(),
                })
            })
            .collect();
        let doc = serde_json::json!({ "version": CODEX_VERSION, "codes": entries });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{} {}", "Rationale codex".cyan().bold(), CODEX_VERSION.white());
    println!();
    for code in RationaleCode::all() {
        println!(
            "  {:38} {:12} {}",
            code.code().yellow(),
            format!("{:?}", code.domain()),
            code.description()
        );
    }
    Ok(())
}
