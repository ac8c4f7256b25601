//! Tighten CLI - evidence-gated constraint tightening decisions.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbose: bool) {
    let default = if verbose { "tighten=debug" } else { "tighten=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Evaluate {
            model,
            evidence,
            policy,
            output,
            parallelism,
            mode,
        } => commands::evaluate::run(
            model,
            evidence,
            policy,
            output,
            parallelism,
            mode,
            cli.verbose,
        ),

        Commands::Summary { report, json } => commands::summary::run(report, json, cli.verbose),

        Commands::Policy { flat } => commands::policy::run(flat),

        Commands::Codex { json } => commands::codex::run(json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
