//! Flyover CLI - headless camera flyover runner
//!
//! Plays scenario files through the flyover controller without a map
//! widget, printing camera poses as the tour unfolds. Useful for tuning
//! options and reproducing camera behavior with a fixed seed.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flyover", version, about = "Cinematic map camera flyover demo")]
struct Cli {
    /// Log filter, e.g. "info" or "flyover=debug"
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario headlessly, printing camera poses
    Run(commands::run::RunArgs),
    /// Print a scenario summary
    Inspect(commands::inspect::InspectArgs),
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
