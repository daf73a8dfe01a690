use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use appenergy::{ClassificationResult, EnergyTier, SettingsBuilder};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// appenergy - estimate how much energy an application class typically draws
#[derive(Parser)]
#[command(name = "appenergy")]
#[command(about = "Classify an application into an energy tier from public catalog metadata")]
#[command(version)]
struct Cli {
    /// Application name; several words are joined with spaces
    #[arg(value_name = "APP NAME", required = true, num_args = 1..)]
    name: Vec<String>,

    /// Print the full classification record as one JSON line
    #[arg(long)]
    json: bool,

    /// Taxonomy JSON file to use instead of the built-in table
    #[arg(long, value_name = "PATH")]
    taxonomy: Option<PathBuf>,

    /// Seconds to wait for the catalogs
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let app_name = join_name(&cli.name);

    match run(&cli, &app_name) {
        Ok(result) => {
            println!("{}", render(&result, cli.json));
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", EnergyTier::default());
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout only ever carries the answer.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the service from flags, environment and defaults, then classifies.
fn run(cli: &Cli, app_name: &str) -> Result<ClassificationResult> {
    if app_name.is_empty() {
        anyhow::bail!("Application name cannot be empty");
    }

    let mut builder = SettingsBuilder::new();
    if let Some(path) = &cli.taxonomy {
        builder = builder.taxonomy_path(path);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.source_timeout(Duration::from_secs(secs));
    }

    let settings = builder.build().context("Invalid settings")?;
    let service = settings
        .energy_service()
        .context("Failed to set up classifier")?;

    Ok(service.classify(app_name))
}

/// Joins the command-line words into one application name.
fn join_name(words: &[String]) -> String {
    words
        .iter()
        .map(|word| word.trim())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn render(result: &ClassificationResult, json: bool) -> String {
    if json {
        serde_json::to_string(result).unwrap_or_else(|_| result.energy_level().to_string())
    } else {
        result.energy_level().to_string()
    }
}
