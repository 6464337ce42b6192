mod export;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use echowork_seed::Settings;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "export_companies_csv",
    about = "Export the company rows of a SQL seed script to CSV"
)]
struct Cli {
    /// SQL script to read
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// CSV file to write (default: companies_export_<timestamp>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    let input = cli.input.unwrap_or_else(|| settings.sql_path.clone());

    let output = cli.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "companies_export_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    });

    println!("Extracting company rows from {}...", input.display());
    let (records, extra_columns) = export::export_file(&input, &output)?;
    println!("Rows extracted: {}", records.len());
    if !extra_columns.is_empty() {
        info!(columns = ?extra_columns, "extra columns appended to CSV header");
    }

    println!("CSV written: {}", output.display());
    println!("Companies exported: {}", records.len());

    println!("\nFirst companies:");
    for (i, record) in records.iter().take(5).enumerate() {
        let field = |key: &str| record.get(key).map(String::as_str).unwrap_or("N/A");
        println!("\n{}. {}", i + 1, field("name"));
        println!("   Ville: {}", field("ville"));
        println!("   Category: {}", field("categoryId"));
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
