mod rewrite;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use echowork_seed::{Category, Classifier, MatchMode, Settings};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "categorize_companies",
    about = "Re-derive categoryId for every company in a generated SQL seed script"
)]
struct Cli {
    /// SQL script to read
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Where to write the result (defaults to rewriting the input in place)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Use plain substring matching instead of whole words
    #[arg(long)]
    substring: bool,
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

fn run(cli: Cli, interrupted: &AtomicBool) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    let input = cli.input.unwrap_or_else(|| settings.sql_path.clone());
    let output = cli.output.unwrap_or_else(|| input.clone());
    let mode = if cli.substring {
        MatchMode::Substring
    } else {
        settings.match_mode
    };
    info!(input = %input.display(), output = %output.display(), mode = ?mode, "Starting categorization");

    println!("Processing {}...", input.display());
    let classifier = Classifier::new(mode);
    let result =
        rewrite::categorize_file(&input, &output, &classifier, Local::now(), interrupted)?;

    println!("\nCategorization complete!");
    println!("Total companies processed: {}", result.total);
    println!("Category changed for: {}", result.changed);
    println!("\nBreakdown by category:");
    for category in Category::ALL {
        let count = result.per_category.get(&category).copied().unwrap_or(0);
        println!("  {}: {}", category, count);
    }
    println!("\nUpdated file saved to: {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    match run(cli, &interrupted) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
