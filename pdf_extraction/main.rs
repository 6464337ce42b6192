mod line_parser;
mod pdf;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use echowork_seed::sql_script::{build_companies, render_script, ScriptOptions};
use echowork_seed::utils::truncate_preview;
use echowork_seed::{ParsedLine, SeedError, Settings, SlugRegistry};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "extract_companies_from_pdfs",
    about = "Extract company listings from PDF directories into a SQL seed script"
)]
struct Cli {
    /// Directory scanned for *.pdf files
    #[arg(short, long)]
    dir: Option<PathBuf>,
    /// SQL script to write (overwritten)
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

fn banner(title: &str) {
    println!("{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

fn print_sample(companies: &[ParsedLine]) {
    println!("\nSample companies:");
    for (i, c) in companies.iter().take(5).enumerate() {
        println!("{}. {} ({})", i + 1, c.name, c.ville);
        println!("   Activity: {}", or_none(&c.activite));
        println!("   Address: {}", or_none(&c.adresse));
        let phone = if c.tel.is_empty() { "(none)" } else { c.tel.as_str() };
        println!("   Phone: {}", phone);
        println!();
    }
}

fn or_none(s: &str) -> String {
    if s.is_empty() {
        "(none)".to_string()
    } else {
        truncate_preview(s, 60)
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    info!(settings = ?settings, "Starting PDF extraction");

    let dir = cli.dir.unwrap_or_else(|| settings.pdf_dir.clone());
    let output = cli.output.unwrap_or_else(|| settings.sql_path.clone());

    banner("Extracting Companies from PDF Files");

    if !dir.is_dir() {
        return Err(SeedError::InputNotFound(dir).into());
    }
    let pdfs = pdf::discover_pdfs(&dir)
        .with_context(|| format!("listing PDFs in {}", dir.display()))?;
    println!("\nFound {} PDF files", pdfs.len());

    let mut all_companies = Vec::new();
    for path in &pdfs {
        println!("\nProcessing: {}", path.display());
        let companies = pdf::extract_companies_from_pdf(path);
        println!("  Extracted: {} companies", companies.len());
        all_companies.extend(companies);
    }

    println!();
    banner(&format!("Total extracted: {} companies", all_companies.len()));
    print_sample(&all_companies);

    let total = all_companies.len();
    let mut slugs = SlugRegistry::new();
    let companies = build_companies(all_companies, &mut slugs, settings.default_category());
    println!("Total companies: {}", total);
    println!("Unique companies: {}", companies.len());

    let opts = ScriptOptions {
        batch_size: settings.batch_size,
        default_category: settings.default_category(),
        ..ScriptOptions::default()
    };
    let sql = render_script(&companies, &opts);
    fs::write(&output, sql).map_err(|source| SeedError::Write {
        path: output.clone(),
        source,
    })?;
    info!(path = %output.display(), rows = companies.len(), "SQL script written");

    println!("\nSQL file generated: {}", output.display());
    println!();
    banner("DONE!");
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
