//! Travelboard - travel expense dashboard
//!
//! A CLI tool that loads a JSON dataset of travel records, aggregates
//! totals, last-minute purchases and per-person spend, and writes the
//! dashboard as HTML, Markdown or JSON.
//!
//! Exit codes:
//!   0 - Success (including the empty-state dashboard)
//!   1 - Runtime error (bad arguments, config, write failure, unknown person)
//!   2 - Dataset could not be loaded and --strict was set

mod analysis;
mod cli;
mod config;
mod ingest;
mod loader;
mod models;
mod navigation;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use report::RunMetadata;
use std::path::Path;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Handle --navigate early (no data needed)
    if let Some(ref request) = args.navigate {
        let ack = navigation::navigate(request.target, &request.category);
        println!("{}", ack.message);
        return Ok(());
    }

    // Load configuration before logging, since it can raise the log level
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("Travelboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    let result = if args.import_csv.is_some() {
        run_import(&args, &config)
    } else {
        run_dashboard(&args, &config).await
    };

    match result {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Travelboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .travelboard.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to change the dataset, classification rule and report texts.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults, then apply CLI overrides.
///
/// Runs before the tracing subscriber exists, so problems go to stderr.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        Config::load(config_path)?
    } else {
        match Config::load_default() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE, e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    config.validate()?;
    Ok(config)
}

/// Run the dashboard pipeline: load, aggregate, render, write.
async fn run_dashboard(args: &Args, config: &Config) -> Result<i32> {
    let source = config.source();
    let rule = config.last_minute_rule();

    // Step 1: Load the dataset (never fails; errors come back in the outcome)
    if !args.quiet {
        println!("📥 Loading travel data: {}", source);
    }
    let show_progress = !args.quiet && source.is_remote();
    let outcome = loader::load(&source, &config.load_options(show_progress)).await;

    let metadata = RunMetadata {
        source: source.to_string(),
        generated_at: Utc::now(),
        load_error: outcome.error.as_ref().map(|e| e.to_string()),
        skipped_records: outcome.skipped,
    };

    // Step 2: Aggregate
    let stats = analysis::compute_general_stats(&outcome.records, &rule);
    let people = analysis::group_by_person(&outcome.records);

    info!(
        "{} trips, {} travelers, {} last-minute",
        stats.total_viagens,
        people.len(),
        stats.ultima_hora_count()
    );
    if stats.divergencias_sinal > 0 {
        warn!(
            "{} records have a lead-time label that disagrees with their day count",
            stats.divergencias_sinal
        );
    }

    // Step 3: Render
    let format = config.general.format;
    let output = match args.person {
        Some(ref nome) => {
            let person = analysis::find_person(&people, nome)
                .with_context(|| format!("Traveler '{}' not found in {}", nome, source))?;
            let view = report::render_person(person, &rule, &config.report);
            match format {
                OutputFormat::Html => report::generate_person_page(&view, &metadata),
                OutputFormat::Markdown => report::generate_person_markdown(&view, &metadata),
                OutputFormat::Json => report::generate_json_report(&view, &metadata)?,
            }
        }
        None => {
            let view = if outcome.records.is_empty() {
                report::render_empty(&config.report)
            } else {
                report::render(&stats, &people, &config.report)
            };
            if view.is_empty() {
                info!("No travel data available, rendering the empty dashboard");
            }
            match format {
                OutputFormat::Html => report::generate_dashboard_page(&view, &metadata),
                OutputFormat::Markdown => report::generate_markdown_report(&view, &metadata),
                OutputFormat::Json => report::generate_json_report(&view, &metadata)?,
            }
        }
    };

    // Step 4: Write
    let output_path = Path::new(&config.general.output);
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write dashboard to {}", output_path.display()))?;

    if !args.quiet {
        println!("\n📊 Summary:");
        println!("   Trips: {}", stats.total_viagens);
        println!("   Travelers: {}", people.len());
        println!(
            "   Total: {}",
            report::format::format_brl(stats.valor_total)
        );
        println!(
            "   Last-minute: {} ({})",
            stats.ultima_hora_count(),
            report::format::format_percent(stats.percentual_ultima_hora)
        );
        println!("\n✅ Dashboard saved to: {}", output_path.display());
    }

    if let Some(ref e) = outcome.error {
        eprintln!("\n⚠️  Could not load travel data: {}", e);
        if args.strict {
            return Ok(2);
        }
    }

    Ok(0)
}

/// Handle --import-csv: convert CSV exports into the JSON dataset.
fn run_import(args: &Args, config: &Config) -> Result<i32> {
    let input_dir = match args.import_csv {
        Some(ref dir) => dir,
        None => return Ok(0),
    };
    let output = Path::new(&config.data.source);

    if !args.quiet {
        println!("📥 Importing CSV files from: {}", input_dir.display());
    }

    let summary = ingest::ingest_directory(input_dir, output, !args.quiet)
        .with_context(|| format!("Failed to import CSV files from {}", input_dir.display()))?;

    if summary.created_input_dir {
        println!(
            "   Input directory not found; created {}. Add CSV files and run again.",
            input_dir.display()
        );
        return Ok(0);
    }
    if summary.files_found == 0 {
        println!("   No CSV files found in {}", input_dir.display());
        return Ok(0);
    }

    for (file, reason) in &summary.failed {
        eprintln!("   ⚠️  Skipped {}: {}", file.display(), reason);
    }

    let written = summary.output.as_deref().unwrap_or(output);
    println!(
        "\n✅ Imported {} records from {} files into {}",
        summary.records,
        summary.files_found - summary.failed.len(),
        written.display()
    );
    if summary.incomplete > 0 {
        println!(
            "   ⚠️  {} records lack passageiro, faixa_antecedencia or a numeric antecedencia_compra.",
            summary.incomplete
        );
        println!("   Load the dataset with --skip-invalid to drop them.");
    }
    Ok(0)
}
