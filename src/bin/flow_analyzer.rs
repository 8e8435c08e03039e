//! Flow Analyzer CLI
//!
//! Runs signaling-flow analysis over JSON files of parsed protocol log records
//! and prints the completeness report and first blocking flow.
//!
//! A record file holds a JSON array of records:
//!
//! ```json
//! [
//!   {"seq": 1, "timestamp": "2025-04-07T09:42:30.120Z", "protocol": "nas", "direction": "U",
//!    "message": "Registration request"}
//! ]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dotenv::dotenv;
use protocol_analyzer::engine::matcher;
use protocol_analyzer::{
    AnalysisOutcome, AnalysisReport, AnalysisRun, AnalyzerConfig, Diagnosis, FlowCatalog, LogRecord,
    OutputFormat, ProtocolAnalyzer,
};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "flow-analyzer")]
#[command(about = "Protocol log flow analyzer - find which signaling flows completed and what blocked the rest")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Flow catalog JSON document (defaults to the built-in 5G attach catalog)
    #[arg(long, global = true, env = "PROTOCOL_ANALYZER_CATALOG_PATH")]
    catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Settings file
    #[arg(long, global = true, default_value = protocol_analyzer::settings::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more record files
    Analyze {
        /// JSON record files; each file is analyzed independently
        #[arg(required = true)]
        records: Vec<PathBuf>,

        /// Exit with status 2 when any file has a blocking flow
        #[arg(long)]
        fail_on_blocker: bool,
    },

    /// Show the flows of the active catalog
    Catalog,

    /// Explain why a flow did not advance past its next expected step
    Explain {
        /// JSON record file
        records: PathBuf,

        /// Flow name as written in the catalog
        #[arg(long)]
        flow: String,

        /// Include records whose protocol tag differs from the expected step
        #[arg(long)]
        all: bool,
    },
}

/// Per-file output of the `analyze` command
#[derive(Serialize)]
struct SourcedOutcome {
    source: String,
    #[serde(flatten)]
    outcome: AnalysisOutcome,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenv();

    let cli = Cli::parse();

    let mut settings = AnalyzerConfig::load_from(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    if let Some(path) = cli.catalog.clone() {
        settings.catalog_path = Some(path);
    }
    if let Some(format) = cli.format {
        settings.output_format = format;
    }
    if cli.verbose {
        settings.log_level = "debug".to_string();
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_level.as_str())
        .with_writer(std::io::stderr)
        .init();

    debug!(?settings, "settings resolved");

    let catalog = settings.load_catalog().context("Failed to load flow catalog")?;
    info!(
        version = catalog.version(),
        flows = catalog.len(),
        fingerprint = catalog.fingerprint(),
        "catalog ready"
    );

    match cli.command {
        Commands::Analyze { records, fail_on_blocker } => {
            let analyzer = ProtocolAnalyzer::new(catalog);
            let blocked = analyze_files(&analyzer, &records, settings.output_format).await?;
            if fail_on_blocker && blocked {
                std::process::exit(2);
            }
        }

        Commands::Catalog => {
            show_catalog(&catalog, settings.output_format)?;
        }

        Commands::Explain { records, flow, all } => {
            let records = read_records(&records)?;
            explain_flow(&catalog, &records, &flow, all)?;
        }
    }

    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<LogRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    let records: Vec<LogRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse records in {}", path.display()))?;
    debug!(path = %path.display(), records = records.len(), "records loaded");
    Ok(records)
}

/// Analyze every file concurrently; returns whether any file has a blocker
async fn analyze_files(analyzer: &ProtocolAnalyzer, paths: &[PathBuf], format: OutputFormat) -> Result<bool> {
    let batches = paths.iter().map(|p| read_records(p)).collect::<Result<Vec<_>>>()?;
    let outcomes = analyzer.analyze_batches(batches).await?;
    let blocked = outcomes.iter().any(|o| !o.diagnosis.is_all_completed());

    match format {
        OutputFormat::Json => {
            let sourced: Vec<SourcedOutcome> = paths
                .iter()
                .zip(outcomes)
                .map(|(path, outcome)| SourcedOutcome {
                    source: path.display().to_string(),
                    outcome,
                })
                .collect();
            let json = if sourced.len() == 1 {
                serde_json::to_string_pretty(&sourced[0])?
            } else {
                serde_json::to_string_pretty(&sourced)?
            };
            println!("{}", json);
        }
        OutputFormat::Pretty => {
            for (path, outcome) in paths.iter().zip(&outcomes) {
                print_outcome(&path.display().to_string(), outcome);
            }
        }
    }

    Ok(blocked)
}

fn print_outcome(source: &str, outcome: &AnalysisOutcome) {
    let report = &outcome.report;
    println!("{} {}", "📄".bold(), source.bold());
    println!(
        "   run {} | catalog {} | {} records",
        outcome.run_id.to_string().dimmed(),
        report.catalog_version,
        report.records_evaluated
    );
    print_summary(report);
    print_diagnosis(&outcome.diagnosis);
    println!();
}

fn print_summary(report: &AnalysisReport) {
    let s = &report.summary;
    println!(
        "   {} completed, {} in progress, {} not started (of {})",
        s.completed.to_string().green(),
        s.in_progress.to_string().yellow(),
        s.not_started.to_string().red(),
        s.total_flows
    );

    for flow in &report.completed_flows {
        println!("   {} {}", "✔".green(), flow.flow_name);
    }
    for flow in &report.in_progress_flows {
        let last = flow
            .last_step_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {} {} ({}, last step at {})",
            "…".yellow(),
            flow.flow_name,
            flow.progress(),
            last
        );
        for step in &flow.missing_steps {
            println!("       missing: {}", step);
        }
    }
    for flow in &report.problematic_flows {
        println!(
            "   {} {} - {}; expected first step: {}",
            "✘".red(),
            flow.flow_name,
            flow.issue,
            flow.missing_initial_step
        );
    }
}

fn print_diagnosis(diagnosis: &Diagnosis) {
    if diagnosis.is_all_completed() {
        println!("   {} {}", "✅".bold(), "All flows completed".green().bold());
    } else {
        println!("   {} {}", "🚫".bold(), diagnosis.describe().red().bold());
    }
}

fn show_catalog(catalog: &FlowCatalog, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&catalog.to_document())?);
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} ({} flows, sha256 {})",
                "📚".bold(),
                catalog.version().bold(),
                catalog.len(),
                catalog.fingerprint().dimmed()
            );
            for (position, flow) in catalog.flows().iter().enumerate() {
                let gate = if flow.prerequisites.is_empty() {
                    "no prerequisites".to_string()
                } else {
                    format!("after {}", flow.prerequisites.join(", "))
                };
                println!("{:>3}. {} [{}]", position + 1, flow.name.bold(), gate.dimmed());
                for (index, step) in flow.steps.iter().enumerate() {
                    println!("       {}. {}", index + 1, step);
                }
            }
        }
    }
    Ok(())
}

fn explain_flow(catalog: &FlowCatalog, records: &[LogRecord], flow_name: &str, all: bool) -> Result<()> {
    let definition = catalog
        .get(flow_name)
        .with_context(|| format!("Flow '{}' is not in catalog {}", flow_name, catalog.version()))?;

    let run = AnalysisRun::track(catalog, records);
    let matched = run.state(flow_name).map(|s| s.next_step_index()).unwrap_or(0);

    println!(
        "{} {} ({}/{} steps matched)",
        "🔎".bold(),
        definition.name.bold(),
        matched,
        definition.total_steps()
    );

    if run.is_completed(flow_name) {
        println!("   {}", "Flow completed".green());
        return Ok(());
    }

    let unmet = definition.unmet_prerequisites(run.completed_flows());
    if !unmet.is_empty() {
        println!("   {} prerequisites never completed: {}", "✘".red(), unmet.join(", "));
    }

    let Some(expected) = definition.step(matched) else {
        return Ok(());
    };
    println!("   waiting for: {}", expected.to_string().yellow());

    for record in records {
        let evaluation = matcher::evaluate(record, expected);
        if !all && !evaluation.protocol_matched {
            continue;
        }
        let marker = if evaluation.matched { "✔".green() } else { "✘".red() };
        println!("   {} {} | {}", marker, record.message, evaluation.explanation.dimmed());
    }

    Ok(())
}
