use anyhow::{Context, Result};
use clap::Parser;
use despertar::cli::{Cli, OutputFormat};
use despertar::config::EngineConfig;
use despertar::engine::AttributionEngine;
use despertar::replay::{self, ReplaySummary};
use despertar::subsystem::SubsystemTable;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(args: &Cli) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_toml(path)
            .with_context(|| format!("Failed to load engine config: {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(window) = args.window {
        config = config.with_matching_window(window);
        config
            .validate()
            .with_context(|| format!("Invalid value for --window: {}", window))?;
    }

    Ok(config)
}

fn load_table(args: &Cli) -> Result<SubsystemTable> {
    match &args.subsystems {
        Some(path) => SubsystemTable::from_toml(path)
            .with_context(|| format!("Failed to load subsystem table: {}", path.display())),
        None => SubsystemTable::default_table().context("Failed to load embedded subsystem table"),
    }
}

#[derive(serde::Serialize)]
struct JsonReport<'a> {
    summary: &'a ReplaySummary,
    snapshot: despertar::diagnostics::EngineSnapshot,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let table = load_table(&args)?;
    let events = replay::read_trace_file(&args.trace)
        .with_context(|| format!("Failed to read trace: {}", args.trace.display()))?;

    let engine = AttributionEngine::new(config, Arc::new(table))
        .context("Failed to create attribution engine")?;
    let summary = replay::replay(&engine, events);

    match args.format {
        OutputFormat::Text => {
            println!("Replayed {}", summary);
            print!("{}", engine.snapshot());
        }
        OutputFormat::Json => {
            let report = JsonReport {
                summary: &summary,
                snapshot: engine.snapshot(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
