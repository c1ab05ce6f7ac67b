//! Command-line runner for factryl.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use factryl::{Engine, FactrylConfig};
use tracing::info;

/// Factryl: search many sources at once and get one ranked, annotated list.
#[derive(Parser)]
#[command(name = "factryl", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Search every enabled source and print the ranked result as JSON.
    Search {
        /// Query text.
        query: Vec<String>,

        /// Maximum number of items to return.
        #[arg(short = 'n', long)]
        max_results: Option<usize>,

        /// Restrict the search to these sources (repeatable).
        #[arg(short, long = "source")]
        sources: Vec<String>,
    },

    /// List the sources that passed validation.
    Sources,

    /// Print the baseline credibility profile of a source.
    Credibility {
        /// Source name.
        name: String,
    },

    /// Write the default configuration file if none exists.
    InitConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = cli
        .config
        .clone()
        .unwrap_or_else(FactrylConfig::default_config_path);

    if matches!(cli.command, Command::InitConfig) {
        return init_config(&path);
    }

    let config = FactrylConfig::load_or_default(&path)?;
    let _log_guard = factryl::logging::init_tracing(&config.logging);

    let engine = factryl::build_engine(&config).await?;
    info!(sources = engine.list_sources().len(), "engine ready");

    let outcome = run(&engine, cli.command, config.engine.max_results).await;
    engine.shutdown().await;
    outcome
}

/// Execute one engine-backed command. The caller closes the engine
/// afterwards, whether or not this succeeds.
async fn run(engine: &Engine, command: Command, default_max: usize) -> anyhow::Result<()> {
    match command {
        Command::Search {
            query,
            max_results,
            sources,
        } => {
            let query = query.join(" ");
            let max = max_results.unwrap_or(default_max);
            let selected = (!sources.is_empty()).then_some(sources.as_slice());
            let response = engine.search(&query, max, selected).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Sources => {
            for name in engine.list_sources() {
                println!("{name}");
            }
        }
        Command::Credibility { name } => {
            let profile = engine.source_credibility(&name);
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::InitConfig => {}
    }
    Ok(())
}

fn init_config(path: &std::path::Path) -> anyhow::Result<()> {
    if path.exists() {
        println!("config already exists at {}", path.display());
        return Ok(());
    }
    FactrylConfig::default().save_to_file(path)?;
    println!("wrote default config to {}", path.display());
    Ok(())
}
