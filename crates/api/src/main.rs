//! NCD Stock-Out Pipeline - Main Entry Point

use api::commands;
use api::config::AppConfig;
use api::{init_logging, run_server};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use feature_engine::MissingValuePolicy;
use ledger::synthetic::{GeneratorConfig, GeneratorMode, FORMULARY, ORAL_FORMULARY};
use std::path::PathBuf;
use tracing::info;

/// Medication stock-out feature pipeline and risk API
#[derive(Parser, Debug)]
#[command(name = "stockout", version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./stockout.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// Build the feature table for a ledger CSV
    Featurize {
        /// Ledger CSV
        #[arg(short, long)]
        input: PathBuf,
        /// Feature table CSV to write
        #[arg(short, long)]
        output: PathBuf,
        /// Missing consumption inside the rolling window (overrides config)
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
    },
    /// Write a synthetic ledger CSV
    Generate {
        #[arg(short, long)]
        output: PathBuf,
        /// First month (YYYY-MM-DD)
        #[arg(long, default_value = "2020-01-01")]
        start: NaiveDate,
        /// Last day of the range (YYYY-MM-DD)
        #[arg(long, default_value = "2024-12-31")]
        end: NaiveDate,
        /// Inject missing, outlier and negative consumption
        #[arg(long)]
        messy: bool,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    Skip,
    Propagate,
}

impl From<PolicyArg> for MissingValuePolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Skip => MissingValuePolicy::Skip,
            PolicyArg::Propagate => MissingValuePolicy::Propagate,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    info!("=== NCD Stock-Out Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve => run_server(config).await?,
        Commands::Featurize {
            input,
            output,
            policy,
        } => {
            if let Some(policy) = policy {
                config.pipeline.missing_policy = policy.into();
            }
            let report = commands::featurize(&input, &output, &config.columns, config.pipeline)?;
            println!(
                "{} rows in, {} rows out ({} drugs, {} dropped)",
                report.input_rows,
                report.output_rows,
                report.drugs,
                report.dropped()
            );
        }
        Commands::Generate {
            output,
            start,
            end,
            messy,
            seed,
        } => {
            let (mode, formulary) = if messy {
                (GeneratorMode::Messy, ORAL_FORMULARY)
            } else {
                (GeneratorMode::Clean, FORMULARY)
            };
            let generator = GeneratorConfig {
                drugs: formulary.iter().map(|d| d.to_string()).collect(),
                start,
                end,
                mode,
                seed,
            };
            let rows = commands::generate(&output, generator)?;
            println!("{} ledger rows written to {}", rows, output.display());
        }
    }

    Ok(())
}
