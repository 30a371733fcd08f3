//! Batch Commands
//!
//! File-to-file operations behind the `featurize` and `generate` subcommands.

use anyhow::Context;
use feature_engine::{FeaturePipeline, PipelineConfig, PipelineReport};
use ledger::synthetic::{GeneratorConfig, LedgerGenerator};
use ledger::ColumnMapping;
use std::path::Path;
use tracing::info;

/// Build the feature table for a ledger CSV and write it as CSV
pub fn featurize(
    input: &Path,
    output: &Path,
    columns: &ColumnMapping,
    config: PipelineConfig,
) -> anyhow::Result<PipelineReport> {
    let ledger = ledger::read_ledger_file(input, columns)
        .with_context(|| format!("failed to read ledger {}", input.display()))?;

    let table = FeaturePipeline::new(config)
        .run(&ledger)
        .with_context(|| format!("failed to featurize {}", input.display()))?;

    table
        .write_csv_file(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        "Wrote {} feature rows to {} ({} dropped)",
        table.report.output_rows,
        output.display(),
        table.report.dropped()
    );

    Ok(table.report)
}

/// Generate a synthetic ledger and write it as CSV
pub fn generate(output: &Path, config: GeneratorConfig) -> anyhow::Result<usize> {
    if config.start > config.end {
        anyhow::bail!("start date {} is after end date {}", config.start, config.end);
    }

    let records = LedgerGenerator::new(config).generate();
    ledger::write_ledger_file(output, &records)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("Wrote {} ledger rows to {}", records.len(), output.display());

    Ok(records.len())
}
