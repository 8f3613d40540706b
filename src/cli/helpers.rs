//! Shared helper functions for CLI commands.

use anyhow::Context;
use tracing::info;

use foodlabel::config::Config;
use foodlabel::preprocess::{AbbreviationTable, Preprocessor};

/// Builtin abbreviation table plus any configured extras.
pub fn build_preprocessor(config: &Config) -> anyhow::Result<Preprocessor> {
    let mut table = AbbreviationTable::builtin();

    if let Some(path) = config.abbreviations_path() {
        let extra = AbbreviationTable::from_csv_path(&path)
            .with_context(|| format!("loading abbreviations from {}", path.display()))?;
        let count = extra.len();
        table
            .extend(extra)
            .with_context(|| format!("merging abbreviations from {}", path.display()))?;
        info!("Merged {} abbreviations from {}", count, path.display());
    }

    Ok(Preprocessor::new(table).context("compiling abbreviations")?)
}
