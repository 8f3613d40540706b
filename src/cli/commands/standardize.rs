//! Preprocessing-only command.

use std::io::Write;
use std::path::Path;

use console::style;
use serde::Serialize;

use foodlabel::config::Config;
use foodlabel::pipeline::read_records;

use crate::cli::helpers::build_preprocessor;

#[derive(Serialize)]
struct StandardizedRow<'a> {
    id: &'a str,
    raw: &'a str,
    standardized: &'a str,
}

/// Write `id,raw,standardized` rows for every input record.
pub fn cmd_standardize(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    config.validate(false)?;

    let preprocessor = build_preprocessor(config)?;
    let records = read_records(input, &config.input_columns(), &preprocessor, limit)?;

    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    };

    let mut writer = csv::Writer::from_writer(sink);
    for record in &records {
        writer.serialize(StandardizedRow {
            id: &record.id,
            raw: &record.raw,
            standardized: &record.standardized,
        })?;
    }
    writer.flush()?;

    if let Some(path) = output {
        let changed = records.iter().filter(|r| r.raw != r.standardized).count();
        println!(
            "{} Standardized {} rows ({} changed) -> {}",
            style("✓").green(),
            records.len(),
            changed,
            path.display()
        );
    }

    Ok(())
}
