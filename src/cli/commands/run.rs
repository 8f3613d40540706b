//! Full pipeline command.

use std::path::Path;
use std::sync::Arc;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use foodlabel::config::Config;
use foodlabel::llm::LlmClient;
use foodlabel::pipeline::{read_records, Annotator, ChunkDriver, PipelineEvent};
use foodlabel::rate_limit::RateLimiter;

use crate::cli::helpers::build_preprocessor;

/// Standardize, annotate, and write chunk files for an input CSV.
pub async fn cmd_run(config: &Config, input: &Path, limit: Option<usize>) -> anyhow::Result<()> {
    config.validate(true)?;

    // Input problems are fatal before any API call.
    let preprocessor = build_preprocessor(config)?;
    let records = read_records(input, &config.input_columns(), &preprocessor, limit)?;

    if records.is_empty() {
        println!(
            "{} No rows found in {}",
            style("!").yellow(),
            input.display()
        );
        return Ok(());
    }

    let client = LlmClient::new(config.llm.clone())?;
    let limiter = RateLimiter::new(config.rate_limit());
    let annotator = Annotator::new(Arc::new(client), limiter, config.llm.get_system_prompt());
    let options = config.driver_options();

    println!(
        "{} Processing {} rows from {} (model: {}, batch size: {}, {} rows per chunk)",
        style("→").cyan(),
        records.len(),
        input.display(),
        config.llm.model,
        options.batch_size,
        options.rows_per_chunk
    );
    println!(
        "  {} Writing chunks to {}",
        style("→").dim(),
        options.output_dir.display()
    );

    let driver = ChunkDriver::new(annotator, options);

    let (event_tx, event_rx) = mpsc::channel::<PipelineEvent>(100);
    let event_handler = tokio::spawn(render_events(event_rx));

    let summary = driver.run(&records, event_tx).await?;

    // Wait for event handler to finish
    let _ = event_handler.await;

    if summary.batches_failed > 0 {
        println!(
            "  {} {} batches failed; their rows are missing from the output",
            style("!").yellow(),
            summary.batches_failed
        );
    }

    Ok(())
}

/// Per-chunk tallies for progress lines.
#[derive(Default)]
struct ChunkTally {
    batches_ok: usize,
    batches_failed: usize,
}

async fn render_events(mut event_rx: mpsc::Receiver<PipelineEvent>) {
    let mut progress: Option<ProgressBar> = None;
    let mut tally = ChunkTally::default();
    let mut total_chunks = 0;

    // Print through the bar when one is active so lines don't tear it.
    let print = |progress: &Option<ProgressBar>, line: String| match progress {
        Some(pb) => pb.println(line),
        None => println!("{}", line),
    };

    while let Some(event) = event_rx.recv().await {
        match event {
            PipelineEvent::Started {
                total_rows,
                total_chunks: chunks,
            } => {
                total_chunks = chunks;
                let pb = ProgressBar::new(total_rows as u64);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("█▓░"),
                );
                pb.set_message("Annotating...");
                progress = Some(pb);
            }
            PipelineEvent::ChunkStarted {
                chunk_index,
                batches,
                ..
            } => {
                tally = ChunkTally::default();
                if let Some(ref pb) = progress {
                    pb.set_message(format!(
                        "chunk {}/{} ({} batches)",
                        chunk_index + 1,
                        total_chunks,
                        batches
                    ));
                }
            }
            PipelineEvent::BatchCompleted { rows, .. } => {
                tally.batches_ok += 1;
                if let Some(ref pb) = progress {
                    pb.inc(rows as u64);
                }
            }
            PipelineEvent::BatchFailed {
                chunk_index,
                batch_index,
                size,
                error,
            } => {
                tally.batches_failed += 1;
                if let Some(ref pb) = progress {
                    pb.inc(size as u64);
                }
                print(
                    &progress,
                    format!(
                        "{} Chunk {} batch {} ({} rows): {}",
                        style("✗").red(),
                        chunk_index,
                        batch_index,
                        size,
                        error
                    ),
                );
            }
            PipelineEvent::ChunkWritten {
                chunk_index,
                rows,
                path,
            } => {
                print(
                    &progress,
                    format!(
                        "{} Chunk {}: {} rows -> {} ({} batches ok, {} failed)",
                        style("✓").green(),
                        chunk_index,
                        rows,
                        path.display(),
                        tally.batches_ok,
                        tally.batches_failed
                    ),
                );
            }
            PipelineEvent::ChunkEmpty { chunk_index } => {
                print(
                    &progress,
                    format!(
                        "{} Chunk {} produced no rows ({} batches failed); not written",
                        style("!").yellow(),
                        chunk_index,
                        tally.batches_failed
                    ),
                );
            }
            PipelineEvent::ChunkSkipped {
                chunk_index,
                rows,
                path,
            } => {
                if let Some(ref pb) = progress {
                    pb.inc(rows as u64);
                }
                print(
                    &progress,
                    format!(
                        "{} Chunk {} already exists at {}; skipped",
                        style("→").dim(),
                        chunk_index,
                        path.display()
                    ),
                );
            }
            PipelineEvent::Complete(summary) => {
                if let Some(pb) = progress.take() {
                    pb.finish_and_clear();
                }

                println!(
                    "{} Run complete: {} rows in {} chunk files ({} batches ok, {} failed)",
                    style("✓").green(),
                    summary.rows_written,
                    summary.chunks_written,
                    summary.batches_succeeded,
                    summary.batches_failed
                );
                if summary.chunks_empty > 0 {
                    println!(
                        "  {} {} chunks produced no rows",
                        style("!").yellow(),
                        summary.chunks_empty
                    );
                }
                if summary.chunks_skipped > 0 {
                    println!(
                        "  {} {} chunks skipped (already written)",
                        style("→").dim(),
                        summary.chunks_skipped
                    );
                }
            }
        }
    }
}
