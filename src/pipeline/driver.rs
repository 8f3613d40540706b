//! Chunk driver: the top-level sequential loop over the input.
//!
//! Rows are sliced into chunks, each chunk into batches. Batches are annotated
//! and flattened one at a time, and every non-empty chunk is written to its own
//! file. Progress is reported through `PipelineEvent`s.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::annotator::{Annotator, BatchOutcome};
use super::batcher::make_batches;
use super::error::PipelineError;
use super::events::{PipelineEvent, RunSummary};
use super::flatten::{flatten, DEFAULT_LIST_DELIMITER};
use super::output::{chunk_path, ensure_output_dir, write_rows};
use super::types::{DescriptionRecord, FlatRow};

/// Default rows per output chunk.
pub const DEFAULT_ROWS_PER_CHUNK: usize = 500;

/// Default descriptions per API call.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Chunking and output settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    pub rows_per_chunk: usize,
    pub batch_size: usize,
    pub output_dir: PathBuf,
    pub list_delimiter: String,
    /// Skip chunks whose output file already exists.
    pub skip_existing: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            rows_per_chunk: DEFAULT_ROWS_PER_CHUNK,
            batch_size: DEFAULT_BATCH_SIZE,
            output_dir: PathBuf::from("output"),
            list_delimiter: DEFAULT_LIST_DELIMITER.to_string(),
            skip_existing: false,
        }
    }
}

/// Runs the chunk/batch loop against an annotator.
pub struct ChunkDriver {
    annotator: Annotator,
    options: DriverOptions,
}

impl ChunkDriver {
    pub fn new(annotator: Annotator, options: DriverOptions) -> Self {
        Self { annotator, options }
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    /// Process every record, writing one file per non-empty chunk.
    ///
    /// Batch failures are counted and reported; only output errors abort.
    pub async fn run(
        &self,
        records: &[DescriptionRecord],
        event_tx: mpsc::Sender<PipelineEvent>,
    ) -> Result<RunSummary, PipelineError> {
        ensure_output_dir(&self.options.output_dir)?;

        let chunk_size = self.options.rows_per_chunk.max(1);
        let _ = event_tx
            .send(PipelineEvent::Started {
                total_rows: records.len(),
                total_chunks: records.len().div_ceil(chunk_size),
            })
            .await;

        let mut summary = RunSummary::default();

        for (chunk_index, chunk) in records.chunks(chunk_size).enumerate() {
            let path = chunk_path(&self.options.output_dir, chunk_index);

            if self.options.skip_existing && path.exists() {
                info!(
                    "Chunk {} already written at {}",
                    chunk_index,
                    path.display()
                );
                summary.chunks_skipped += 1;
                let _ = event_tx
                    .send(PipelineEvent::ChunkSkipped {
                        chunk_index,
                        rows: chunk.len(),
                        path,
                    })
                    .await;
                continue;
            }

            let rows = self
                .process_chunk(chunk_index, chunk, &event_tx, &mut summary)
                .await;

            if rows.is_empty() {
                warn!("Chunk {} produced no rows; nothing written", chunk_index);
                summary.chunks_empty += 1;
                let _ = event_tx.send(PipelineEvent::ChunkEmpty { chunk_index }).await;
                continue;
            }

            write_rows(&path, &rows)?;
            summary.chunks_written += 1;
            summary.rows_written += rows.len();
            info!(
                "Chunk {}: wrote {} of {} rows to {}",
                chunk_index,
                rows.len(),
                chunk.len(),
                path.display()
            );

            let _ = event_tx
                .send(PipelineEvent::ChunkWritten {
                    chunk_index,
                    rows: rows.len(),
                    path,
                })
                .await;
        }

        let _ = event_tx.send(PipelineEvent::Complete(summary)).await;
        Ok(summary)
    }

    async fn process_chunk(
        &self,
        chunk_index: usize,
        chunk: &[DescriptionRecord],
        event_tx: &mpsc::Sender<PipelineEvent>,
        summary: &mut RunSummary,
    ) -> Vec<FlatRow> {
        let batches = make_batches(chunk, self.options.batch_size);
        let _ = event_tx
            .send(PipelineEvent::ChunkStarted {
                chunk_index,
                rows: chunk.len(),
                batches: batches.len(),
            })
            .await;

        let mut rows = Vec::with_capacity(chunk.len());

        for batch in &batches {
            match self.annotator.annotate_batch(batch).await {
                BatchOutcome::Extracted(results) => {
                    summary.batches_succeeded += 1;
                    rows.extend(flatten(&results, &self.options.list_delimiter));
                    let _ = event_tx
                        .send(PipelineEvent::BatchCompleted {
                            chunk_index,
                            batch_index: batch.index,
                            rows: results.len(),
                        })
                        .await;
                }
                BatchOutcome::Failed {
                    batch_index,
                    reason,
                } => {
                    summary.batches_failed += 1;
                    let _ = event_tx
                        .send(PipelineEvent::BatchFailed {
                            chunk_index,
                            batch_index,
                            size: batch.len(),
                            error: reason.to_string(),
                        })
                        .await;
                }
            }
        }

        rows
    }
}
