//! Progress events emitted by the chunk driver.

use std::path::PathBuf;

/// Counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub chunks_written: usize,
    pub chunks_empty: usize,
    pub chunks_skipped: usize,
    pub batches_succeeded: usize,
    pub batches_failed: usize,
    pub rows_written: usize,
}

/// Events emitted during a run.
/// Used by the CLI to drive progress bars and status messages.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Started {
        total_rows: usize,
        total_chunks: usize,
    },
    ChunkStarted {
        chunk_index: usize,
        rows: usize,
        batches: usize,
    },
    BatchCompleted {
        chunk_index: usize,
        batch_index: usize,
        rows: usize,
    },
    BatchFailed {
        chunk_index: usize,
        batch_index: usize,
        size: usize,
        error: String,
    },
    ChunkWritten {
        chunk_index: usize,
        rows: usize,
        path: PathBuf,
    },
    /// Every batch of the chunk failed or returned nothing; no file written.
    ChunkEmpty {
        chunk_index: usize,
    },
    /// Output file already existed and `skip_existing` was set.
    ChunkSkipped {
        chunk_index: usize,
        rows: usize,
        path: PathBuf,
    },
    Complete(RunSummary),
}
