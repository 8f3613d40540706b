//! Standardize, batch, annotate, flatten, and persist food descriptions.

mod annotator;
mod batcher;
mod driver;
mod error;
mod events;
mod flatten;
mod input;
mod output;
mod types;

pub use annotator::{parse_extractions, AnnotateError, Annotator, BatchOutcome};
pub use batcher::{batch_count, make_batches, Batch};
pub use driver::{ChunkDriver, DriverOptions, DEFAULT_BATCH_SIZE, DEFAULT_ROWS_PER_CHUNK};
pub use error::PipelineError;
pub use events::{PipelineEvent, RunSummary};
pub use flatten::{flatten, flatten_one, DEFAULT_LIST_DELIMITER};
pub use input::{read_records, read_records_from, InputColumns};
pub use output::{chunk_file_name, chunk_path, ensure_output_dir, write_rows};
pub use types::{AnnotatedExtraction, DescriptionRecord, Extraction, FlatRow};
