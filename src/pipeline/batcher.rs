//! Splits records into fixed-size batches for API calls.

use super::types::DescriptionRecord;

/// A contiguous slice of records sent together in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    /// Zero-based position of this batch within its chunk.
    pub index: usize,
    pub records: &'a [DescriptionRecord],
}

impl<'a> Batch<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &'a str> {
        self.records.iter().map(|r| r.standardized.as_str())
    }
}

/// Partition records into ordered batches of at most `batch_size`.
///
/// Only the last batch may be smaller. A `batch_size` of zero is treated as one.
pub fn make_batches(records: &[DescriptionRecord], batch_size: usize) -> Vec<Batch<'_>> {
    records
        .chunks(batch_size.max(1))
        .enumerate()
        .map(|(index, records)| Batch { index, records })
        .collect()
}

/// Number of batches `make_batches` yields for `len` records.
pub fn batch_count(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size.max(1))
}
