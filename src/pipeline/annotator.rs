//! Batch annotation: one rate-limited completion call per batch.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::{CompletionBackend, CompletionRequest, LlmError};
use crate::rate_limit::RateLimiter;

use super::batcher::Batch;
use super::types::{AnnotatedExtraction, Extraction};

/// Why a batch produced no results.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("Completion call failed: {0}")]
    Call(#[from] LlmError),

    #[error("Malformed response content: {0}")]
    Malformed(String),

    #[error("Response has {actual} results for a batch of {expected}")]
    CountMismatch { expected: usize, actual: usize },
}

/// Result of annotating one batch.
#[derive(Debug)]
pub enum BatchOutcome {
    /// One annotated extraction per batch record, in order.
    Extracted(Vec<AnnotatedExtraction>),
    /// The batch yielded nothing.
    Failed {
        batch_index: usize,
        reason: AnnotateError,
    },
}

impl BatchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchOutcome::Failed { .. })
    }

    /// Extractions on success, empty on failure.
    pub fn into_extractions(self) -> Vec<AnnotatedExtraction> {
        match self {
            BatchOutcome::Extracted(results) => results,
            BatchOutcome::Failed { .. } => Vec::new(),
        }
    }
}

/// Sends batches to a completion backend and pairs results with record ids.
pub struct Annotator {
    backend: Arc<dyn CompletionBackend>,
    limiter: RateLimiter,
    system_prompt: String,
}

impl Annotator {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        limiter: RateLimiter,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            limiter,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Build the request for a batch: texts joined one per line.
    pub fn build_request(&self, batch: &Batch<'_>) -> CompletionRequest {
        CompletionRequest {
            system: self.system_prompt.clone(),
            user: batch.texts().collect::<Vec<_>>().join("\n"),
        }
    }

    /// Annotate one batch. Never returns an error; failures become `BatchOutcome::Failed`.
    pub async fn annotate_batch(&self, batch: &Batch<'_>) -> BatchOutcome {
        if batch.is_empty() {
            return BatchOutcome::Extracted(Vec::new());
        }

        match self.try_annotate(batch).await {
            Ok(results) => BatchOutcome::Extracted(results),
            Err(reason) => {
                warn!(
                    "Batch {} ({} descriptions, first id {}) failed: {}",
                    batch.index,
                    batch.len(),
                    batch.records[0].id,
                    reason
                );
                BatchOutcome::Failed {
                    batch_index: batch.index,
                    reason,
                }
            }
        }
    }

    async fn try_annotate(
        &self,
        batch: &Batch<'_>,
    ) -> Result<Vec<AnnotatedExtraction>, AnnotateError> {
        let waited = self.limiter.acquire().await;
        if !waited.is_zero() {
            debug!("Batch {} throttled for {:?}", batch.index, waited);
        }

        let request = self.build_request(batch);
        let content = self.backend.complete(&request).await?;
        let extractions = parse_extractions(&content)?;

        if extractions.len() != batch.len() {
            return Err(AnnotateError::CountMismatch {
                expected: batch.len(),
                actual: extractions.len(),
            });
        }

        debug!(
            "Batch {} returned {} extractions",
            batch.index,
            extractions.len()
        );

        Ok(batch
            .records
            .iter()
            .zip(extractions)
            .map(|(record, extraction)| AnnotatedExtraction {
                id: record.id.clone(),
                description: record.standardized.clone(),
                extraction,
            })
            .collect())
    }
}

/// Parse message content as a JSON array of extraction objects.
///
/// A surrounding Markdown code fence is removed first; nothing else is repaired.
pub fn parse_extractions(content: &str) -> Result<Vec<Extraction>, AnnotateError> {
    let body = strip_code_fence(content);
    serde_json::from_str::<Vec<Extraction>>(body)
        .map_err(|e| AnnotateError::Malformed(e.to_string()))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
