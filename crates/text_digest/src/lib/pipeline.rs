pub mod builder;

use std::num::NonZeroUsize;

use text_generation::{Generator, SafetyPolicy};
use tokio::sync::Semaphore;

use crate::{chunker, Aggregator, Combiner, DigestError, SegmentSummarizer};

/// The summarization pipeline: Chunker, then Aggregator, then (when more than
/// one partial survives) Combiner.
///
/// Build one with [`DigestBuilder`](builder::DigestBuilder). A `Digest` is
/// immutable once built and can serve concurrent runs; the optional
/// concurrency limit is shared by all of them.
#[derive(Debug)]
pub struct Digest<G>
where
    G: Generator + Send + Sync,
{
    pub(crate) generator: G,
    pub(crate) safety: SafetyPolicy,
    pub(crate) chunk_size: NonZeroUsize,
    pub(crate) limiter: Option<Semaphore>,
}

impl<G> Digest<G>
where
    G: Generator + Send + Sync,
{
    pub fn chunk_size(&self) -> NonZeroUsize {
        self.chunk_size
    }

    /// Produces the final summary of `text`.
    ///
    /// Fails with [`DigestError::EmptyInput`] before any generation call when
    /// `text` is empty or whitespace-only.
    #[tracing::instrument(skip_all, fields(bytes = text.len(), model = self.generator.model()))]
    pub async fn summarize(&self, text: &str) -> Result<String, DigestError> {
        if text.trim().is_empty() {
            return Err(DigestError::EmptyInput);
        }

        let segments = chunker::split(text, self.chunk_size);
        tracing::info!(
            count = segments.len(),
            chunk_size = self.chunk_size.get(),
            "Text split into segments"
        );

        self.aggregator().summarize_all(&segments).await
    }

    fn aggregator(&self) -> Aggregator<'_, G> {
        Aggregator::new(
            SegmentSummarizer::new(&self.generator, &self.safety),
            Combiner::new(&self.generator, &self.safety),
            self.limiter.as_ref(),
        )
    }
}
