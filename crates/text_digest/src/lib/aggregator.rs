use futures::future::join_all;
use text_generation::Generator;
use tokio::sync::Semaphore;

use crate::{Combiner, DigestError, Segment, SegmentSummarizer};

/// Fans segments out to the [`SegmentSummarizer`], waits for every outcome,
/// then decides whether the [`Combiner`] is needed.
#[derive(Debug)]
pub struct Aggregator<'a, G> {
    summarizer: SegmentSummarizer<'a, G>,
    combiner: Combiner<'a, G>,
    limiter: Option<&'a Semaphore>,
}

impl<'a, G> Aggregator<'a, G>
where
    G: Generator + Sync,
{
    pub fn new(
        summarizer: SegmentSummarizer<'a, G>,
        combiner: Combiner<'a, G>,
        limiter: Option<&'a Semaphore>,
    ) -> Self {
        Self {
            summarizer,
            combiner,
            limiter,
        }
    }

    /// Summarizes all segments concurrently.
    ///
    /// Partials keep their submission order regardless of completion order.
    /// Empty or whitespace-only partials are dropped; if none survive the run
    /// fails with [`DigestError::NoValidSummaries`]. A single survivor is
    /// returned as-is without a combination call.
    #[tracing::instrument(skip_all, fields(segments = segments.len()))]
    pub async fn summarize_all(&self, segments: &[Segment<'_>]) -> Result<String, DigestError> {
        tracing::info!("Summarizing all segments concurrently");

        let partials = join_all(segments.iter().map(|segment| self.summarize_gated(segment))).await;

        let mut valid = partials
            .into_iter()
            .filter(|partial| !partial.trim().is_empty())
            .collect::<Vec<_>>();

        match valid.len() {
            0 => {
                tracing::error!("No segment could be summarized");
                Err(DigestError::NoValidSummaries {
                    segments: segments.len(),
                })
            }
            1 => {
                tracing::info!("Single partial summary survived, skipping combination");
                Ok(valid.remove(0))
            }
            n => {
                tracing::info!(partials = n, "Partial summaries done, combining");
                self.combiner.combine(&valid).await
            }
        }
    }

    async fn summarize_gated(&self, segment: &Segment<'_>) -> String {
        // the semaphore is never closed, so a permit is always granted
        let _permit = match self.limiter {
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        };

        self.summarizer.summarize(segment).await
    }
}
