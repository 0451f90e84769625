use std::num::NonZeroUsize;

use text_generation::{Generator, SafetyPolicy};
use tokio::sync::Semaphore;

use crate::{Digest, DEFAULT_CHUNK_SIZE};

pub struct DigestBuilder<G = ()> {
    generator: G,
    safety: SafetyPolicy,
    chunk_size: NonZeroUsize,
    max_concurrency: Option<NonZeroUsize>,
}

impl DigestBuilder {
    pub fn new() -> Self {
        Self {
            generator: (),
            safety: SafetyPolicy::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrency: None,
        }
    }
}

impl Default for DigestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> DigestBuilder<G> {
    pub fn generator<G2: Generator + Send + Sync>(self, generator: G2) -> DigestBuilder<G2> {
        DigestBuilder {
            generator,
            safety: self.safety,
            chunk_size: self.chunk_size,
            max_concurrency: self.max_concurrency,
        }
    }

    pub fn safety_policy(mut self, safety: SafetyPolicy) -> Self {
        self.safety = safety;
        self
    }

    pub fn chunk_size(mut self, chunk_size: NonZeroUsize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Caps the number of in-flight segment requests. `None` leaves the
    /// fan-out unbounded.
    pub fn max_concurrency(mut self, max_concurrency: Option<NonZeroUsize>) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

impl<G> DigestBuilder<G>
where
    G: Generator + Send + Sync,
{
    pub fn build(self) -> Digest<G> {
        Digest {
            generator: self.generator,
            safety: self.safety,
            chunk_size: self.chunk_size,
            limiter: self.max_concurrency.map(|n| Semaphore::new(n.get())),
        }
    }
}
