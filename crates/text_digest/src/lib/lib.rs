//! # Text Digest
//!
//! Chunked map-reduce summarization over an external text-generation
//! service. Long input is cut into bounded segments, every segment is
//! summarized concurrently, failed segments are dropped, and the surviving
//! partial summaries are merged into one final summary.

mod aggregator;
pub mod chunker;
mod combiner;
mod error;
mod pipeline;
mod segment;
pub mod server;
pub mod tracing;

pub use aggregator::Aggregator;
pub use chunker::{Segment, DEFAULT_CHUNK_SIZE};
pub use combiner::{Combiner, PARTIAL_SEPARATOR};
pub use error::DigestError;
pub use pipeline::{builder::DigestBuilder, Digest};
pub use segment::SegmentSummarizer;
