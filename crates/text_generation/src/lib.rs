//! # Text Generation
//!
//! This crate provides the outbound side of the summarizer: a single
//! `Generator` capability that turns a prompt into a set of candidate
//! completions, plus the HTTP adapters that implement it against hosted
//! large-language-model APIs.
//!
//! Adapters are interchangeable. The pipeline only ever sees the
//! provider-neutral [`GenerationResponse`], so swapping Gemini for an
//! OpenAI-compatible endpoint is a configuration change.

mod generator;
mod safety;

pub use generator::gemini::GeminiClient;
pub use generator::openai::OpenAIClient;
pub use generator::provider::{Provider, ProviderKind};
pub use generator::{
    http_client, Candidate, FinishReason, GenerationError, GenerationResponse, Generator,
    PromptFeedback, TransportConfig,
};
pub use safety::{HarmBlockThreshold, HarmCategory, SafetyPolicy, SafetySetting};
