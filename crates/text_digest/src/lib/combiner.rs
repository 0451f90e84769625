use itertools::Itertools;
use text_generation::{GenerationError, GenerationResponse, Generator, SafetyPolicy};

use crate::DigestError;

/// Visible separator placed between partial summaries in the merge prompt
pub const PARTIAL_SEPARATOR: &str = "\n\n---\n\n";

const COMBINE_PROMPT: &str = include_str!("./prompts/combine.txt");

fn build_prompt(partials: &[String]) -> String {
    COMBINE_PROMPT.replacen("{{partials}}", &partials.iter().join(PARTIAL_SEPARATOR), 1)
}

/// Text of the merge response.
///
/// A first candidate that stopped for any reason other than a normal or
/// length-limit stop is rejected, as is a prompt blocked before any candidate
/// was produced. A candidate without a finish reason is accepted.
fn merged_text(response: GenerationResponse) -> Result<String, GenerationError> {
    let stopped_abnormally = response
        .first_candidate()
        .and_then(|c| c.finish_reason.as_ref())
        .is_some_and(|reason| !reason.is_complete());
    let prompt_blocked = response.candidates.is_empty()
        && response
            .prompt_feedback
            .as_ref()
            .is_some_and(|f| f.block_reason.is_some());

    if stopped_abnormally || prompt_blocked {
        return Err(GenerationError::Blocked(response.block_reason()));
    }

    response.into_text()
}

/// Second-stage merge of partial summaries. Unlike segment summaries, any
/// failure here is surfaced to the caller.
#[derive(Debug)]
pub struct Combiner<'a, G> {
    generator: &'a G,
    safety: &'a SafetyPolicy,
}

impl<'a, G> Combiner<'a, G>
where
    G: Generator + Sync,
{
    pub fn new(generator: &'a G, safety: &'a SafetyPolicy) -> Self {
        Self { generator, safety }
    }

    /// Issues exactly one generation request and returns the first
    /// candidate's text verbatim.
    #[tracing::instrument(skip_all, fields(partials = partials.len()))]
    pub async fn combine(&self, partials: &[String]) -> Result<String, DigestError> {
        self.generator
            .generate(&build_prompt(partials), self.safety)
            .await
            .and_then(merged_text)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to combine partial summaries"))
            .map_err(DigestError::CombinationFailed)
    }
}
