use text_generation::{Generator, SafetyPolicy};

use crate::Segment;

const SEGMENT_PROMPT: &str = include_str!("./prompts/segment.txt");

fn build_prompt(text: &str) -> String {
    SEGMENT_PROMPT.replacen("{{text}}", text, 1)
}

/// Summarizes one segment and absorbs every failure into an empty string.
#[derive(Debug)]
pub struct SegmentSummarizer<'a, G> {
    generator: &'a G,
    safety: &'a SafetyPolicy,
}

impl<'a, G> SegmentSummarizer<'a, G>
where
    G: Generator + Sync,
{
    pub fn new(generator: &'a G, safety: &'a SafetyPolicy) -> Self {
        Self { generator, safety }
    }

    /// Returns the partial summary, or an empty string when the call failed
    /// or the first candidate did not finish with a normal or length-limit stop.
    #[tracing::instrument(skip_all, fields(segment = segment.index + 1))]
    pub async fn summarize(&self, segment: &Segment<'_>) -> String {
        tracing::info!(start = segment.start, bytes = segment.text.len(), "Submitting segment");

        let response = match self
            .generator
            .generate(&build_prompt(segment.text), self.safety)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Failed to summarize segment");
                return String::new();
            }
        };

        match response.accepted_text() {
            Some(text) => text.to_string(),
            None => {
                tracing::warn!(
                    reason = %response.block_reason(),
                    "Segment blocked or finished abnormally"
                );
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_segment_text_once() {
        let prompt = build_prompt("body {{text}}");

        assert!(prompt.starts_with("Summarize the text below concisely"));
        assert!(prompt.trim_end().ends_with("body {{text}}"));
        assert_eq!(prompt.matches("body").count(), 1);
    }
}
