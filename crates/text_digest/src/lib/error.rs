use text_generation::GenerationError;

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("Text is required.")]
    EmptyInput,
    #[error("Failed to summarize the text: all {segments} segment request(s) failed or were blocked")]
    NoValidSummaries { segments: usize },
    #[error("Failed to combine partial summaries into the final summary: {0}")]
    CombinationFailed(#[source] GenerationError),
}

impl DigestError {
    /// Whether the caller, not the pipeline, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, DigestError::EmptyInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_empty_input_is_a_client_error() {
        assert!(DigestError::EmptyInput.is_client_error());
        assert!(!DigestError::NoValidSummaries { segments: 3 }.is_client_error());
        assert!(!DigestError::CombinationFailed(GenerationError::EmptyResponse).is_client_error());
    }

    #[test]
    fn test_no_valid_summaries_message_mentions_segment_count() {
        let msg = DigestError::NoValidSummaries { segments: 3 }.to_string();
        assert!(msg.contains("all 3 segment"), "got: {msg}");
    }
}
