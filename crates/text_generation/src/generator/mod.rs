pub mod gemini;
pub mod openai;
pub mod provider;

use std::{future::Future, time::Duration};

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;

use crate::SafetyPolicy;

/// A hosted text-generation capability.
///
/// Implementations submit a single prompt and report every candidate the
/// service produced together with its completion reason. Deciding whether a
/// candidate is usable is left to the caller.
pub trait Generator {
    /// Model identifier, used for diagnostics only
    fn model(&self) -> &str;

    fn generate(
        &self,
        prompt: &str,
        safety: &SafetyPolicy,
    ) -> impl Future<Output = Result<GenerationResponse, GenerationError>> + Send;
}

impl<T: Generator + Send + Sync> Generator for &T {
    fn model(&self) -> &str {
        (**self).model()
    }

    async fn generate(
        &self,
        prompt: &str,
        safety: &SafetyPolicy,
    ) -> Result<GenerationResponse, GenerationError> {
        (**self).generate(prompt, safety).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Response contained no candidate text")]
    EmptyResponse,
    #[error("Generation blocked: {0}")]
    Blocked(String),
}

/// Why the service stopped generating a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Blocklist,
    ProhibitedContent,
    Spii,
    #[serde(other)]
    Other,
}

impl FinishReason {
    /// `true` for a normal stop or a length-limit stop
    pub fn is_complete(&self) -> bool {
        matches!(self, FinishReason::Stop | FinishReason::MaxTokens)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub finish_reason: Option<FinishReason>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Provider-neutral view of a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationResponse {
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerationResponse {
    /// Single completed candidate, mostly useful for building fixtures
    pub fn completed(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                finish_reason: Some(FinishReason::Stop),
                text: Some(text.into()),
            }],
            prompt_feedback: None,
        }
    }

    /// Response whose prompt was rejected before any candidate was produced
    pub fn blocked(block_reason: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some(block_reason.into()),
            }),
        }
    }

    pub fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Text of the first candidate, provided it finished normally or hit the
    /// length limit.
    pub fn accepted_text(&self) -> Option<&str> {
        self.first_candidate()
            .filter(|c| c.finish_reason.as_ref().is_some_and(FinishReason::is_complete))
            .and_then(|c| c.text.as_deref())
    }

    /// Best available explanation for a rejected response
    pub fn block_reason(&self) -> String {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return reason.to_string();
        }

        match self.first_candidate() {
            Some(Candidate {
                finish_reason: Some(reason),
                ..
            }) => format!("{reason:?}"),
            Some(_) => "unspecified".into(),
            None => "no candidates".into(),
        }
    }

    /// Text of the first candidate regardless of its finish reason.
    /// Callers that must reject blocked output check the finish reason first.
    pub fn into_text(self) -> Result<String, GenerationError> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.text)
            .ok_or(GenerationError::EmptyResponse)
    }
}

/// Transport settings shared by every adapter.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }
}

/// Builds the retrying HTTP client used by the adapters.
///
/// Transient failures (connect errors, 5xx, 429) are retried with
/// exponential backoff; the timeout applies to each attempt.
pub fn http_client(config: &TransportConfig) -> Result<ClientWithMiddleware, GenerationError> {
    let client = reqwest::Client::builder().timeout(config.timeout).build()?;
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(reason: Option<FinishReason>, text: &str) -> GenerationResponse {
        GenerationResponse {
            candidates: vec![Candidate {
                finish_reason: reason,
                text: Some(text.into()),
            }],
            prompt_feedback: None,
        }
    }

    #[test]
    fn test_finish_reason_decodes_known_and_unknown_values() {
        let reasons: Vec<FinishReason> =
            serde_json::from_str(r#"["STOP", "MAX_TOKENS", "SAFETY", "SOMETHING_NEW"]"#).unwrap();

        assert_eq!(
            reasons,
            vec![
                FinishReason::Stop,
                FinishReason::MaxTokens,
                FinishReason::Safety,
                FinishReason::Other
            ]
        );
    }

    #[test]
    fn test_accepted_text_requires_complete_finish_reason() {
        assert_eq!(
            candidate(Some(FinishReason::Stop), "ok").accepted_text(),
            Some("ok")
        );
        assert_eq!(
            candidate(Some(FinishReason::MaxTokens), "cut").accepted_text(),
            Some("cut")
        );
        assert_eq!(
            candidate(Some(FinishReason::Safety), "nope").accepted_text(),
            None
        );
        assert_eq!(candidate(None, "unknown").accepted_text(), None);
        assert_eq!(GenerationResponse::default().accepted_text(), None);
    }

    #[test]
    fn test_block_reason_prefers_prompt_feedback() {
        assert_eq!(GenerationResponse::blocked("SAFETY").block_reason(), "SAFETY");
        assert_eq!(
            candidate(Some(FinishReason::Recitation), "x").block_reason(),
            "Recitation"
        );
        assert_eq!(GenerationResponse::default().block_reason(), "no candidates");
    }

    #[test]
    fn test_into_text_ignores_finish_reason() {
        let text = candidate(Some(FinishReason::Safety), "merged")
            .into_text()
            .unwrap();
        assert_eq!(text, "merged");

        assert!(matches!(
            GenerationResponse::default().into_text(),
            Err(GenerationError::EmptyResponse)
        ));
    }
}
