use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use crate::{
    generator::{http_client, Candidate, FinishReason, GenerationResponse},
    GenerationError, Generator, SafetyPolicy, TransportConfig,
};

/// Adapter for OpenAI-compatible `chat/completions` endpoints.
///
/// Safety thresholds cannot be expressed in this API, so the policy is
/// accepted and ignored; content filtering surfaces as a `content_filter`
/// finish reason instead.
#[derive(Clone)]
pub struct OpenAIClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIClient {
    const SYSTEM_PROMPT: &str = include_str!("./prompts/system.txt");
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

    pub fn new(
        api_key: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            client: http_client(transport)?,
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.into(),
            model: Self::DEFAULT_MODEL.into(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub async fn send_completion_request(
        &self,
        user_content: &str,
    ) -> Result<CompletionResponse, GenerationError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": Self::SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": user_content
                }
            ]
        });

        let resp = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, message });
        }

        let body = resp.text().await?;
        CompletionResponse::parse(&body)
    }
}

impl Generator for OpenAIClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        _safety: &SafetyPolicy,
    ) -> Result<GenerationResponse, GenerationError> {
        tracing::debug!(model = %self.model, "Safety policy not supported by chat completions, ignoring");
        Ok(self.send_completion_request(prompt).await?.into())
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: Option<CompletionMessage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

impl CompletionResponse {
    pub fn parse(body: &str) -> Result<Self, GenerationError> {
        serde_json::from_str(body)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to decode completion response"))
            .map_err(|e| GenerationError::Malformed(e.to_string()))
    }
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::MaxTokens,
        "content_filter" => FinishReason::Safety,
        _ => FinishReason::Other,
    }
}

impl From<CompletionResponse> for GenerationResponse {
    fn from(resp: CompletionResponse) -> Self {
        GenerationResponse {
            candidates: resp
                .choices
                .into_iter()
                .map(|choice| Candidate {
                    finish_reason: choice.finish_reason.as_deref().map(map_finish_reason),
                    text: choice.message.and_then(|m| m.content),
                })
                .collect(),
            prompt_feedback: None,
        }
    }
}
