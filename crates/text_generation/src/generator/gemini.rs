use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};

use crate::{
    generator::{http_client, Candidate, FinishReason, GenerationResponse, PromptFeedback},
    GenerationError, Generator, SafetyPolicy, TransportConfig,
};

/// Adapter for Google's `generateContent` REST API.
#[derive(Clone)]
pub struct GeminiClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub const DEFAULT_MODEL: &str = "gemini-flash-latest";
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

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

    pub async fn send_generate_request(
        &self,
        prompt: &str,
        safety: &SafetyPolicy,
    ) -> Result<GeminiResponse, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            safety_settings: safety,
        };

        let resp = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url.trim_end_matches('/'),
                self.model
            ))
            .header("x-goog-api-key", &self.api_key)
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
        GeminiResponse::parse(&body)
    }
}

impl Generator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        safety: &SafetyPolicy,
    ) -> Result<GenerationResponse, GenerationError> {
        Ok(self.send_generate_request(prompt, safety).await?.into())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    safety_settings: &'a SafetyPolicy,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiPart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    pub block_reason: Option<String>,
}

impl GeminiResponse {
    pub fn parse(body: &str) -> Result<Self, GenerationError> {
        serde_json::from_str(body)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to decode Gemini response"))
            .map_err(|e| GenerationError::Malformed(e.to_string()))
    }
}

impl From<GeminiResponse> for GenerationResponse {
    fn from(resp: GeminiResponse) -> Self {
        let candidates = resp
            .candidates
            .into_iter()
            .map(|c| {
                // multi-part candidates are concatenated, text-less parts skipped
                let text = c.content.and_then(|content| {
                    let parts = content
                        .parts
                        .into_iter()
                        .filter_map(|p| p.text)
                        .collect::<Vec<_>>();
                    (!parts.is_empty()).then(|| parts.concat())
                });

                Candidate {
                    finish_reason: c.finish_reason,
                    text,
                }
            })
            .collect();

        GenerationResponse {
            candidates,
            prompt_feedback: resp.prompt_feedback.map(|f| PromptFeedback {
                block_reason: f.block_reason,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let policy = SafetyPolicy::default();
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "hello" }],
            }],
            safety_settings: &policy,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_parse_completed_response() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Part one. "}, {"text": "Part two."}]},
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": {"promptTokenCount": 10}
        }"#;

        let resp: GenerationResponse = GeminiResponse::parse(body).unwrap().into();
        assert_eq!(resp.accepted_text(), Some("Part one. Part two."));
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;

        let resp: GenerationResponse = GeminiResponse::parse(body).unwrap().into();
        assert!(resp.candidates.is_empty());
        assert_eq!(resp.accepted_text(), None);
        assert_eq!(resp.block_reason(), "SAFETY");
    }

    #[test]
    fn test_parse_safety_stopped_candidate_without_content() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY", "index": 0}]}"#;

        let resp: GenerationResponse = GeminiResponse::parse(body).unwrap().into();
        assert_eq!(resp.candidates[0].finish_reason, Some(FinishReason::Safety));
        assert_eq!(resp.candidates[0].text, None);
        assert_eq!(resp.accepted_text(), None);
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        let result = GeminiResponse::parse("<html>bad gateway</html>");
        assert!(matches!(result, Err(GenerationError::Malformed(_))));
    }
}
