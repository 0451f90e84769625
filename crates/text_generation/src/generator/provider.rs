use crate::{
    GeminiClient, GenerationError, GenerationResponse, Generator, OpenAIClient, SafetyPolicy,
    TransportConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

/// Runtime-selected generation backend
#[derive(Clone)]
pub enum Provider {
    Gemini(GeminiClient),
    OpenAi(OpenAIClient),
}

impl Provider {
    pub fn new(
        kind: ProviderKind,
        api_key: impl Into<String>,
        model: Option<String>,
        base_url: Option<String>,
        transport: &TransportConfig,
    ) -> Result<Self, GenerationError> {
        let provider = match kind {
            ProviderKind::Gemini => {
                let mut client = GeminiClient::new(api_key, transport)?;
                if let Some(model) = model {
                    client = client.with_model(model);
                }
                if let Some(url) = base_url {
                    client = client.with_base_url(url);
                }
                Provider::Gemini(client)
            }
            ProviderKind::OpenAi => {
                let mut client = OpenAIClient::new(api_key, transport)?;
                if let Some(model) = model {
                    client = client.with_model(model);
                }
                if let Some(url) = base_url {
                    client = client.with_base_url(url);
                }
                Provider::OpenAi(client)
            }
        };

        tracing::info!(provider = ?kind, model = provider.model(), "Generation provider configured");
        Ok(provider)
    }
}

impl Generator for Provider {
    fn model(&self) -> &str {
        match self {
            Provider::Gemini(client) => client.model(),
            Provider::OpenAi(client) => client.model(),
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        safety: &SafetyPolicy,
    ) -> Result<GenerationResponse, GenerationError> {
        match self {
            Provider::Gemini(client) => client.generate(prompt, safety).await,
            Provider::OpenAi(client) => client.generate(prompt, safety).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_applies_overrides() {
        let provider = Provider::new(
            ProviderKind::OpenAi,
            "key",
            Some("local-model".into()),
            Some("http://localhost:8080/v1".into()),
            &TransportConfig::default(),
        )
        .unwrap();

        assert!(matches!(provider, Provider::OpenAi(_)));
        assert_eq!(provider.model(), "local-model");
    }
}
