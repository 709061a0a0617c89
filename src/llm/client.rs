use std::sync::Arc;

use crate::config::Config;

use super::huggingface::HuggingFaceProvider;
use super::openai::OpenAiProvider;
use super::{GenerateRequest, LlmError, Provider};

/// Generation facade. The provider is resolved once from configuration at
/// process start; every call for the process lifetime goes to that one
/// adapter. Results and errors pass through untransformed.
pub struct LlmClient {
    provider: Arc<dyn Provider>,
    max_tokens: u32,
    temperature: f32,
}

impl LlmClient {
    pub fn from_config(config: &Config) -> Self {
        let provider: Arc<dyn Provider> = match config.llm_provider.as_str() {
            "openai" => Arc::new(OpenAiProvider::new(
                config.openai_api_key.as_deref().unwrap_or(""),
                &config.openai_model,
            )),
            // Default, including unrecognized selectors.
            _ => Arc::new(HuggingFaceProvider::new(
                config.huggingface_api_key.as_deref().unwrap_or(""),
                &config.huggingface_model,
                &config.huggingface_base_url,
            )),
        };

        Self {
            provider,
            max_tokens: config.default_max_tokens,
            temperature: config.default_temperature,
        }
    }

    #[cfg(test)]
    pub fn with_provider(provider: Arc<dyn Provider>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            provider,
            max_tokens,
            temperature,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.provider
            .invoke(&GenerateRequest {
                prompt: prompt.to_string(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            })
            .await
    }
}
