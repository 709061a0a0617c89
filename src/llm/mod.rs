pub mod client;
pub mod huggingface;
pub mod openai;

pub use client::LlmClient;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// One hosted-model backend. Implementations own request shaping, auth,
/// and any provider-specific retry; callers see trimmed text or a typed error.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn invoke(&self, req: &GenerateRequest) -> Result<String, LlmError>;
    fn name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{provider} API key is not configured")]
    Configuration { provider: &'static str },

    #[error("{provider} rejected the API key")]
    Authentication { provider: &'static str },

    #[error("network error reaching {provider}: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} model is still unavailable after cold-start retry")]
    ProviderUnavailable { provider: &'static str },

    #[error("{provider} quota exceeded")]
    QuotaExceeded { provider: &'static str },

    #[error("{provider} API error ({status}): {message}")]
    Provider {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("unexpected response format from {provider}: {detail}")]
    UnexpectedResponse {
        provider: &'static str,
        detail: String,
    },
}
