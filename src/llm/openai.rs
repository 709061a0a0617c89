use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
};

use super::{GenerateRequest, LlmError, Provider};

const PROVIDER: &str = "openai";

pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiProvider {
    async fn invoke(&self, req: &GenerateRequest) -> Result<String, LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::Configuration { provider: PROVIDER });
        }

        let messages = vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(req.prompt.clone()),
                name: None,
            },
        )];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(req.temperature),
            max_completion_tokens: Some(req.max_tokens),
            ..Default::default()
        };

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(LlmError::UnexpectedResponse {
                provider: PROVIDER,
                detail: "empty assistant message".to_string(),
            });
        }

        Ok(trimmed.to_string())
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

/// async-openai surfaces API failures as display strings rather than status
/// codes, so classification works on message content.
fn classify_openai_error(err: OpenAIError) -> LlmError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if lower.contains("api key")
        || lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return LlmError::Authentication { provider: PROVIDER };
    }
    if lower.contains("quota") || lower.contains("rate limit") || lower.contains("429") {
        return LlmError::QuotaExceeded { provider: PROVIDER };
    }
    if lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("network")
        || lower.contains("reset")
    {
        return LlmError::Transport {
            provider: PROVIDER,
            message: msg,
        };
    }
    if lower.contains("deserialize") || lower.contains("missing field") {
        return LlmError::UnexpectedResponse {
            provider: PROVIDER,
            detail: msg,
        };
    }

    LlmError::Provider {
        provider: PROVIDER,
        status: 0,
        message: msg,
    }
}
