use std::env;

use crate::llm::huggingface::DEFAULT_BASE_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub llm_provider: String,
    pub huggingface_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub huggingface_model: String,
    pub huggingface_base_url: String,
    pub openai_model: String,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("APP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("APP_PORT must be a number"),
            environment: env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "huggingface".to_string()),
            huggingface_api_key: env::var("HUGGINGFACE_API_KEY").ok(),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            huggingface_model: env::var("HUGGINGFACE_MODEL")
                .unwrap_or_else(|_| "mistralai/Mistral-7B-Instruct-v0.2".to_string()),
            huggingface_base_url: env::var("HUGGINGFACE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            default_temperature: env::var("DEFAULT_TEMPERATURE")
                .unwrap_or_else(|_| "0.7".to_string())
                .parse()
                .expect("DEFAULT_TEMPERATURE must be a number"),
            default_max_tokens: env::var("DEFAULT_MAX_TOKENS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .expect("DEFAULT_MAX_TOKENS must be a number"),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            environment: "test".to_string(),
            llm_provider: "huggingface".to_string(),
            huggingface_api_key: Some("test-key".to_string()),
            openai_api_key: Some("test-key".to_string()),
            huggingface_model: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            huggingface_base_url: DEFAULT_BASE_URL.to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            default_temperature: 0.7,
            default_max_tokens: 500,
        }
    }
}
