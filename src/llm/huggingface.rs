use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{GenerateRequest, LlmError, Provider};

const PROVIDER: &str = "huggingface";
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Delay before the single cold-start retry after a 503.
const COLD_START_DELAY: Duration = Duration::from_secs(5);

pub struct HuggingFaceProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    cold_start_delay: Duration,
}

impl HuggingFaceProvider {
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cold_start_delay: COLD_START_DELAY,
        }
    }

    #[cfg(test)]
    fn with_cold_start_delay(mut self, delay: Duration) -> Self {
        self.cold_start_delay = delay;
        self
    }
}

#[derive(Serialize)]
struct HfRequest<'a> {
    inputs: &'a str,
    parameters: HfParameters,
}

#[derive(Serialize)]
struct HfParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct HfGeneration {
    generated_text: Option<String>,
}

#[async_trait::async_trait]
impl Provider for HuggingFaceProvider {
    async fn invoke(&self, req: &GenerateRequest) -> Result<String, LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::Configuration { provider: PROVIDER });
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| LlmError::Configuration { provider: PROVIDER })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let url = format!("{}/models/{}", self.base_url, self.model);
        let body = HfRequest {
            inputs: &req.prompt,
            parameters: HfParameters {
                max_new_tokens: req.max_tokens,
                temperature: req.temperature,
                return_full_text: false,
            },
        };

        // The inference API answers 503 while a cold model loads; wait once
        // for the fixed delay and re-issue the identical request, then give up.
        let mut retried = false;
        loop {
            let response = self
                .client
                .post(&url)
                .headers(headers.clone())
                .json(&body)
                .send()
                .await
                .map_err(|e| LlmError::Transport {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

            let status = response.status();

            if status == StatusCode::SERVICE_UNAVAILABLE {
                if retried {
                    return Err(LlmError::ProviderUnavailable { provider: PROVIDER });
                }
                tracing::info!(
                    model = %self.model,
                    delay_secs = self.cold_start_delay.as_secs_f64(),
                    "model is loading, waiting before single retry"
                );
                tokio::time::sleep(self.cold_start_delay).await;
                retried = true;
                continue;
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(LlmError::Authentication { provider: PROVIDER });
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(LlmError::QuotaExceeded { provider: PROVIDER });
            }

            if !status.is_success() {
                let error_body = response.text().await.unwrap_or_default();
                return Err(LlmError::Provider {
                    provider: PROVIDER,
                    status: status.as_u16(),
                    message: error_body,
                });
            }

            let raw = response.text().await.map_err(|e| LlmError::Transport {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

            return parse_generation_body(&raw);
        }
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

/// Success bodies come as `[{"generated_text": ...}]` or `{"generated_text": ...}`.
fn parse_generation_body(raw: &str) -> Result<String, LlmError> {
    let text = if let Ok(list) = serde_json::from_str::<Vec<HfGeneration>>(raw) {
        list.into_iter().next().and_then(|g| g.generated_text)
    } else if let Ok(single) = serde_json::from_str::<HfGeneration>(raw) {
        single.generated_text
    } else {
        None
    };

    match text {
        Some(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
        Some(_) => Err(LlmError::UnexpectedResponse {
            provider: PROVIDER,
            detail: "empty generated_text".to_string(),
        }),
        None => Err(LlmError::UnexpectedResponse {
            provider: PROVIDER,
            detail: "missing generated_text field".to_string(),
        }),
    }
}
