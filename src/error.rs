use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::llm::LlmError;
use crate::pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Pipeline(PipelineError::Llm(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Pipeline(err) => pipeline_status(err),
        };

        let body = json!({
            "error": error_message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

/// Parse failures mean the model misbehaved; infrastructure failures get
/// their own statuses so the frontend can word the two differently.
fn pipeline_status(err: &PipelineError) -> (StatusCode, String) {
    match err {
        PipelineError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        PipelineError::ExtractionParse(msg) => {
            tracing::error!(error = %msg, "model response could not be parsed");
            (
                StatusCode::BAD_GATEWAY,
                "The AI response could not be interpreted. Please try again.".to_string(),
            )
        }
        PipelineError::Llm(llm) => {
            tracing::error!(error = %llm, "LLM call failed");
            match llm {
                LlmError::Configuration { .. } | LlmError::Authentication { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM provider is misconfigured".to_string(),
                ),
                LlmError::QuotaExceeded { .. } => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "LLM quota exceeded, please try again later".to_string(),
                ),
                LlmError::ProviderUnavailable { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The model is still warming up, please try again shortly".to_string(),
                ),
                LlmError::Transport { .. }
                | LlmError::Provider { .. }
                | LlmError::UnexpectedResponse { .. } => (
                    StatusCode::BAD_GATEWAY,
                    "LLM provider request failed".to_string(),
                ),
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
