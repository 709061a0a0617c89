pub mod categories;
pub mod dishes;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::LlmError;

/// One restaurant review as delivered by the place-search collaborator.
/// Treated as opaque input; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub text: String,
    pub rating: u8,
    pub author: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub submitted_at: DateTime<Utc>,
}

/// A ranked dish. Only the dish ranker constructs these; `rank` is assigned
/// from truncation order, never taken from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub name: String,
    pub category: String,
    pub description: String,
    pub mention_count: u32,
    pub rank: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("could not parse dish data from model response: {0}")]
    ExtractionParse(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}
