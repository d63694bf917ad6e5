//! Insight requester: turns a question and table schemas into a query,
//! an answer and a chart specification with the help of a language model.

pub mod client;
pub mod config;
pub mod prompt;
pub mod repair;
pub mod reply;
pub mod requester;

use thiserror::Error;

pub use client::{LanguageModel, OpenAiClient, ScriptedModel};
pub use config::ModelConfig;
pub use reply::{parse_reply, Insight, ModelReply};
pub use requester::InsightRequester;

/// Errors at the language model boundary
#[derive(Error, Debug, Clone)]
pub enum ModelError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The reply could not be parsed, even after repair
    #[error("Malformed model response: {reason}")]
    Response { reason: String, raw: String },

    #[error("Model configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(error: reqwest::Error) -> Self {
        ModelError::Request(error.to_string())
    }
}
