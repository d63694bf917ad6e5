//! Language model clients

use std::collections::VecDeque;
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tracing::debug;

use crate::config::ModelConfig;
use crate::ModelError;

/// A chat model that answers a single prompt
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ModelError>;
}

/// Client for any OpenAI-compatible chat completions endpoint
pub struct OpenAiClient {
    client: reqwest::Client,
    config: ModelConfig,
}

impl OpenAiClient {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        if config.model.trim().is_empty() {
            return Err(ModelError::Config("model name is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ModelError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ModelError> {
        let mut body = json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": temperature,
            "stream": false,
        });
        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let mut request = self.client.post(self.config.chat_url()).json(&body);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        debug!("Posting {} prompt chars to {}", prompt.len(), self.config.chat_url());
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        let json: serde_json::Value = response.json().await?;
        message_content(&json)
    }
}

/// `choices[0].message.content` of a chat completion
fn message_content(json: &serde_json::Value) -> Result<String, ModelError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| ModelError::Response {
            reason: "completion has no message content".to_string(),
            raw: json.to_string(),
        })
}

/// Replays canned replies in order and records every prompt it receives.
///
/// Stands in for a real model in the tests of this crate and its callers.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    prompts: Mutex<Vec<(String, f32)>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a failure
    pub fn push_error(&self, error: ModelError) {
        self.replies.lock().push_back(Err(error));
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().push_back(Ok(reply.into()));
    }

    /// Prompts received so far, with their temperatures
    pub fn prompts(&self) -> Vec<(String, f32)> {
        self.prompts.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ModelError> {
        self.prompts.lock().push((prompt.to_string(), temperature));
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Request("no scripted reply left".to_string())))
    }
}
