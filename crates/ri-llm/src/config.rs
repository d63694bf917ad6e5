//! Language model configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// OpenAI-compatible endpoint, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Temperature of the insight pass
    pub temperature: f32,
    /// Temperature of the formatting clean-up pass
    pub cleanup_temperature: f32,
    /// Run the clean-up pass after the insight pass
    pub cleanup_pass: bool,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: 0.5,
            cleanup_temperature: 0.1,
            cleanup_pass: true,
            max_tokens: Some(1024),
            timeout_secs: 60,
        }
    }
}

impl ModelConfig {
    /// Chat completions endpoint derived from the base url
    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url() {
        let mut config = ModelConfig::default();
        assert_eq!(config.chat_url(), "https://api.openai.com/v1/chat/completions");

        config.base_url = "http://localhost:1234/v1/".to_string();
        assert_eq!(config.chat_url(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn test_partial_config() {
        let config: ModelConfig = serde_json::from_str(r#"{"model": "gpt-4o-mini"}"#).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.cleanup_pass);
        assert_eq!(config.temperature, 0.5);
    }
}
