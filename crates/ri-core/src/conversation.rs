//! Conversation history for one session
//!
//! Messages are appended as the user asks questions and the pipeline
//! answers them. Assistant messages may carry the chart that was shown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::RenderedChart;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in the conversation
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Chart shown alongside an assistant answer
    pub chart: Option<RenderedChart>,
    pub created_at: DateTime<Utc>,
}

/// Ordered chat history
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a question from the user
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::User,
            content: content.into(),
            chart: None,
            created_at: Utc::now(),
        });
    }

    /// Record an answer, optionally with its chart
    pub fn push_assistant(&mut self, content: impl Into<String>, chart: Option<RenderedChart>) {
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: content.into(),
            chart,
            created_at: Utc::now(),
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
