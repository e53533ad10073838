//! Conversational assistant.
//!
//! A chat turn goes through the topic gate, then report-request detection,
//! and only then reaches the chat backend. Backend failures become a
//! readable reply, never an error.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use finbot_core::{detect_report_request, is_in_domain, UserType, OFF_TOPIC_REPLY};

use crate::config::SecondaryConfig;
use crate::prompts::{chat_prompt, CHAT_SYSTEM_PROMPT};
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider};

/// Languages the assistant can be asked to answer in.
const LANGUAGES: &[(&str, &str)] = &[
    ("hindi", "Hindi"),
    ("bengali", "Bengali"),
    ("tamil", "Tamil"),
    ("telugu", "Telugu"),
    ("marathi", "Marathi"),
    ("gujarati", "Gujarati"),
    ("kannada", "Kannada"),
    ("malayalam", "Malayalam"),
    ("punjabi", "Punjabi"),
];

/// Display name for a supported reply language. English and unknown
/// languages return `None` and get no instruction.
pub fn language_name(code: &str) -> Option<&'static str> {
    let code = code.trim().to_lowercase();
    LANGUAGES
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, name)| *name)
}

/// How a chat turn was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatReplyKind {
    Answered,
    OffTopic,
    ReportRedirect,
    BackendError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub kind: ChatReplyKind,
}

impl ChatReply {
    fn new(response: impl Into<String>, kind: ChatReplyKind) -> Self {
        Self {
            response: response.into(),
            kind,
        }
    }
}

pub struct Assistant {
    provider: Arc<dyn LlmProvider>,
    config: CompletionConfig,
}

impl Assistant {
    pub fn new(provider: Arc<dyn LlmProvider>, config: CompletionConfig) -> Self {
        Self { provider, config }
    }

    /// Use the chat token budget and temperature from config.
    pub fn from_config(config: &SecondaryConfig, provider: Arc<dyn LlmProvider>) -> Self {
        Self::new(
            provider,
            CompletionConfig {
                model: config.model.clone(),
                max_tokens: config.chat_max_tokens,
                temperature: config.chat_temperature,
                timeout: config.timeout,
            },
        )
    }

    /// Answer one message.
    pub async fn reply(&self, message: &str, user_type: UserType, language: &str) -> ChatReply {
        let prompt = match language_name(language) {
            Some(name) => format!("Reply in {}: {}", name, message),
            None => message.to_string(),
        };

        if !is_in_domain(&prompt) {
            tracing::debug!("Message outside finance domain");
            return ChatReply::new(OFF_TOPIC_REPLY, ChatReplyKind::OffTopic);
        }

        if let Some(kind) = detect_report_request(&prompt) {
            return ChatReply::new(
                format!(
                    "I can help you generate a {} financial report! Please use the 'Generate Report' \
                     button in the interface, or provide your financial data (income, expenses, goals) \
                     and I'll create a comprehensive analysis.",
                    kind
                ),
                ChatReplyKind::ReportRedirect,
            );
        }

        let messages = vec![
            ChatMessage::system(CHAT_SYSTEM_PROMPT),
            ChatMessage::user(chat_prompt(user_type, &prompt)),
        ];

        match self.provider.complete(messages, &self.config).await {
            Ok(response) => ChatReply::new(response.content, ChatReplyKind::Answered),
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "Chat completion failed");
                ChatReply::new(format!("AI model error: {}", e), ChatReplyKind::BackendError)
            }
        }
    }
}
