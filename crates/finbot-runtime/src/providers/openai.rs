//! OpenAI-compatible chat-completion provider (Groq and friends).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    http_client,
    secrets::ApiCredential,
    BackendError, ChatMessage, CompletionConfig, CompletionResponse, LlmProvider,
};
use crate::config::SecondaryConfig;

/// Chat provider speaking the `/chat/completions` protocol.
///
/// A missing API key does not prevent construction; every call then fails
/// with [`BackendError::NotConfigured`] so callers can fall back.
pub struct OpenAiCompatibleProvider {
    url: String,
    credential: Option<ApiCredential>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatibleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleProvider")
            .field("url", &self.url)
            .field("credential", &self.credential)
            .finish()
    }
}

impl OpenAiCompatibleProvider {
    pub fn new(url: impl Into<String>, credential: Option<ApiCredential>) -> Result<Self, BackendError> {
        Ok(Self {
            url: url.into(),
            credential,
            client: http_client()?,
        })
    }

    /// Build from config, reading the key from `api_key_env`.
    pub fn from_config(config: &SecondaryConfig) -> Result<Self, BackendError> {
        let credential = match ApiCredential::from_env(&config.api_key_env, "Chat API key") {
            Ok(credential) => Some(credential),
            Err(e) => {
                tracing::warn!(error = %e, "Secondary backend has no API key; it will be skipped");
                None
            }
        };
        Self::new(config.url.clone(), credential)
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Object { message: String },
    Text(String),
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: ErrorDetail::Object { message },
        })
        | Ok(ErrorBody {
            error: ErrorDetail::Text(message),
        }) => message,
        Err(_) if !body.trim().is_empty() => body.trim().chars().take(200).collect(),
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, BackendError> {
        let credential = self.credential.as_ref().ok_or_else(|| {
            BackendError::NotConfigured("chat API key is not set".to_string())
        })?;

        let request = ChatRequest {
            model: &config.model,
            messages: &messages,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(credential.expose())
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(e, config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::from_reqwest(e, config.timeout))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(BackendError::EmptyResponse)?;

        Ok(CompletionResponse {
            content,
            model: body.model.unwrap_or_else(|| config.model.clone()),
        })
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}
