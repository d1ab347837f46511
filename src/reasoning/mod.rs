//! Chat-completion client for solving tasks
//!
//! Sends the tutoring instruction as a user message and, when present, the
//! style directive as a preceding system message. Transient failures are
//! retried according to [`RetryPolicy`].

pub mod retry;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::ReasoningError;
use crate::style;
use crate::Result;

pub use retry::RetryPolicy;

/// Default completion endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.mistral.ai/v1/chat/completions";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "mistral-tiny";

/// Sampling temperature for every request
pub const TEMPERATURE: f32 = 0.7;

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that turns an instruction into a worked solution
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Solve a task
    ///
    /// `style` is the user's style directive; implementations clamp it to
    /// [`style::MAX_STYLE_CHARS`] before use.
    ///
    /// # Errors
    ///
    /// Returns `Error::ReasoningService` when the service cannot produce an answer
    async fn solve(&self, instruction: &str, style: &str) -> Result<String>;
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

/// A message in the request
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// HTTP client for the completion service
pub struct ReasoningClient {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
    policy: RetryPolicy,
}

impl ReasoningClient {
    /// Create a client with the default endpoint, model and retry policy
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(api_key: SecretString) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            policy: RetryPolicy::default(),
        })
    }

    /// Override the completion endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// One request/response round trip
    async fn attempt(&self, request: &ChatRequest<'_>) -> std::result::Result<String, ReasoningError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %body, "reasoning service error");
            return Err(ReasoningError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content = extract_content(&body)?;
        tracing::info!(
            preview = %content.chars().take(100).collect::<String>(),
            "reasoning service replied"
        );
        Ok(content)
    }
}

#[async_trait]
impl Reasoner for ReasoningClient {
    async fn solve(&self, instruction: &str, style: &str) -> Result<String> {
        let style = style::bounded(style);

        let mut messages = Vec::with_capacity(2);
        if !style.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: style,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: instruction,
        });

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
        };

        tracing::info!(
            model = %self.model,
            instruction_chars = instruction.chars().count(),
            "sending task to reasoning service"
        );

        let content = retry::retry(&self.policy, ReasoningError::is_retryable, |attempt| {
            tracing::debug!(attempt, "reasoning attempt");
            self.attempt(&request)
        })
        .await?;

        Ok(content)
    }
}

/// Pull `choices[0].message.content` out of a success body
fn extract_content(body: &str) -> std::result::Result<String, ReasoningError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| ReasoningError::Malformed(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ReasoningError::Malformed("missing choices[0].message.content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_trimmed_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"  x = 2  \n"}},{"message":{"content":"other"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "x = 2");
    }

    #[test]
    fn missing_fields_are_malformed() {
        for body in [
            "{}",
            r#"{"choices":[]}"#,
            r#"{"choices":[{}]}"#,
            r#"{"choices":[{"message":{}}]}"#,
            r#"{"choices":[{"message":{"content":""}}]}"#,
            r#"{"choices":[{"message":{"content":" \n\t "}}]}"#,
            "not json",
        ] {
            assert!(
                matches!(extract_content(body), Err(ReasoningError::Malformed(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn request_shape() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "solve",
            }],
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "mistral-tiny");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "solve");
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }
}
