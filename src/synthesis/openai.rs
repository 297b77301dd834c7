//! OpenAI chat completions client (`POST /chat/completions`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{RagError, Result};
use crate::index::RetrievedPassage;
use crate::provider::{ProviderClient, PROVIDER};
use crate::synthesis::prompt::{user_message, SYSTEM_INSTRUCTION};
use crate::synthesis::{AnswerSynthesizer, Synthesis};

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// [`AnswerSynthesizer`] backed by a hosted chat model
pub struct OpenAIChatSynthesizer {
    client: ProviderClient,
    model: String,
    temperature: f32,
}

impl OpenAIChatSynthesizer {
    /// Create a synthesizer with temperature 0
    pub fn new(client: ProviderClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn request<'a>(&'a self, user: String) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn answer_text(response: ChatResponse) -> Result<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| RagError::service(PROVIDER, "chat response contained no choices"))?;
    Ok(choice.message.content.unwrap_or_default().trim().to_string())
}

#[async_trait]
impl AnswerSynthesizer for OpenAIChatSynthesizer {
    async fn synthesize(&self, query: &str, passages: Vec<RetrievedPassage>) -> Result<Synthesis> {
        debug!(
            model = %self.model,
            passages = passages.len(),
            "requesting answer"
        );

        let request = self.request(user_message(query, &passages));
        let response: ChatResponse = self.client.post_json("chat/completions", &request).await?;
        let answer = answer_text(response)?;

        Ok(Synthesis { answer, passages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credential;
    use std::time::Duration;

    fn synthesizer() -> OpenAIChatSynthesizer {
        let client = ProviderClient::new(
            "http://127.0.0.1:9",
            Credential::new("sk-test").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        OpenAIChatSynthesizer::new(client, DEFAULT_CHAT_MODEL)
    }

    #[test]
    fn test_request_is_deterministic_setting() {
        let synth = synthesizer();
        let body = serde_json::to_value(synth.request("ctx".to_string())).unwrap();
        assert_eq!(body["model"], DEFAULT_CHAT_MODEL);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "ctx");
    }

    #[test]
    fn test_answer_text_trimmed() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  We open at 9am. \n"}}]}"#,
        )
        .unwrap();
        assert_eq!(answer_text(response).unwrap(), "We open at 9am.");
    }

    #[test]
    fn test_null_content_is_empty_answer() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(answer_text(response).unwrap(), "");
    }

    #[test]
    fn test_no_choices_is_service_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(answer_text(response).unwrap_err().category(), "ServiceError");
    }
}
