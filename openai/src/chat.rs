use std::sync::Arc;

use aadhaar_core::{ChatModel, Message, Role};
use serde::{Deserialize, Serialize};

use crate::{
    client::{Config, OpenAI, post_with_retry},
    error::OpenAIError,
};

impl ChatModel for OpenAI {
    type Error = OpenAIError;

    fn complete(
        &self,
        messages: &[Message],
    ) -> impl core::future::Future<Output = Result<String, Self::Error>> + Send {
        let cfg = self.config();
        let payload = to_chat_messages(messages);
        async move {
            let (max_tokens, temperature) = (cfg.max_tokens, cfg.temperature);
            chat_once(cfg, payload, max_tokens, temperature).await
        }
    }
}

impl OpenAI {
    /// Sends a completion with per-call sampling parameters, overriding the
    /// client defaults. Used for auxiliary calls such as history
    /// summarization, which want a short, low-temperature answer.
    pub async fn complete_with(
        &self,
        messages: &[Message],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, OpenAIError> {
        let cfg = self.config();
        let payload = to_chat_messages(messages);
        chat_once(cfg, payload, max_tokens, temperature).await
    }
}

async fn chat_once(
    cfg: Arc<Config>,
    messages: Vec<ChatMessagePayload>,
    max_tokens: u32,
    temperature: f32,
) -> Result<String, OpenAIError> {
    let request = ChatCompletionRequest {
        model: &cfg.chat_model,
        messages,
        max_tokens,
        temperature,
    };
    let response: ChatCompletionResponse =
        post_with_retry(&cfg, "/chat/completions", &request).await?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| OpenAIError::Api("chat response missing message content".into()))
}

fn to_chat_messages(messages: &[Message]) -> Vec<ChatMessagePayload> {
    messages
        .iter()
        .map(|message| ChatMessagePayload {
            role: match message.role() {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => "system",
            },
            content: message.content().to_owned(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessagePayload>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessagePayload {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
