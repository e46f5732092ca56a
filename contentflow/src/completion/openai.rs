//! OpenAI-compatible chat-completions client.
//!
//! Works against any endpoint that speaks the `/chat/completions` protocol
//! (OpenAI, DashScope, Ollama, LM Studio, ...).

use super::{ChatMessage, CompletionClient, CompletionRequest, CompletionResponse, ResponseFormat};
use crate::config::CompletionConfig;
use crate::errors::CompletionError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

const MAX_ERROR_BODY: usize = 512;

/// Client for an OpenAI-compatible completion endpoint.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    config: CompletionConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
}

impl OpenAICompatibleClient {
    /// Creates a new client.
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CompletionError::Build(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.temperature,
            response_format: match request.response_format {
                ResponseFormat::Text => None,
                format @ ResponseFormat::JsonObject => Some(format),
            },
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAICompatibleClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let start = Instant::now();
        let body = self.request_body(request);

        debug!(
            model = %self.config.model,
            temperature = request.temperature,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Completion service returned an error status");
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidJson(e.to_string()))?;

        let mut completion = into_completion(payload)?;
        completion.latency_ms = Some(start.elapsed().as_secs_f64() * 1000.0);
        Ok(completion)
    }
}

fn into_completion(payload: ChatCompletionResponse) -> Result<CompletionResponse, CompletionError> {
    let ChatCompletionResponse { model, choices, usage } = payload;

    let choice = choices.into_iter().next().ok_or(CompletionError::EmptyResponse)?;
    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(CompletionError::EmptyResponse)?;

    Ok(CompletionResponse {
        content,
        model,
        input_tokens: usage.as_ref().and_then(|u| u.prompt_tokens),
        output_tokens: usage.as_ref().and_then(|u| u.completion_tokens),
        finish_reason: choice.finish_reason,
        latency_ms: None,
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}
