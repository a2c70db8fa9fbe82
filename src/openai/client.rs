use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    Res, config,
    error::Error,
    openai::{Completion, CompletionRequest},
    types::{ChatCompletionRequest, ChatCompletionResponse},
    utils,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat completion client for an OpenAI compatible API.
///
/// A missing API key is only reported when the first completion is requested.
pub struct OpenAiClient {
    api_key: Option<String>,
    api_url: String,
    model: String,
    client: Client,
}

impl OpenAiClient {
    /// Creates a client with a 30 second request timeout.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer key, `None` if not configured
    /// * `api_url` - Base URL such as `https://api.openai.com/v1`
    /// * `model` - Model name sent with every request
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the underlying HTTP client cannot be built.
    pub fn new(api_key: Option<String>, api_url: String, model: String) -> Res<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            client,
        })
    }

    /// Builds a client from `OPENAI_API_KEY`, `OPENAI_API_URL` and `OPENAI_MODEL`.
    pub fn from_env() -> Res<Self> {
        Self::new(
            config::openai_api_key().ok(),
            config::openai_api_url(),
            config::openai_model(),
        )
    }
}

#[async_trait]
impl Completion for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Res<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY must be set".to_string()))?;

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: request.messages(),
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                service: "completion service",
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;
        reply_text(parsed)
    }
}

/// Extracts the first non-empty line of the first choice.
///
/// # Errors
///
/// Returns [`Error::Parse`] if there is no choice or its content is missing,
/// `null` or blank.
pub fn reply_text(response: ChatCompletionResponse) -> Res<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::Parse("completion reply has no choices".to_string()))?;

    choice
        .message
        .content
        .as_deref()
        .and_then(utils::first_line)
        .ok_or_else(|| Error::Parse("completion reply has no text content".to_string()))
}
