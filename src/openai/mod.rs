//! # Completion Service Module
//!
//! Everything that talks to the chat completion service lives here:
//!
//! - [`client`] - HTTP client for an OpenAI compatible `/chat/completions` endpoint
//! - [`prompts`] - The fixed system instructions sent with every call
//! - [`translator`] - Turns a free-text vibe into a [`crate::query::SearchQuery`]
//! - [`title`] - Names the playlist after the vibe
//!
//! The translator and the title generator only see the [`Completion`] trait, so
//! the pipeline can run against any backend that answers a system + user message
//! pair with a line of text.

use async_trait::async_trait;

use crate::{Res, types::ChatMessage};

pub mod client;
pub mod prompts;
pub mod title;
pub mod translator;

pub use client::OpenAiClient;

/// One chat completion call: a fixed instruction plus the user's prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    /// `None` leaves sampling at the service default.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![ChatMessage::system(&self.system), ChatMessage::user(&self.user)]
    }
}

/// A text completion backend.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Returns the first non-empty line of the reply, trimmed.
    async fn complete(&self, request: CompletionRequest) -> Res<String>;
}
