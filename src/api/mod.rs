//! Remote chat service API.
//!
//! The service exposes three endpoints, all `POST`:
//!
//! | Path | Request | Reply |
//! |------|---------|-------|
//! | `/chat/` | JSON [`ChatRequest`] | [`ChatReply`] |
//! | `/upload/` | multipart field `file` | [`DetailReply`] |
//! | `/reset/` | empty | [`DetailReply`] |
//!
//! [`ChatBackend`] is the seam the rest of the crate talks to; [`ApiClient`]
//! is the HTTP implementation.

mod client;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use client::ApiClient;

/// Body of `POST /chat/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Session identifier correlating server-side memory.
    pub session_id: String,
    /// The user's message as typed.
    pub message: String,
}

/// Reply from `POST /chat/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant text. Absent when the service could not produce one.
    #[serde(default)]
    pub response: Option<String>,
}

/// Reply from `POST /upload/` and `POST /reset/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailReply {
    /// Human-readable outcome.
    #[serde(default)]
    pub detail: Option<String>,
}

/// Operations the front end needs from the chat service.
#[async_trait]
pub trait ChatBackend: Send + Sync + std::fmt::Debug {
    /// Send one chat turn.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply>;

    /// Upload a local file for the service to index.
    async fn upload(&self, path: &Path) -> Result<DetailReply>;

    /// Clear the service's memory.
    async fn reset(&self) -> Result<DetailReply>;
}
