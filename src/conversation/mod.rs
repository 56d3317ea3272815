//! Conversation state and its transitions.
//!
//! [`Conversation`] owns everything the user can see: the transcript, the
//! input buffer, the selected upload file and the upload status. Each user
//! action is split into a `begin_*` step, which updates state synchronously
//! and describes the request to make, and an `apply_*` step, which folds the
//! request's outcome back in.
//!
//! ```rust
//! use lmchat::api::ChatReply;
//! use lmchat::conversation::{Conversation, Role};
//! use lmchat::session::SessionId;
//!
//! let mut conversation = Conversation::new(SessionId::generate());
//! conversation.set_input("Hello");
//!
//! let request = conversation.begin_send().expect("non-blank input");
//! assert_eq!(request.message, "Hello");
//! assert_eq!(conversation.transcript().len(), 1);
//!
//! conversation.apply_chat_reply(Ok(ChatReply { response: Some("Hi!".into()) }));
//! assert_eq!(conversation.transcript().last().unwrap().role, Role::Assistant);
//! ```

mod transcript;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::api::{ChatReply, ChatRequest, DetailReply};
use crate::error::Result;
use crate::session::SessionId;

pub use transcript::{Message, Role, Transcript};

/// Assistant text when the service replied without a `response`.
pub const NO_RESPONSE_TEXT: &str = "Error: No response";
/// Assistant text when the chat request itself failed.
pub const CHAT_FAILED_TEXT: &str = "Error: Failed to reach the chat service";
/// Upload status when the service replied without a `detail`.
pub const UPLOAD_COMPLETE_TEXT: &str = "Upload complete";
/// Upload status when the upload failed.
pub const UPLOAD_FAILED_TEXT: &str = "Upload failed";
/// Upload status when a non-`.txt` file is rejected locally.
pub const TXT_ONLY_TEXT: &str = "Only .txt files are allowed.";
/// Notice when the reset reply carried no `detail`.
pub const RESET_COMPLETE_TEXT: &str = "Reset complete";
/// Notice when the reset request failed.
pub const RESET_FAILED_TEXT: &str = "Failed to reset memory";

/// User-visible conversation state.
#[derive(Debug, Clone)]
pub struct Conversation {
    session_id: SessionId,
    transcript: Transcript,
    input: String,
    selected_file: Option<PathBuf>,
    upload_status: String,
    enforce_txt: bool,
}

impl Conversation {
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            transcript: Transcript::new(),
            input: String::new(),
            selected_file: None,
            upload_status: String::new(),
            enforce_txt: false,
        }
    }

    /// Reject non-`.txt` uploads before they reach the service.
    #[must_use]
    pub fn with_txt_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_txt = enforce;
        self
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Start sending the current input.
    ///
    /// Blank input is a no-op and returns `None`. Otherwise the user message
    /// is appended immediately, the input is cleared, and the request to send
    /// is returned.
    pub fn begin_send(&mut self) -> Option<ChatRequest> {
        if self.input.trim().is_empty() {
            return None;
        }

        let message = std::mem::take(&mut self.input);
        self.transcript.push(Message::user(message.clone()));

        Some(ChatRequest {
            session_id: self.session_id.to_string(),
            message,
        })
    }

    /// Fold a chat outcome into the transcript as one assistant message.
    pub fn apply_chat_reply(&mut self, outcome: Result<ChatReply>) -> &Message {
        let content = match outcome {
            Ok(reply) => reply
                .response
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string()),
            Err(e) => {
                warn!(name: "chat.failed", error = %e, "Chat request failed");
                CHAT_FAILED_TEXT.to_string()
            }
        };
        self.transcript.push(Message::assistant(content))
    }

    /// Choose the file the next upload will send.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        self.selected_file = Some(path.into());
    }

    #[must_use]
    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    #[must_use]
    pub fn upload_status(&self) -> &str {
        &self.upload_status
    }

    /// Start uploading the selected file.
    ///
    /// Returns `None` without touching the status when nothing is selected.
    /// The selection is kept so the same file can be sent again.
    pub fn begin_upload(&mut self) -> Option<PathBuf> {
        let path = self.selected_file.clone()?;

        if !has_txt_extension(&path) {
            if self.enforce_txt {
                self.upload_status = TXT_ONLY_TEXT.to_string();
                return None;
            }
            warn!(
                name: "upload.unexpected_type",
                file = %path.display(),
                "Uploading a file without a .txt extension"
            );
        }

        Some(path)
    }

    /// Fold an upload outcome into the status line.
    pub fn apply_upload_reply(&mut self, outcome: Result<DetailReply>) -> &str {
        self.upload_status = match outcome {
            Ok(reply) => detail_or(reply, UPLOAD_COMPLETE_TEXT),
            Err(e) => {
                warn!(name: "upload.failed", error = %e, "Upload failed");
                UPLOAD_FAILED_TEXT.to_string()
            }
        };
        info!(name: "upload.status", status = %self.upload_status, "Upload status updated");
        &self.upload_status
    }
}

/// Text to notify the user with after a reset attempt.
pub fn reset_notice(outcome: Result<DetailReply>) -> String {
    match outcome {
        Ok(reply) => detail_or(reply, RESET_COMPLETE_TEXT),
        Err(e) => {
            warn!(name: "reset.failed", error = %e, "Memory reset failed");
            RESET_FAILED_TEXT.to_string()
        }
    }
}

fn detail_or(reply: DetailReply, fallback: &str) -> String {
    reply
        .detail
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn has_txt_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}
