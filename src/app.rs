//! User actions wired to conversation state and background requests.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::conversation::{Conversation, Message, reset_notice};
use crate::dispatch::{DispatchEvent, Dispatcher};

/// Shows a message the user must see, like a browser `alert`.
pub trait Notifier: Send + std::fmt::Debug {
    fn notify(&mut self, message: &str);
}

/// A visible change produced by folding in a request outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppUpdate {
    /// An assistant message was appended to the transcript.
    Replied(Message),
    /// The upload status line changed.
    UploadStatus(String),
    /// The user was notified.
    Notified(String),
}

/// The chat front end without any rendering.
#[derive(Debug)]
pub struct ChatApp<N: Notifier> {
    conversation: Conversation,
    dispatcher: Dispatcher,
    notifier: N,
}

impl<N: Notifier> ChatApp<N> {
    pub fn new(conversation: Conversation, dispatcher: Dispatcher, notifier: N) -> Self {
        Self {
            conversation,
            dispatcher,
            notifier,
        }
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Requests still waiting for an outcome.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.dispatcher.pending()
    }

    /// Send `text` as the next chat turn.
    ///
    /// Returns the optimistic user message, or `None` for blank input.
    pub fn send(&mut self, text: impl Into<String>) -> Option<Message> {
        self.conversation.set_input(text);
        let request = self.conversation.begin_send()?;
        info!(
            name: "chat.message.queued",
            session_id = %request.session_id,
            chars = request.message.chars().count(),
            "Chat message queued"
        );
        self.dispatcher.submit_chat(request);
        self.conversation.transcript().last().cloned()
    }

    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        self.conversation.select_file(path);
    }

    /// Upload the selected file. Returns whether a request was issued.
    pub fn upload(&mut self) -> bool {
        match self.conversation.begin_upload() {
            Some(path) => {
                info!(name: "upload.started", file = %path.display(), "Upload started");
                self.dispatcher.submit_upload(path);
                true
            }
            None => false,
        }
    }

    /// Ask the service to forget everything.
    pub fn reset(&mut self) {
        info!(name: "reset.started", "Memory reset requested");
        self.dispatcher.submit_reset();
    }

    /// Fold one outcome into state.
    pub fn apply(&mut self, event: DispatchEvent) -> AppUpdate {
        match event {
            DispatchEvent::ChatReplied(outcome) => {
                AppUpdate::Replied(self.conversation.apply_chat_reply(outcome).clone())
            }
            DispatchEvent::Uploaded(outcome) => {
                AppUpdate::UploadStatus(self.conversation.apply_upload_reply(outcome).to_string())
            }
            DispatchEvent::ResetDone(outcome) => {
                let notice = reset_notice(outcome);
                self.notifier.notify(&notice);
                AppUpdate::Notified(notice)
            }
        }
    }

    /// Wait for the next outcome and fold it in. `None` when idle.
    pub async fn next_update(&mut self) -> Option<AppUpdate> {
        let event = self.dispatcher.next_event().await?;
        Some(self.apply(event))
    }

    /// Fold in whatever finishes within `grace`.
    pub async fn finish(&mut self, grace: Duration) -> Vec<AppUpdate> {
        let events = self.dispatcher.drain(grace).await;
        events.into_iter().map(|e| self.apply(e)).collect()
    }
}
