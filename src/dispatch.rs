//! Background request execution.
//!
//! Chat turns go through a single sequential send queue, so replies arrive in
//! the order the messages were sent. Uploads and resets run as independent
//! tasks. Every outcome comes back as a [`DispatchEvent`] on one channel and
//! is folded into state by whoever owns the [`Dispatcher`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{ChatBackend, ChatReply, ChatRequest, DetailReply};
use crate::error::{Error, Result};

/// Outcome of a background request.
#[derive(Debug)]
pub enum DispatchEvent {
    /// A chat turn finished.
    ChatReplied(Result<ChatReply>),
    /// A file upload finished.
    Uploaded(Result<DetailReply>),
    /// A memory reset finished.
    ResetDone(Result<DetailReply>),
}

/// Runs requests against a [`ChatBackend`] off the UI loop.
#[derive(Debug)]
pub struct Dispatcher {
    backend: Arc<dyn ChatBackend>,
    send_queue: mpsc::UnboundedSender<ChatRequest>,
    events_tx: mpsc::UnboundedSender<DispatchEvent>,
    events_rx: mpsc::UnboundedReceiver<DispatchEvent>,
    pending: usize,
}

impl Dispatcher {
    /// Create a dispatcher and start its send queue worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (send_queue, queue_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_send_queue(
            Arc::clone(&backend),
            queue_rx,
            events_tx.clone(),
        ));

        Self {
            backend,
            send_queue,
            events_tx,
            events_rx,
            pending: 0,
        }
    }

    /// Number of requests whose outcome has not been received yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Queue a chat turn behind any turns already in flight.
    pub fn submit_chat(&mut self, request: ChatRequest) {
        self.pending += 1;
        if let Err(mpsc::error::SendError(request)) = self.send_queue.send(request) {
            warn!(
                name: "dispatch.queue.closed",
                session_id = %request.session_id,
                "Send queue is gone; reporting failure"
            );
            let _ = self
                .events_tx
                .send(DispatchEvent::ChatReplied(Err(Error::QueueClosed)));
        }
    }

    /// Upload a file in the background.
    pub fn submit_upload(&mut self, path: PathBuf) {
        self.pending += 1;
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.upload(&path).await;
            let _ = events.send(DispatchEvent::Uploaded(outcome));
        });
    }

    /// Reset server memory in the background.
    pub fn submit_reset(&mut self) {
        self.pending += 1;
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.reset().await;
            let _ = events.send(DispatchEvent::ResetDone(outcome));
        });
    }

    /// Wait for the next outcome.
    ///
    /// Returns `None` immediately when nothing is pending.
    pub async fn next_event(&mut self) -> Option<DispatchEvent> {
        if self.pending == 0 {
            return None;
        }
        let event = self.events_rx.recv().await?;
        self.pending -= 1;
        Some(event)
    }

    /// Collect outstanding outcomes, giving up after `grace`.
    pub async fn drain(&mut self, grace: Duration) -> Vec<DispatchEvent> {
        let mut events = Vec::new();
        let deadline = tokio::time::Instant::now() + grace;

        while self.pending > 0 {
            match tokio::time::timeout_at(deadline, self.next_event()).await {
                Ok(Some(event)) => events.push(event),
                Ok(None) => break,
                Err(_) => {
                    info!(
                        name: "dispatch.drain.timeout",
                        abandoned = self.pending,
                        "Abandoning unfinished requests"
                    );
                    break;
                }
            }
        }

        events
    }
}

async fn run_send_queue(
    backend: Arc<dyn ChatBackend>,
    mut queue: mpsc::UnboundedReceiver<ChatRequest>,
    events: mpsc::UnboundedSender<DispatchEvent>,
) {
    while let Some(request) = queue.recv().await {
        debug!(name: "chat.request.sent", session_id = %request.session_id, "Chat turn dequeued");
        let outcome = backend.chat(&request).await;
        if events.send(DispatchEvent::ChatReplied(outcome)).is_err() {
            break;
        }
    }
    debug!(name: "dispatch.queue.stopped", "Send queue stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;

    /// Replies with the message text, sleeping longer for earlier messages.
    #[derive(Debug)]
    struct EchoBackend;

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
            let delay = match request.message.as_str() {
                "first" => 300,
                "second" => 10,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(ChatReply {
                response: Some(format!("echo {}", request.message)),
            })
        }

        async fn upload(&self, path: &Path) -> Result<DetailReply> {
            Ok(DetailReply {
                detail: Some(format!("uploaded {}", path.display())),
            })
        }

        async fn reset(&self) -> Result<DetailReply> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(DetailReply::default())
        }
    }

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            session_id: "sid".into(),
            message: message.into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_replies_arrive_in_send_order() {
        let mut dispatcher = Dispatcher::new(Arc::new(EchoBackend));
        dispatcher.submit_chat(request("first"));
        dispatcher.submit_chat(request("second"));
        assert_eq!(dispatcher.pending(), 2);

        let mut replies = Vec::new();
        while let Some(event) = dispatcher.next_event().await {
            match event {
                DispatchEvent::ChatReplied(Ok(reply)) => replies.push(reply.response.unwrap()),
                other => panic!("unexpected event: {other:?}"),
            }
        }

        assert_eq!(replies, vec!["echo first", "echo second"]);
        assert_eq!(dispatcher.pending(), 0);
    }

    #[tokio::test]
    async fn test_next_event_without_pending_returns_none() {
        let mut dispatcher = Dispatcher::new(Arc::new(EchoBackend));
        assert!(dispatcher.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_upload_event() {
        let mut dispatcher = Dispatcher::new(Arc::new(EchoBackend));
        dispatcher.submit_upload(PathBuf::from("notes.txt"));

        match dispatcher.next_event().await {
            Some(DispatchEvent::Uploaded(Ok(reply))) => {
                assert_eq!(reply.detail.as_deref(), Some("uploaded notes.txt"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_gives_up_after_grace() {
        let mut dispatcher = Dispatcher::new(Arc::new(EchoBackend));
        dispatcher.submit_chat(request("quick"));
        dispatcher.submit_reset();

        let events = dispatcher.drain(Duration::from_secs(1)).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DispatchEvent::ChatReplied(Ok(_))));
        assert_eq!(dispatcher.pending(), 1);
    }
}
