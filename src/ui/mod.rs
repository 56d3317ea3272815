//! Line-oriented terminal front end.
//!
//! Reads commands from stdin while requests run in the background, and prints
//! transcript entries, upload status and notices as they arrive.

mod command;

use std::io::{self, Write};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::app::{AppUpdate, ChatApp, Notifier};
use crate::conversation::{Message, Transcript};
use crate::error::Result;
use crate::session::SessionId;

pub use command::{Command, HELP};

/// Page heading.
pub const TITLE: &str = "Chat with LM Studio";

/// Writes the front end's output.
#[derive(Debug)]
pub struct Renderer<W: Write> {
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn banner(&mut self, session_id: &SessionId) -> io::Result<()> {
        writeln!(self.out, "{TITLE}")?;
        writeln!(self.out, "{}", "=".repeat(TITLE.len()))?;
        writeln!(self.out, "session {session_id}")?;
        writeln!(self.out, "Type /help for commands.")?;
        self.out.flush()
    }

    pub fn message(&mut self, message: &Message) -> io::Result<()> {
        writeln!(self.out, "{message}")?;
        self.out.flush()
    }

    pub fn transcript(&mut self, transcript: &Transcript) -> io::Result<()> {
        if transcript.is_empty() {
            writeln!(self.out, "(no messages yet)")?;
        }
        for message in transcript {
            writeln!(self.out, "{message}")?;
        }
        self.out.flush()
    }

    pub fn status(&mut self, status: &str) -> io::Result<()> {
        if status.is_empty() {
            writeln!(self.out, "[upload] (nothing uploaded yet)")?;
        } else {
            writeln!(self.out, "[upload] {status}")?;
        }
        self.out.flush()
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    pub fn update(&mut self, update: &AppUpdate) -> io::Result<()> {
        match update {
            AppUpdate::Replied(message) => self.message(message),
            AppUpdate::UploadStatus(status) => self.status(status),
            // Already shown by the notifier.
            AppUpdate::Notified(_) => Ok(()),
        }
    }
}

/// Frame a notice so it stands out from transcript lines.
#[must_use]
pub fn notice_box(message: &str) -> String {
    let rule = "*".repeat(message.chars().count().clamp(8, 72) + 4);
    format!("{rule}\n* {message}\n{rule}")
}

/// Prints framed notices on stdout.
///
/// The notice is flushed before `notify` returns, but it does not wait for
/// the user to acknowledge it: stdin belongs to the input loop, and the next
/// line typed is read as a command.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&mut self, message: &str) {
        let mut out = io::stdout().lock();
        // Nowhere left to report to if stdout is gone.
        let _ = writeln!(out, "{}", notice_box(message)).and_then(|()| out.flush());
    }
}

/// Run the interactive loop until `/quit` or end of input.
///
/// Outcomes still in flight at exit get `grace` to arrive.
pub async fn run<N: Notifier>(app: &mut ChatApp<N>, grace: Duration) -> Result<()> {
    let mut renderer = Renderer::new(io::stdout());
    renderer.banner(app.conversation().session_id())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!(name: "ui.input.closed", "End of input");
                    break;
                };
                if !handle_command(app, &mut renderer, Command::parse(&line))? {
                    break;
                }
            }
            Some(update) = app.next_update(), if app.pending() > 0 => {
                renderer.update(&update)?;
            }
        }
    }

    if app.pending() > 0 {
        renderer.line(&format!("waiting for {} request(s)...", app.pending()))?;
    }
    for update in app.finish(grace).await {
        renderer.update(&update)?;
    }
    Ok(())
}

/// Apply one command. Returns `false` when the loop should stop.
fn handle_command<N: Notifier, W: Write>(
    app: &mut ChatApp<N>,
    renderer: &mut Renderer<W>,
    command: Command,
) -> Result<bool> {
    match command {
        Command::Send(text) => {
            app.send(text);
        }
        Command::Select(path) => {
            renderer.line(&format!("selected {}", path.display()))?;
            app.select_file(path);
        }
        Command::Upload(path) => {
            if let Some(path) = path {
                app.select_file(path);
            }
            if !app.upload() {
                let status = app.conversation().upload_status();
                if app.conversation().selected_file().is_none() {
                    renderer.line("no file selected")?;
                } else {
                    renderer.status(status)?;
                }
            }
        }
        Command::Reset => app.reset(),
        Command::History => renderer.transcript(app.conversation().transcript())?,
        Command::Status => renderer.status(app.conversation().upload_status())?,
        Command::Session => renderer.line(app.conversation().session_id().as_str())?,
        Command::Help => renderer.line(HELP)?,
        Command::Quit => return Ok(false),
        Command::Unknown(name) => {
            renderer.line(&format!("unknown command /{name}, try /help"))?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatBackend, ChatReply, ChatRequest, DetailReply};
    use crate::conversation::{Conversation, TXT_ONLY_TEXT};
    use crate::dispatch::Dispatcher;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    #[derive(Debug)]
    struct IdleBackend;

    #[async_trait]
    impl ChatBackend for IdleBackend {
        async fn chat(&self, _request: &ChatRequest) -> Result<ChatReply> {
            Ok(ChatReply::default())
        }

        async fn upload(&self, _path: &Path) -> Result<DetailReply> {
            Ok(DetailReply::default())
        }

        async fn reset(&self) -> Result<DetailReply> {
            Ok(DetailReply::default())
        }
    }

    #[derive(Debug, Default)]
    struct SilentNotifier;

    impl Notifier for SilentNotifier {
        fn notify(&mut self, _message: &str) {}
    }

    fn app(enforce_txt: bool) -> ChatApp<SilentNotifier> {
        let conversation = Conversation::new(SessionId::from("sid".to_string()))
            .with_txt_enforcement(enforce_txt);
        ChatApp::new(
            conversation,
            Dispatcher::new(Arc::new(IdleBackend)),
            SilentNotifier,
        )
    }

    fn drive(app: &mut ChatApp<SilentNotifier>, line: &str) -> (bool, String) {
        let mut renderer = Renderer::new(Vec::new());
        let keep_going = handle_command(app, &mut renderer, Command::parse(line)).unwrap();
        (keep_going, String::from_utf8(renderer.into_inner()).unwrap())
    }

    fn rendered(f: impl FnOnce(&mut Renderer<Vec<u8>>) -> io::Result<()>) -> String {
        let mut renderer = Renderer::new(Vec::new());
        f(&mut renderer).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_transcript_lines() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("Hello"));
        transcript.push(Message::assistant("Hi!"));

        let out = rendered(|r| r.transcript(&transcript));
        assert_eq!(out, "user: Hello\nassistant: Hi!\n");
    }

    #[test]
    fn test_empty_transcript() {
        let out = rendered(|r| r.transcript(&Transcript::new()));
        assert_eq!(out, "(no messages yet)\n");
    }

    #[test]
    fn test_banner_shows_title_and_session() {
        let sid = SessionId::from("abc-123".to_string());
        let out = rendered(|r| r.banner(&sid));
        assert!(out.starts_with(TITLE));
        assert!(out.contains("session abc-123"));
    }

    #[test]
    fn test_notice_box_frames_message() {
        assert_eq!(notice_box("cleared"), "************\n* cleared\n************");
    }

    #[tokio::test]
    async fn test_upload_without_selection_reports_and_issues_nothing() {
        let mut app = app(false);

        let (keep_going, out) = drive(&mut app, "/upload");
        assert!(keep_going);
        assert_eq!(out, "no file selected\n");
        assert_eq!(app.pending(), 0);
        assert_eq!(app.conversation().upload_status(), "");
    }

    #[tokio::test]
    async fn test_upload_with_path_selects_then_uploads() {
        let mut app = app(false);

        let (_, out) = drive(&mut app, "/upload notes/today.txt");
        assert!(out.is_empty());
        assert_eq!(
            app.conversation().selected_file(),
            Some(PathBuf::from("notes/today.txt").as_path())
        );
        assert_eq!(app.pending(), 1);

        // Plain /upload resends the remembered selection.
        drive(&mut app, "/upload");
        assert_eq!(app.pending(), 2);
    }

    #[tokio::test]
    async fn test_rejected_upload_prints_status() {
        let mut app = app(true);

        let (_, out) = drive(&mut app, "/upload report.pdf");
        assert_eq!(out, format!("[upload] {TXT_ONLY_TEXT}\n"));
        assert_eq!(app.pending(), 0);
    }

    #[tokio::test]
    async fn test_quit_stops_loop_and_blank_send_is_ignored() {
        let mut app = app(false);

        let (keep_going, _) = drive(&mut app, "   ");
        assert!(keep_going);
        assert_eq!(app.pending(), 0);

        let (keep_going, _) = drive(&mut app, "/quit");
        assert!(!keep_going);
    }

    #[test]
    fn test_notified_update_prints_nothing() {
        let out = rendered(|r| r.update(&AppUpdate::Notified("cleared".into())));
        assert!(out.is_empty());

        let out = rendered(|r| r.update(&AppUpdate::UploadStatus("Upload complete".into())));
        assert_eq!(out, "[upload] Upload complete\n");
    }
}
