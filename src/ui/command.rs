//! Parsing of terminal input lines.

use std::path::PathBuf;

/// What a line of terminal input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text: send it as a chat message.
    Send(String),
    /// `/select <path>`
    Select(PathBuf),
    /// `/upload [path]`
    Upload(Option<PathBuf>),
    /// `/reset`
    Reset,
    /// `/history`
    History,
    /// `/status`
    Status,
    /// `/session`
    Session,
    /// `/help`
    Help,
    /// `/quit` or `/exit`
    Quit,
    /// A slash command we do not know.
    Unknown(String),
}

impl Command {
    /// Parse one input line. Anything not starting with `/` is chat text,
    /// passed through untouched.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(body) = trimmed.strip_prefix('/') else {
            return Self::Send(line.to_string());
        };

        let (name, arg) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };
        let path = (!arg.is_empty()).then(|| PathBuf::from(arg));

        match name.to_ascii_lowercase().as_str() {
            "select" => path.map_or_else(|| Self::Unknown("select".into()), Self::Select),
            "upload" => Self::Upload(path),
            "reset" => Self::Reset,
            "history" => Self::History,
            "status" => Self::Status,
            "session" => Self::Session,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

pub const HELP: &str = "\
Type a message and press Enter to send it.

  /upload <path>   upload a file (plain /upload resends the selected file)
  /select <path>   choose a file without uploading it
  /status          show the last upload status
  /reset           clear the assistant's memory
  /history         show the whole conversation
  /session         show the session identifier
  /help            show this help
  /quit            leave";
