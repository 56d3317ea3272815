//! lmchat terminal client
//!
//! Entry point: loads configuration, restores the session and runs the
//! interactive loop.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use lmchat::api::{ApiClient, ChatBackend};
use lmchat::app::ChatApp;
use lmchat::config::{AppConfig, Cli};
use lmchat::conversation::Conversation;
use lmchat::dispatch::Dispatcher;
use lmchat::session::{FileStorage, KeyValueStorage, MemoryStorage, SessionManager};
use lmchat::ui::{self, TerminalNotifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before clap reads env aliases
    let _ = dotenv();

    // Initialize tracing (M-LOG-STRUCTURED); stderr keeps logs out of the chat
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli).context("Failed to load configuration")?;

    info!(
        name: "config.loaded",
        base_url = %config.api.base_url,
        ephemeral = config.session.ephemeral,
        "Configuration loaded"
    );

    let storage: Box<dyn KeyValueStorage> = if config.session.ephemeral {
        Box::new(MemoryStorage::new())
    } else {
        let path = config.session.resolved_storage_path();
        info!(name: "session.storage", path = %path.display(), "Using session storage");
        Box::new(FileStorage::new(path))
    };
    let session = SessionManager::initialize(storage.as_ref());

    let client = match config.api.timeout() {
        Some(timeout) => ApiClient::with_timeout(&config.api.base_url, timeout),
        None => ApiClient::new(&config.api.base_url),
    }
    .with_context(|| format!("Invalid chat service URL: {}", config.api.base_url))?;
    let backend: Arc<dyn ChatBackend> = Arc::new(client);

    let conversation = Conversation::new(session.session_id().clone())
        .with_txt_enforcement(config.upload.enforce_txt);
    let mut app = ChatApp::new(conversation, Dispatcher::new(backend), TerminalNotifier);

    ui::run(&mut app, config.ui.shutdown_grace()).await?;
    Ok(())
}
