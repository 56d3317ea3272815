use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

/// Default location of the chat service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the chat service
    #[arg(long, env = "LMCHAT_BASE_URL")]
    pub base_url: Option<String>,

    /// Path of the JSON file holding the session identifier
    #[arg(long, env = "LMCHAT_STORAGE")]
    pub storage: Option<PathBuf>,

    /// Reject non-.txt uploads before contacting the service
    #[arg(long, env = "LMCHAT_ENFORCE_TXT")]
    pub enforce_txt: Option<bool>,

    /// Keep the session identifier in memory only
    #[arg(long)]
    pub ephemeral: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub upload: UploadConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout. Unset means requests run to completion.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub storage_path: Option<PathBuf>,
    pub ephemeral: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub enforce_txt: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub shutdown_grace_ms: u64,
}

impl ApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl SessionConfig {
    /// Storage file location, falling back to the platform data directory.
    #[must_use]
    pub fn resolved_storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(|| {
            dirs::data_dir().map_or_else(
                || PathBuf::from(".lmchat").join("storage.json"),
                |dir| dir.join("lmchat").join("storage.json"),
            )
        })
    }
}

impl UiConfig {
    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl AppConfig {
    pub fn load_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Build the layered configuration.
    ///
    /// Priority: CLI flag > CLI env var > `LMCHAT_` env vars > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("session.ephemeral", false)?
            .set_default("upload.enforce_txt", false)?
            .set_default("ui.shutdown_grace_ms", 2000)?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("lmchat").required(false)),
        };

        // E.g. LMCHAT_API__BASE_URL=http://10.0.0.2:8000
        builder = builder.add_source(
            Environment::with_prefix("LMCHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = &cli.base_url {
            builder = builder.set_override("api.base_url", url.as_str())?;
        }
        if let Some(path) = &cli.storage {
            builder = builder.set_override("session.storage_path", path.to_string_lossy().into_owned())?;
        }
        if let Some(enforce) = cli.enforce_txt {
            builder = builder.set_override("upload.enforce_txt", enforce)?;
        }
        if cli.ephemeral {
            builder = builder.set_override("session.ephemeral", true)?;
        }

        let cfg = builder.build()?;
        Ok(cfg.try_deserialize()?)
    }
}
