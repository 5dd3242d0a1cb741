//! Command-line and file configuration
//!
//! Values come from the command line (or `LIVECHAT_*` environment
//! variables), then from a TOML file, then from built-in defaults.

use std::path::{Path, PathBuf};

use clap::Parser;
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Terminal client for a live chat room
#[derive(Debug, Default, Parser)]
#[command(name = "livechat", version)]
pub struct Cli {
    /// Address of the chat relay
    #[arg(long, env = "LIVECHAT_SERVER")]
    pub server: Option<String>,

    /// Display name shown on your messages
    #[arg(long, env = "LIVECHAT_USERNAME")]
    pub username: Option<String>,

    /// Room to chat in
    #[arg(long, env = "LIVECHAT_ROOM")]
    pub room: Option<String>,

    /// Config file (defaults to config.toml in the platform config directory)
    #[arg(long, env = "LIVECHAT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Contents of the config file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<String>,
    pub username: Option<String>,
    pub room: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: String,
    pub username: String,
    pub room: String,
}

impl Config {
    pub fn resolve(cli: Cli) -> Result<Self, ConfigError> {
        let file = match cli.config.clone().or_else(default_config_path) {
            // An explicitly named file must exist; the default one is optional
            Some(path) if cli.config.is_some() || path.exists() => {
                debug!(path = %path.display(), "Loading config file");
                FileConfig::load(&path)?
            }
            _ => FileConfig::default(),
        };

        Self::merge(cli, file)
    }

    fn merge(cli: Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let server = cli
            .server
            .or(file.server)
            .unwrap_or_else(|| format!("127.0.0.1:{}", livechat_net::DEFAULT_PORT));
        let username = cli
            .username
            .or(file.username)
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::Missing("username"))?;
        let room = cli
            .room
            .or(file.room)
            .filter(|r| !r.is_empty())
            .ok_or(ConfigError::Missing("room"))?;

        Ok(Self {
            server,
            username,
            room,
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "onyx", "livechat").map(|dirs| dirs.config_dir().join("config.toml"))
}
