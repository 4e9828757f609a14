//! Configuration for the reveille service.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (OPENAI_API_KEY, REVEILLE_*)
//! 2. Config file (~/.reveille/config.yaml, or $REVEILLE_CONFIG)
//! 3. Defaults (~/.reveille/reveille.db, public realtime endpoint)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_REALTIME_URL: &str = "https://api.openai.com/v1/realtime/sessions";
const DEFAULT_MODEL: &str = "gpt-4o-realtime-preview-2024-12-17";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Path to the SQLite database
    pub database: Option<String>,

    #[serde(default)]
    pub realtime: RealtimeConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealtimeConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub connect_timeout_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
}

/// Resolved configuration with all defaults applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to the SQLite database
    pub database: PathBuf,

    /// Realtime session endpoint
    pub realtime_url: String,

    /// Bearer credential for the realtime provider
    pub api_key: String,

    /// Model identifier sent with every session request
    pub model: String,

    /// Connection timeout for provider calls
    pub connect_timeout: Duration,

    /// End-to-end timeout for provider calls
    pub request_timeout: Duration,
}

/// Home directory for reveille state (~/.reveille)
pub fn reveille_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("REVEILLE_HOME") {
        return Ok(PathBuf::from(home));
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".reveille"))
}

fn config_file_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("REVEILLE_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    Ok(reveille_home()?.join("config.yaml"))
}

fn load_config_file() -> Result<ConfigFile> {
    let path = config_file_path()?;
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

impl ResolvedConfig {
    /// Load configuration, layering env vars over the config file over
    /// defaults.
    pub fn load() -> Result<Self> {
        let file = load_config_file()?;
        Self::resolve(file)
    }

    fn resolve(file: ConfigFile) -> Result<Self> {
        let database = match std::env::var("REVEILLE_DB") {
            Ok(path) => PathBuf::from(path),
            Err(_) => match file.database {
                Some(path) => PathBuf::from(path),
                None => reveille_home()?.join("reveille.db"),
            },
        };

        let realtime_url = std::env::var("REVEILLE_REALTIME_URL")
            .ok()
            .or(file.realtime.url)
            .unwrap_or_else(|| DEFAULT_REALTIME_URL.to_string());

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .or(file.realtime.api_key)
            .unwrap_or_default();

        let model = std::env::var("REVEILLE_MODEL")
            .ok()
            .or(file.realtime.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let connect_timeout = Duration::from_secs(
            file.realtime
                .connect_timeout_seconds
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        );
        let request_timeout = Duration::from_secs(
            file.realtime
                .request_timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );

        Ok(Self {
            database,
            realtime_url,
            api_key,
            model,
            connect_timeout,
            request_timeout,
        })
    }
}
