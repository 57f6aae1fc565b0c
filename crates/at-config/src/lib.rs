//! # at-config
//!
//! Layered settings: built-in defaults, then an optional `atelier.toml`,
//! then `ATELIER__SECTION__KEY` environment variables (a `.env` file is
//! loaded into the environment first).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub const ENV_PREFIX: &str = "ATELIER";
pub const DEFAULT_CONFIG_FILE: &str = "atelier.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing required setting `{0}`")]
    Missing(&'static str),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub local: LocalSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Cap on any single multipart field, uploads included.
    pub max_upload_bytes: usize,
}

/// The hosted table-and-storage backend.
#[derive(Debug, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "optional_secret")]
    pub anon_key: Option<SecretString>,
    pub table: String,
    pub bucket: String,
    pub timeout_secs: u64,
}

impl BackendSettings {
    /// Project URL and anonymous key; both must be present and non-blank.
    pub fn credentials(&self) -> Result<(&str, &SecretString), ConfigError> {
        let url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("backend.url"))?;
        let key = self.anon_key.as_ref().ok_or(ConfigError::Missing("backend.anon_key"))?;
        Ok((url, key))
    }
}

/// SQLite and filesystem adapters for running without the hosted backend.
#[derive(Debug, Deserialize)]
pub struct LocalSettings {
    pub database_url: String,
    pub storage_root: PathBuf,
    /// URL path the storage root is served under.
    pub public_prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Human,
    Json,
}

impl Settings {
    /// Loads `.env`, then `atelier.toml` from the working directory if
    /// present, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env"),
        }
        Self::load_from(Some(Path::new(DEFAULT_CONFIG_FILE)), None)
    }

    /// `file` is optional on disk. `env` replaces the process environment
    /// when given.
    pub fn load_from(file: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.max_upload_bytes", 50 * 1024 * 1024)?
            .set_default("backend.table", "portfolio_items")?
            .set_default("backend.bucket", "portfolio-images")?
            .set_default("backend.timeout_secs", 30)?
            .set_default("local.database_url", "sqlite:atelier.db")?
            .set_default("local.storage_root", "./data/uploads")?
            .set_default("local.public_prefix", "/uploads")?
            .set_default("log.format", "human")?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").source(env))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

fn optional_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|key| !key.trim().is_empty()).map(SecretString::from))
}
