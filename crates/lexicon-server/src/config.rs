//! Server configuration
//!
//! Defaults, then environment, then command-line flags.

use std::path::PathBuf;

use lexicon_core::DEFAULT_REVIEW_BATCH;

/// File name of the database inside a data directory
pub const DB_FILE_NAME: &str = "lexicon.db";

/// Largest review batch a client can ask for
pub const MAX_REVIEW_BATCH: i32 = 200;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Database file; `None` uses the platform data directory
    pub db_path: Option<PathBuf>,
    /// Words handed out per `GET /api/words/review`
    pub review_batch_size: i32,
    /// Serve the embedded web UI
    pub static_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            db_path: None,
            review_batch_size: DEFAULT_REVIEW_BATCH,
            static_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `LEXICON_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |keys: &[&'static str]| {
            keys.iter().find_map(|k| {
                lookup(*k)
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (*k, v))
            })
        };

        if let Some((_, host)) = var(&["LEXICON_HOST"]) {
            config.host = host;
        }
        if let Some((key, port)) = var(&["LEXICON_PORT", "PORT"]) {
            config.port = parse_value(key, &port)?;
        }
        if let Some((_, path)) = var(&["LEXICON_DB_PATH", "DB_PATH"]) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some((key, batch)) = var(&["LEXICON_REVIEW_BATCH"]) {
            config.set_review_batch(key, &batch)?;
        }
        if let Some((key, flag)) = var(&["LEXICON_STATIC"]) {
            config.static_enabled = match flag.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue { key, value: flag });
                }
            };
        }

        Ok(config)
    }

    /// Put the database in `dir` under the standard file name
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.db_path = Some(dir.into().join(DB_FILE_NAME));
        self
    }

    /// Parse and range-check a review batch size
    pub fn set_review_batch(&mut self, key: &'static str, value: &str) -> Result<(), ConfigError> {
        let batch: i32 = parse_value(key, value)?;
        if !(1..=MAX_REVIEW_BATCH).contains(&batch) {
            return Err(ConfigError::InvalidValue {
                key,
                value: value.to_string(),
            });
        }
        self.review_batch_size = batch;
        Ok(())
    }

    /// Address the server is reachable at, for logs and the browser
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
