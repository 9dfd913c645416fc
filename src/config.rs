//! Configuration module for Kairan.

use serde::Deserialize;
use std::path::Path;

use crate::{KairanError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Full connection URL. Takes precedence over `path` when set.
    #[serde(default)]
    pub url: Option<String>,
}

fn default_db_path() -> String {
    "data/kairan.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            url: None,
        }
    }
}

impl DatabaseConfig {
    /// Connection string handed to the sqlx pool.
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!("sqlite://{}?mode=rwc", self.path),
        }
    }
}

/// Attachment storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Path to the attachment storage directory.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Accepted file extensions (compared case-insensitively).
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_storage_path() -> String {
    "data/uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

fn default_allowed_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "pdf"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl FilesConfig {
    /// Upload size limit in bytes.
    ///
    /// Fails if the configured megabytes do not fit in a `u64` byte count.
    pub fn max_upload_size_bytes(&self) -> Result<u64> {
        self.max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| {
                KairanError::Config(format!(
                    "files.max_upload_size_mb is too large: {}",
                    self.max_upload_size_mb
                ))
            })
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

/// Board behaviour configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// Category shown when the caller does not ask for one.
    #[serde(default = "default_category")]
    pub default_category: String,
}

fn default_category() -> String {
    crate::board::DEFAULT_CATEGORY.to_string()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
        }
    }
}

/// Seed accounts created on first boot.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_user_username")]
    pub user_username: String,
    #[serde(default = "default_user_password")]
    pub user_password: String,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "pass123".to_string()
}

fn default_user_username() -> String {
    "user1".to_string()
}

fn default_user_password() -> String {
    "userpass".to_string()
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            user_username: default_user_username(),
            user_password: default_user_password(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/kairan.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Attachment storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Board configuration.
    #[serde(default)]
    pub board: BoardConfig,
    /// Seed accounts.
    #[serde(default)]
    pub seed: SeedConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| KairanError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| KairanError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `DATABASE_URL`: Override the database connection URL
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.set_database_url(&url);
        }
    }

    fn set_database_url(&mut self, url: &str) {
        if url.is_empty() {
            return;
        }
        // Hosting providers still hand out the legacy scheme.
        let url = match url.strip_prefix("postgres://") {
            Some(rest) => format!("postgresql://{rest}"),
            None => url.to_string(),
        };
        self.database.url = Some(url);
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.board.default_category.trim().is_empty() {
            return Err(KairanError::Config(
                "board.default_category must not be empty".to_string(),
            ));
        }
        self.files.max_upload_size_bytes()?;
        if self.files.allowed_extensions.is_empty() {
            return Err(KairanError::Config(
                "files.allowed_extensions must list at least one extension".to_string(),
            ));
        }
        if self.seed.admin_username == self.seed.user_username {
            return Err(KairanError::Config(
                "seed accounts must use distinct usernames".to_string(),
            ));
        }
        Ok(())
    }
}
