//! TOML-based configuration for bupstats.
//!
//! Supports a config file (bupstats.toml) with environment variable expansion
//! in the dataset path.
//!
//! Example configuration:
//! ```toml
//! [dataset]
//! path = "${BUP_DIR}/bupstats-partial.sqlite3"
//!
//! [report]
//! threshold = 100
//! format = "html"
//!
//! [server]
//! port = 8080
//! request_timeout_secs = 300
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::DEFAULT_FILE_NAME;
use crate::render::Format;
use crate::report::{ReportOptions, DEFAULT_THRESHOLD};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Where the statistics database lives.
    pub dataset: DatasetSettings,

    /// Report options.
    pub report: ReportSettings,

    /// HTTP server options (used by `bupstats serve`).
    pub server: ServerSettings,
}

/// Dataset location.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetSettings {
    /// Path to the database (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

/// Report configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Minimum child count for the ranking table.
    pub threshold: u64,

    /// Output format when none is given on the command line.
    pub format: Format,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            format: Format::Html,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Port to listen on (localhost only).
    pub port: u16,

    /// Upper bound on generating one report, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            request_timeout_secs: 300,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `BUPSTATS_CONFIG`
    /// 2. `./bupstats.toml`
    /// 3. `~/.config/bupstats/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("BUPSTATS_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("bupstats.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("bupstats").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.server.request_timeout_secs == 0 {
            return Err(SettingsError::InvalidConfig(
                "server.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the database path.
    ///
    /// Uses the configured path with environment variables expanded, or
    /// falls back to [`default_dataset_path`].
    pub fn dataset_path(&self) -> Result<PathBuf, SettingsError> {
        match &self.dataset.path {
            Some(path) => Ok(PathBuf::from(expand_env_vars(path)?)),
            None => default_dataset_path(env::var("BUP_DIR").ok().as_deref(), dirs::home_dir())
                .ok_or_else(|| {
                    SettingsError::InvalidConfig(
                        "no dataset path configured and no home directory".to_string(),
                    )
                }),
        }
    }

    /// Report options from the `[report]` table.
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions::default().with_threshold(self.report.threshold)
    }
}

/// Where bup keeps the statistics database when nothing is configured:
/// inside `$BUP_DIR`, else inside `~/.bup`.
pub fn default_dataset_path(bup_dir: Option<&str>, home: Option<PathBuf>) -> Option<PathBuf> {
    match bup_dir {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir).join(DEFAULT_FILE_NAME)),
        _ => home.map(|home| home.join(".bup").join(DEFAULT_FILE_NAME)),
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                // lone '$'
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
