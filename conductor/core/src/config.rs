//! Configuration
//!
//! Settings come from, in increasing precedence: built-in defaults, an
//! optional TOML file (`~/.config/inexai/config.toml`), environment
//! variables, and finally whatever the surface overrides (CLI flags).
//!
//! # Environment Variables
//!
//! - `INEXAI_API_URL`: answering service base URL (default `http://localhost:8000`)
//! - `INEXAI_TOP_K`: passages to retrieve per question (default 3)
//! - `INEXAI_MENTOR_MODE`: `generativo` or `reflexivo`
//! - `INEXAI_TYPING_INTERVAL_MS`: milliseconds between revealed characters
//! - `INEXAI_MAX_TICKS_PER_POLL`: reveal ticks processed per poll at most
//! - `INEXAI_CONFIG`: alternative config file path

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::MentorMode;
use crate::typing::DEFAULT_TICK_INTERVAL;

/// Default answering service URL
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Maximum question length in characters
pub const MAX_QUESTION_CHARS: usize = 2000;

/// Errors loading the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`ChatToml`]
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk config file layout; every field is optional
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatToml {
    /// Answering service base URL
    pub endpoint: Option<String>,
    /// Passages to retrieve per question
    pub top_k: Option<u32>,
    /// Initial mentor mode
    pub mentor_mode: Option<MentorMode>,
    /// Milliseconds between revealed characters
    pub typing_interval_ms: Option<u64>,
    /// Reveal ticks processed per poll at most
    pub max_ticks_per_poll: Option<u32>,
}

/// Resolved chat configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatConfig {
    /// Answering service base URL
    pub endpoint: String,
    /// Passages to retrieve per question
    pub top_k: u32,
    /// Initial mentor mode
    pub mentor_mode: MentorMode,
    /// Time between revealed characters
    pub typing_interval: Duration,
    /// Reveal ticks processed per poll at most
    pub max_ticks_per_poll: u32,
    /// Maximum question length in characters
    pub max_question_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            top_k: 3,
            mentor_mode: MentorMode::Generative,
            typing_interval: DEFAULT_TICK_INTERVAL,
            max_ticks_per_poll: 64,
            max_question_chars: MAX_QUESTION_CHARS,
        }
    }
}

impl ChatConfig {
    /// Defaults overridden by environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Defaults, then the config file (if present), then the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("INEXAI_CONFIG")
            .map(PathBuf::from)
            .or_else(default_config_path);

        let config = match path {
            Some(path) if path.exists() => Self::default().with_file(&load_config_file(&path)?),
            _ => Self::default(),
        };
        Ok(config.with_env())
    }

    /// Apply the fields present in a config file
    #[must_use]
    pub fn with_file(mut self, file: &ChatToml) -> Self {
        if let Some(ref endpoint) = file.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(top_k) = file.top_k {
            self.top_k = top_k;
        }
        if let Some(mode) = file.mentor_mode {
            self.mentor_mode = mode;
        }
        if let Some(ms) = file.typing_interval_ms {
            self.typing_interval = Duration::from_millis(ms);
        }
        if let Some(max) = file.max_ticks_per_poll {
            self.max_ticks_per_poll = max;
        }
        self
    }

    /// Apply environment variable overrides
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("INEXAI_API_URL") {
            self.endpoint = endpoint;
        }
        if let Some(top_k) = env_parse("INEXAI_TOP_K") {
            self.top_k = top_k;
        }
        if let Some(mode) = env_parse("INEXAI_MENTOR_MODE") {
            self.mentor_mode = mode;
        }
        if let Some(ms) = env_parse::<u64>("INEXAI_TYPING_INTERVAL_MS") {
            self.typing_interval = Duration::from_millis(ms);
        }
        if let Some(max) = env_parse("INEXAI_MAX_TICKS_PER_POLL") {
            self.max_ticks_per_poll = max;
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %value, "Ignoring unparsable environment override");
            None
        }
    }
}

/// `~/.config/inexai/config.toml` (platform config dir)
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("inexai").join("config.toml"))
}

/// Read and parse a config file
pub fn load_config_file(path: &Path) -> Result<ChatToml, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Loaded config file");
    Ok(parsed)
}
