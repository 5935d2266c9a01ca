//! Application configuration loaded from a YAML file plus the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::check_binary;
use crate::llm::LlmConfig;
use crate::rate_limit::MAX_DELAY_SECS;
use crate::summary::SummarizationConfig;

/// Config file used when `--config` isn't given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

const LOG_LEVELS: &[&str] = &[
    "trace", "debug", "info", "warn", "warning", "error", "critical",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("OPENROUTER_API_KEY is not set (add it to the environment or a .env file)")]
    MissingApiKey,

    #[error("Invalid configuration:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

/// The `logging` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Daily log files kept on disk.
    #[serde(default = "default_max_log_days")]
    pub max_log_days: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_max_log_days() -> usize {
    7
}

impl LoggingConfig {
    /// `level` as a tracing filter directive; `warning` and `critical`
    /// map to `warn` and `error`.
    pub fn filter_level(&self) -> String {
        match self.level.trim().to_lowercase().as_str() {
            "warning" => "warn".to_string(),
            "critical" => "error".to_string(),
            other => other.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: default_log_dir(),
            max_log_days: default_max_log_days(),
        }
    }
}

/// The `extraction` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Explicit tesseract binary; `PATH` lookup when unset.
    #[serde(default)]
    pub tesseract_cmd: Option<PathBuf>,
    #[serde(default = "default_ocr_lang")]
    pub ocr_lang: String,
    #[serde(default = "default_true")]
    pub recursive: bool,
}

fn default_ocr_lang() -> String {
    "rus+eng".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: None,
            ocr_lang: default_ocr_lang(),
            recursive: true,
        }
    }
}

/// Whole application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub openrouter: LlmConfig,
    #[serde(default)]
    pub summarization: SummarizationConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("source_data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            logging: LoggingConfig::default(),
            openrouter: LlmConfig::default(),
            summarization: SummarizationConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a YAML document without touching the environment.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Load `path`, apply environment overrides and validate.
    ///
    /// Supported env vars:
    /// - `OPENROUTER_API_KEY`: API key (required)
    /// - `OPENROUTER_ENDPOINT`: API base URL
    /// - `PATH_TESSERACT`: tesseract binary
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_yaml(&contents)?.with_env_overrides();
        if config.openrouter.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.openrouter = self.openrouter.with_env_overrides();
        if let Ok(val) = std::env::var("PATH_TESSERACT") {
            if !val.trim().is_empty() {
                self.extraction.tesseract_cmd = Some(PathBuf::from(val));
            }
        }
        self
    }

    /// Check ranges and paths, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        let mut check = |ok: bool, field: &str, message: String| {
            if !ok {
                problems.push(format!("[{}] {}", field, message));
            }
        };

        let level = self.logging.level.trim().to_lowercase();
        check(
            LOG_LEVELS.contains(&level.as_str()),
            "logging.level",
            format!(
                "unknown level '{}', expected one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ),
        );
        check(
            self.logging.max_log_days >= 1,
            "logging.max_log_days",
            "must be at least 1".to_string(),
        );

        let or = &self.openrouter;
        check(
            (1.0..=MAX_DELAY_SECS).contains(&or.request_delay),
            "openrouter.request_delay",
            format!(
                "must be within 1.0..={} seconds, got {}",
                MAX_DELAY_SECS, or.request_delay
            ),
        );
        check(
            or.max_retries >= 1,
            "openrouter.max_retries",
            "must be at least 1".to_string(),
        );
        check(
            (0.0..=MAX_DELAY_SECS).contains(&or.retry_min_delay),
            "openrouter.retry_min_delay",
            format!(
                "must be within 0.0..={} seconds, got {}",
                MAX_DELAY_SECS, or.retry_min_delay
            ),
        );
        check(
            (0.0..=MAX_DELAY_SECS).contains(&or.retry_max_delay)
                && or.retry_max_delay >= or.retry_min_delay,
            "openrouter.retry_max_delay",
            format!(
                "must be within retry_min_delay..={} seconds, got {}",
                MAX_DELAY_SECS, or.retry_max_delay
            ),
        );
        check(
            or.timeout >= 1,
            "openrouter.timeout",
            "must be at least 1 second".to_string(),
        );
        check(
            or.model_hierarchy.values().any(|chain| !chain.is_empty()),
            "openrouter.model_hierarchy",
            "at least one strategy needs a model".to_string(),
        );

        let sum = &self.summarization;
        check(
            (0.0..=1.0).contains(&sum.temperature),
            "summarization.temperature",
            format!("must be within 0.0..=1.0, got {}", sum.temperature),
        );
        check(
            (0.0..=1.0).contains(&sum.aggregation_temperature),
            "summarization.aggregation_temperature",
            format!(
                "must be within 0.0..=1.0, got {}",
                sum.aggregation_temperature
            ),
        );
        check(
            (0.0..=MAX_DELAY_SECS).contains(&sum.pause_between_files),
            "summarization.pause_between_files",
            format!(
                "must be within 0.0..={} seconds, got {}",
                MAX_DELAY_SECS, sum.pause_between_files
            ),
        );
        check(
            sum.min_files_for_aggregation >= 1,
            "summarization.min_files_for_aggregation",
            "must be at least 1".to_string(),
        );

        if let Some(cmd) = &self.extraction.tesseract_cmd {
            check(
                check_binary(cmd),
                "extraction.tesseract_cmd",
                format!("tesseract not found at {}", cmd.display()),
            );
        }
        check(
            !self.extraction.ocr_lang.trim().is_empty(),
            "extraction.ocr_lang",
            "must not be empty".to_string(),
        );

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}
