//! Configuration management for foodlabel using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmConfig;
use crate::pipeline::{
    DriverOptions, InputColumns, DEFAULT_BATCH_SIZE, DEFAULT_LIST_DELIMITER, DEFAULT_ROWS_PER_CHUNK,
};
use crate::rate_limit::RateLimitConfig;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Chunking, batching, and I/O settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Descriptions per API call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Input rows per output file
    #[serde(default = "default_rows_per_chunk")]
    pub rows_per_chunk: usize,
    /// Ceiling on API calls per minute
    #[serde(default = "default_calls_per_minute")]
    pub calls_per_minute: u32,
    /// Directory for chunk files (relative paths resolve from the config file location)
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Input column holding the row identifier
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Input column holding the description text
    #[serde(default = "default_description_column")]
    pub description_column: String,
    /// Separator for list-valued output fields
    #[serde(default = "default_list_delimiter")]
    pub list_delimiter: String,
    /// Skip chunks whose output file already exists
    #[serde(default)]
    pub skip_existing: bool,
    /// Extra `token,expansion` CSV merged into the builtin abbreviation table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviations: Option<String>,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_rows_per_chunk() -> usize {
    DEFAULT_ROWS_PER_CHUNK
}

fn default_calls_per_minute() -> u32 {
    6000
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_id_column() -> String {
    "fdc_id".to_string()
}

fn default_description_column() -> String {
    "description".to_string()
}

fn default_list_delimiter() -> String {
    DEFAULT_LIST_DELIMITER.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            rows_per_chunk: default_rows_per_chunk(),
            calls_per_minute: default_calls_per_minute(),
            output_dir: default_output_dir(),
            id_column: default_id_column(),
            description_column: default_description_column(),
            list_delimiter: default_list_delimiter(),
            skip_existing: false,
            abbreviations: None,
        }
    }
}

/// Top-level configuration for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, or discover one with prefer.
    /// Falls back to defaults (with env overrides) when no file exists.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path).await;
        }

        match prefer::load("foodlabel").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default()),
            },
            Err(_) => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML, and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        config.llm = config.llm.with_env_overrides();
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error(e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error(e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise the CWD.
    pub fn base_dir(&self) -> PathBuf {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }
    }

    /// Check value ranges. `require_api_key` is set for commands that call the API.
    pub fn validate(&self, require_api_key: bool) -> Result<(), ConfigError> {
        let p = &self.pipeline;
        if p.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if p.rows_per_chunk == 0 {
            return Err(ConfigError::Invalid(
                "rows_per_chunk must be at least 1".into(),
            ));
        }
        if p.calls_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "calls_per_minute must be at least 1".into(),
            ));
        }
        if p.id_column.trim().is_empty() || p.description_column.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "column names must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} is outside 0.0..=2.0",
                self.llm.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.llm.top_p) {
            return Err(ConfigError::Invalid(format!(
                "top_p {} is outside 0.0..=1.0",
                self.llm.top_p
            )));
        }
        if require_api_key && self.llm.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::Invalid(
                "no API key configured (set LLM_API_KEY or OPENAI_API_KEY)".into(),
            ));
        }
        Ok(())
    }

    pub fn input_columns(&self) -> InputColumns {
        InputColumns {
            id: self.pipeline.id_column.clone(),
            description: self.pipeline.description_column.clone(),
        }
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig::per_minute(self.pipeline.calls_per_minute)
    }

    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            rows_per_chunk: self.pipeline.rows_per_chunk,
            batch_size: self.pipeline.batch_size,
            output_dir: self.resolve_path(&self.pipeline.output_dir),
            list_delimiter: self.pipeline.list_delimiter.clone(),
            skip_existing: self.pipeline.skip_existing,
        }
    }

    /// Abbreviation table path, resolved, if configured.
    pub fn abbreviations_path(&self) -> Option<PathBuf> {
        self.pipeline
            .abbreviations
            .as_deref()
            .map(|p| self.resolve_path(p))
    }

    /// Render as TOML with the API key hidden.
    pub fn to_toml_redacted(&self) -> Result<String, ConfigError> {
        let mut config = self.clone();
        config.llm = config.llm.redacted();
        Ok(toml::to_string_pretty(&config)?)
    }
}
