//! Plotline Configuration Management
//!
//! Handles configuration from environment variables and TOML files,
//! with defaults that match the built-in extraction heuristics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::DEFAULT_CONTEXT_LIMIT;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Extraction heuristics configuration
    pub extractor: ExtractorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(limit) = std::env::var("PLOTLINE_CONTEXT_LIMIT") {
            config.extractor.context_limit =
                limit.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "PLOTLINE_CONTEXT_LIMIT".to_string(),
                    value: limit,
                })?;
        }
        if let Ok(flag) = std::env::var("PLOTLINE_DEDUPE_DIALOGUE") {
            config.extractor.dedupe_dialogue = parse_bool("PLOTLINE_DEDUPE_DIALOGUE", &flag)?;
        }
        if let Ok(words) = std::env::var("PLOTLINE_SKIP_WORDS") {
            config.extractor.extra_skip_words = split_list(&words);
        }
        if let Ok(words) = std::env::var("PLOTLINE_LOCATION_KEYWORDS") {
            config.extractor.extra_location_keywords = split_list(&words);
        }

        // Logging
        if let Ok(level) = std::env::var("PLOTLINE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(flag) = std::env::var("PLOTLINE_LOG_JSON") {
            config.logging.json_format = parse_bool("PLOTLINE_LOG_JSON", &flag)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.extractor.context_limit != defaults.extractor.context_limit {
            self.extractor.context_limit = env_config.extractor.context_limit;
        }
        if env_config.extractor.dedupe_dialogue != defaults.extractor.dedupe_dialogue {
            self.extractor.dedupe_dialogue = env_config.extractor.dedupe_dialogue;
        }

        // Word lists from the environment extend the file's lists
        self.extractor
            .extra_skip_words
            .extend(env_config.extractor.extra_skip_words);
        self.extractor
            .extra_location_keywords
            .extend(env_config.extractor.extra_location_keywords);

        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }

        Ok(self)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Extraction heuristics configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum context snippets kept per character or relationship
    pub context_limit: usize,

    /// Collapse dialogue entries found by more than one pattern family
    pub dedupe_dialogue: bool,

    /// Per-story words that must never be treated as names
    pub extra_skip_words: Vec<String>,

    /// Per-story words that mark a capitalized phrase as a place
    pub extra_location_keywords: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            context_limit: DEFAULT_CONTEXT_LIMIT,
            dedupe_dialogue: false,
            extra_skip_words: Vec::new(),
            extra_location_keywords: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.extractor.context_limit, 5);
        assert!(!config.extractor.dedupe_dialogue);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[extractor]\ndedupe_dialogue = true\nextra_location_keywords = [\"Spire\"]"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(config.extractor.dedupe_dialogue);
        assert_eq!(config.extractor.extra_location_keywords, vec!["Spire"]);
        // Unspecified fields keep their defaults
        assert_eq!(config.extractor.context_limit, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file_missing() {
        let err = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }

    #[test]
    fn test_from_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[extractor\ncontext_limit = ").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" Ser, ,Dame "), vec!["Ser", "Dame"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("K", "Yes").unwrap());
        assert!(!parse_bool("K", "0").unwrap());
        assert!(parse_bool("K", "maybe").is_err());
    }
}
