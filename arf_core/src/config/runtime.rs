// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Errors raised while loading a runtime configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerPreferences {
    /// Move the source data stream into the output instead of copying it
    pub adopt_datastream: bool,

    /// Abort composition when the result root is neither TestResult nor Benchmark
    pub strict_result_root: bool,

    /// Indent element-only content when writing the composed document
    pub indent_output: bool,

    /// Embed referenced sub-result documents (OVAL results) as reports
    pub embed_sub_reports: bool,
}

impl Default for ComposerPreferences {
    fn default() -> Self {
        Self {
            adopt_datastream: env_flag(env_vars::COMPOSER_ADOPT_DATASTREAM, false),
            strict_result_root: env_flag(env_vars::COMPOSER_STRICT_RESULT_ROOT, false),
            indent_output: env_flag(env_vars::COMPOSER_INDENT_OUTPUT, true),
            embed_sub_reports: env_flag(env_vars::COMPOSER_EMBED_SUB_REPORTS, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of plain text
    pub use_structured_logging: bool,

    /// Write log events to the console
    pub enable_console_logging: bool,

    /// Minimum level that is emitted
    pub min_log_level: LogLevel,

    /// Print a cargo-style summary of collected diagnostics
    pub enable_cargo_style_output: bool,

    /// Attach the current document path to each event
    pub include_document_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
            enable_cargo_style_output: env_flag(env_vars::LOGGING_CARGO_STYLE, true),
            include_document_context: env_flag(env_vars::LOGGING_INCLUDE_DOCUMENT_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel for compatibility
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub composer: ComposerPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a configuration from TOML text; missing tables fall back to defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Composer
    pub const COMPOSER_ADOPT_DATASTREAM: &str = "ARF_COMPOSER_ADOPT_DATASTREAM";
    pub const COMPOSER_STRICT_RESULT_ROOT: &str = "ARF_COMPOSER_STRICT_RESULT_ROOT";
    pub const COMPOSER_INDENT_OUTPUT: &str = "ARF_COMPOSER_INDENT_OUTPUT";
    pub const COMPOSER_EMBED_SUB_REPORTS: &str = "ARF_COMPOSER_EMBED_SUB_REPORTS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "ARF_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "ARF_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "ARF_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "ARF_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_DOCUMENT_CONTEXT: &str = "ARF_LOGGING_INCLUDE_DOCUMENT_CONTEXT";
}
