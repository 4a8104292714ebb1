// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Read an environment variable and parse it, falling back to `default`
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Whether to require the .fc extension
    pub require_fc_extension: bool,

    /// Whether to log per-file timing information
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_fc_extension: env_or(env_vars::REQUIRE_FC_EXTENSION, true),
            enable_performance_logging: env_or(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolPreferences {
    /// Whether redeclarations in one scope are logged as warnings
    pub warn_on_redeclaration: bool,
}

impl Default for SymbolPreferences {
    fn default() -> Self {
        Self {
            warn_on_redeclaration: env_or(env_vars::SYMBOLS_WARN_ON_REDECLARATION, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputPreferences {
    /// Directory receiving token dumps, DOT graphs and symbol tables
    pub output_dir: String,

    /// Parse tree node attribute used as the DOT label
    pub tree_label: String,

    /// Whether leaves are drawn filled with a double outline
    pub highlight_leaves: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            output_dir: env::var(env_vars::OUTPUT_DIR).unwrap_or_else(|_| "output".to_string()),
            tree_label: env::var(env_vars::OUTPUT_TREE_LABEL)
                .unwrap_or_else(|_| "symbol".to_string()),
            highlight_leaves: env_or(env_vars::OUTPUT_HIGHLIGHT_LEAVES, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the configured logger
    pub min_log_level: LogLevel,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            enable_cargo_style_output: env_or(env_vars::LOGGING_CARGO_STYLE, true),
            include_file_context: env_or(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
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

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub symbols: SymbolPreferences,
    pub output: OutputPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_FC_EXTENSION: &str = "FUSION_REQUIRE_FC_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "FUSION_ENABLE_PERFORMANCE_LOGGING";

    // Symbols
    pub const SYMBOLS_WARN_ON_REDECLARATION: &str = "FUSION_SYMBOLS_WARN_ON_REDECLARATION";

    // Output
    pub const OUTPUT_DIR: &str = "FUSION_OUTPUT_DIR";
    pub const OUTPUT_TREE_LABEL: &str = "FUSION_OUTPUT_TREE_LABEL";
    pub const OUTPUT_HIGHLIGHT_LEAVES: &str = "FUSION_OUTPUT_HIGHLIGHT_LEAVES";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "FUSION_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "FUSION_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "FUSION_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "FUSION_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "FUSION_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_env_or_falls_back_on_unparseable_values() {
        assert_eq!(env_or("FUSION_TEST_UNSET_VARIABLE_FOR_ENV_OR", 42usize), 42);
    }

    #[test]
    fn test_env_var_names_share_prefix() {
        for name in [
            env_vars::REQUIRE_FC_EXTENSION,
            env_vars::OUTPUT_DIR,
            env_vars::LOGGING_MIN_LEVEL,
        ] {
            assert!(name.starts_with("FUSION_"));
        }
    }
}
