//! Error types for issue-status-metrics.
//!
//! The accounting core never fails: extraction degrades to an empty event
//! sequence and the accumulator and aggregator report absence instead of
//! raising. Errors here come from the surrounding layers (reading item files,
//! loading configuration, parsing command-line values).

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for issue-status-metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// An item record could not be parsed.
    #[error("Failed to parse item record at line {line}: {message}")]
    ParseError {
        /// Line number where parsing failed (0 when not line-based).
        line: usize,
        /// Human-readable error message.
        message: String,
        /// Underlying serde_json error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Permission denied when accessing a file or directory.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path where access was denied.
        path: PathBuf,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Human-readable error message.
        message: String,
    },

    /// Invalid configuration file contents.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid argument.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Name of the invalid argument.
        name: String,
        /// Reason why the argument is invalid.
        reason: String,
    },

    /// Item data violates an accounting precondition.
    #[error("Data integrity error: {message}")]
    DataIntegrityError {
        /// Human-readable error message.
        message: String,
    },

    /// Unsupported operation or feature.
    #[error("Unsupported: {feature}")]
    Unsupported {
        /// Name of the unsupported feature.
        feature: String,
    },
}

impl MetricsError {
    /// Create a new parse error.
    #[must_use]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new parse error with source.
    #[must_use]
    pub fn parse_with_source(line: usize, message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Create a new invalid argument error.
    #[must_use]
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new data integrity error.
    #[must_use]
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrityError {
            message: message.into(),
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ParseError { .. } => exit_codes::EXIT_PARSE_ERROR,
            Self::FileNotFound { .. } => exit_codes::EXIT_FILE_NOT_FOUND,
            Self::PermissionDenied { .. } => exit_codes::EXIT_PERMISSION_DENIED,
            Self::ConfigError { .. } | Self::InvalidConfig { .. } => exit_codes::EXIT_CONFIG_ERROR,
            Self::InvalidArgument { .. } => exit_codes::EXIT_USAGE_ERROR,
            Self::DataIntegrityError { .. } => exit_codes::EXIT_DATA_ERROR,
            Self::IoError { .. } => exit_codes::EXIT_IO_ERROR,
            _ => exit_codes::EXIT_GENERAL_ERROR,
        }
    }

    /// Check if this error is recoverable.
    ///
    /// Recoverable errors affect a single record; the remaining input can
    /// still be processed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ParseError { .. } | Self::DataIntegrityError { .. }
        )
    }
}

/// Result type alias for issue-status-metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

impl From<std::io::Error> for MetricsError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for MetricsError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// Item record parsing failed.
    pub const EXIT_PARSE_ERROR: i32 = 2;
    /// Specified file not found.
    pub const EXIT_FILE_NOT_FOUND: i32 = 3;
    /// Insufficient permissions.
    pub const EXIT_PERMISSION_DENIED: i32 = 4;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// Invalid command-line usage (BSD standard).
    pub const EXIT_USAGE_ERROR: i32 = 64;
    /// Input data format error (BSD standard).
    pub const EXIT_DATA_ERROR: i32 = 65;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let parse_err = MetricsError::parse(1, "test");
        assert_eq!(parse_err.exit_code(), 2);

        let not_found = MetricsError::FileNotFound {
            path: PathBuf::from("/test"),
        };
        assert_eq!(not_found.exit_code(), 3);

        let bad_arg = MetricsError::invalid_argument("now", "not a timestamp");
        assert_eq!(bad_arg.exit_code(), exit_codes::EXIT_USAGE_ERROR);

        let config = MetricsError::ConfigError {
            message: "no statuses".to_string(),
        };
        assert_eq!(config.exit_code(), exit_codes::EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(MetricsError::parse(1, "test").is_recoverable());
        assert!(MetricsError::integrity("closed without closed_at").is_recoverable());

        let not_found = MetricsError::FileNotFound {
            path: PathBuf::from("/test"),
        };
        assert!(!not_found.is_recoverable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = MetricsError::invalid_argument("--now", "expected RFC 3339");
        assert_eq!(err.to_string(), "Invalid argument '--now': expected RFC 3339");
    }
}
