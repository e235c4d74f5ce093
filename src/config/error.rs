//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::style::NumericParseError;

// ============================================================================
// ConfigError
// ============================================================================

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file `{0}` not found")]
    NotFound(PathBuf),

    #[error("config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("unknown fields in `{}`: {}", path.display(), fields.join(", "))]
    UnknownFields { path: PathBuf, fields: Vec<String> },

    #[error("missing required option(s): {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid font size")]
    NumericParse(#[from] NumericParseError),

    #[error("no input file given and no INPUT_*.xlsx found in `{0}`")]
    NoInput(PathBuf),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("enhancer.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("enhancer.toml"));

        let missing = ConfigError::Missing(vec!["selector", "font"]);
        assert_eq!(missing.to_string(), "missing required option(s): selector, font");
    }

    #[test]
    fn test_numeric_parse_keeps_source() {
        let err = ConfigError::from(NumericParseError::NoDigit("big".to_string()));
        let source = err.source().unwrap().to_string();
        assert!(source.contains("no digit"));
    }
}
