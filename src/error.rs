use std::io;
use thiserror::Error;

/// Core error type for codeconcat.
///
/// Only fatal conditions become variants here: invalid configuration, a
/// missing scan root, and output write failures. Per-file problems
/// (unreadable files, binary files, parser hiccups) are recovered locally
/// in the collector and parsers and never surface as errors.
#[derive(Error, Debug)]
pub enum CodeConcatError {
    #[error("config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("target path '{path}' does not exist")]
    PathNotFound { path: String },

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output to '{path}'")]
    WriteFailure {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl CodeConcatError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn write_failure(path: impl Into<String>, source: io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this error is caused by user input (vs internal/system).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::Validation { .. } | Self::PathNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CodeConcatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = CodeConcatError::config("bad value");
        assert_eq!(err.to_string(), "config error: bad value");
    }

    #[test]
    fn path_not_found_display() {
        let err = CodeConcatError::path_not_found("/nope");
        assert_eq!(err.to_string(), "target path '/nope' does not exist");
    }

    #[test]
    fn validation_display_names_field() {
        let err = CodeConcatError::validation("max_workers", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid value for 'max_workers': must be at least 1"
        );
    }

    #[test]
    fn user_error_classification() {
        assert!(CodeConcatError::config("oops").is_user_error());
        assert!(CodeConcatError::path_not_found("/x").is_user_error());
        let io_err = CodeConcatError::io("read", io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(!io_err.is_user_error());
    }
}
