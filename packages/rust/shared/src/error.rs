//! Error types for kwdoc.
//!
//! Library crates use [`KwdocError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics and derives the
//! process exit code from [`KwdocError::exit_code`].

use std::path::PathBuf;

/// Exit code for an unsupported runtime or environment.
pub const EXIT_ENVIRONMENT: u8 = 1;

/// Exit code for invalid arguments or an unsafe output path.
pub const EXIT_USAGE: u8 = 2;

/// Top-level error type for all kwdoc operations.
#[derive(Debug, thiserror::Error)]
pub enum KwdocError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The input directory is missing or not a directory.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The output directory would delete something it must not.
    #[error("refusing to use {path:?} as output directory: it is the filesystem root")]
    UnsafeTarget { path: PathBuf },

    /// The documentation compiler cannot run in this environment.
    #[error("unsupported environment: {0}")]
    Environment(String),

    /// A single invocation of the documentation compiler failed.
    #[error("compiler error: {0}")]
    Compiler(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Index rendering or serialization error.
    #[error("render error: {0}")]
    Render(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KwdocError>;

impl KwdocError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an invalid-input error from any displayable message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Create an environment error from any displayable message.
    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }

    /// Create a compiler error from any displayable message.
    pub fn compiler(msg: impl Into<String>) -> Self {
        Self::Compiler(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error when it aborts a run.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidInput { .. } | Self::UnsafeTarget { .. } => EXIT_USAGE,
            _ => EXIT_ENVIRONMENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = KwdocError::config("bad interpreter");
        assert_eq!(err.to_string(), "config error: bad interpreter");

        let err = KwdocError::UnsafeTarget { path: "/".into() };
        assert!(err.to_string().contains("filesystem root"));
    }

    #[test]
    fn exit_codes_follow_taxonomy() {
        assert_eq!(KwdocError::invalid_input("missing").exit_code(), 2);
        assert_eq!(KwdocError::UnsafeTarget { path: "/".into() }.exit_code(), 2);
        assert_eq!(KwdocError::environment("no python").exit_code(), 1);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(KwdocError::io("/tmp/out", io).exit_code(), 1);
    }
}
