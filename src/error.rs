//! Error types for Preflight operations.
//!
//! This module defines [`PreflightError`], the error type used for the
//! crate's ambient surface (configuration loading, CLI input), and a
//! [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Readiness failures are *not* errors of this type. They are
//!   [`ReadinessError`](crate::coordinator::ReadinessError) values carried
//!   inside a `NotReady` result and never abort a reconciliation pass.
//! - Use `PreflightError` for problems the caller must fix before a
//!   coordinator can even be built (bad config, bad arguments).
//! - Use `anyhow::Error` (via `PreflightError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Preflight operations.
#[derive(Debug, Error)]
pub enum PreflightError {
    /// Requirements file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse requirements file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Structurally valid YAML with inconsistent content.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A prerequisite given on the command line could not be understood.
    #[error("Invalid prerequisite '{input}': {message}")]
    InvalidPrerequisite { input: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Preflight operations.
pub type Result<T> = std::result::Result<T, PreflightError>;
