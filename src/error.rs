//! Error handling for the launcher
//!
//! Provides centralized error handling with proper error types using thiserror.
//! The launcher distinguishes fatal failures (environment creation, dependency
//! installation, dashboard launch) from recovered ones: the market-data probe
//! never produces an error at all, only a degraded-mode report.

use thiserror::Error;

/// Main error type for the launcher
#[derive(Error, Debug)]
pub enum LaunchError {
    /// IO errors (file operations, spawning, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Virtual environment errors (creation, missing interpreter)
    #[error("Environment error: {0}")]
    Environment(String),

    /// Dependency manifest errors (malformed entries, unreadable file)
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Dependency installation failures
    #[error("Dependency installation failed: {reason}")]
    Install { reason: String, code: i32 },

    /// Dashboard server launch failures
    #[error("Dashboard launch failed: {reason}")]
    Launch { reason: String, code: i32 },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for launcher operations
pub type Result<T> = std::result::Result<T, LaunchError>;

impl LaunchError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a virtual environment error
    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }

    /// Create a manifest error
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::Manifest(msg.into())
    }

    /// Create an install error carrying the installer's exit code
    pub fn install(reason: impl Into<String>, code: i32) -> Self {
        Self::Install {
            reason: reason.into(),
            code,
        }
    }

    /// Create a launch error carrying the server's exit code
    pub fn launch(reason: impl Into<String>, code: i32) -> Self {
        Self::Launch {
            reason: reason.into(),
            code,
        }
    }

    /// Process exit code the launcher should terminate with for this error.
    ///
    /// Install and launch failures propagate the underlying tool's exit
    /// status; everything else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Install { code, .. } | Self::Launch { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}
