//! Error types for media-dl
//!
//! This module provides the error taxonomy for the service, including:
//! - Domain-specific error types (Download, Database, Config, etc.)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
///
/// Each variant carries enough context for the API layer to produce a useful
/// message without consulting the logs.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "DOWNLOAD_TIMEOUT_SECS")
        key: Option<String>,
    },

    /// A required external executable could not be located
    #[error("{tool} executable not found (looked in {searched})")]
    MissingTool {
        /// Tool name ("yt-dlp" or "ffmpeg")
        tool: &'static str,
        /// Human-readable description of the locations that were searched
        searched: String,
    },

    /// Request rejected before any work was started
    #[error("{0}")]
    Validation(String),

    /// Download orchestration error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The status store is not configured
    #[error("status store is not configured")]
    StoreUnavailable,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// External tool could not be executed
    #[error("external tool error: {0}")]
    ExternalTool(String),
}

/// Errors produced while running the downloader toolchain for one request
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The downloader exited with a non-zero status
    #[error("{message}")]
    ToolFailed {
        /// Last meaningful line of the tool's output
        message: String,
        /// Exit code, if the process exited normally
        exit_code: Option<i32>,
    },

    /// The downloader exceeded the wall-clock limit and was killed
    #[error("download timed out after {}s", timeout.as_secs())]
    TimedOut {
        /// The limit that was exceeded
        timeout: Duration,
    },

    /// The downloader succeeded but left no usable file behind
    #[error("no file was produced")]
    NoArtifact {
        /// Workspace that was inspected
        workspace: PathBuf,
    },
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "download_failed",
///     "message": "ERROR: Unsupported URL",
///     "details": {
///       "exit_code": 1
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "validation_error", "download_timeout")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - caller input or a tool rejecting the URL
            Error::Validation(_) => 400,
            Error::Download(DownloadError::ToolFailed { .. }) => 400,

            // 404 Not Found
            Error::Download(DownloadError::NoArtifact { .. }) => 404,

            // 504 Gateway Timeout
            Error::Download(DownloadError::TimedOut { .. }) => 504,

            // 503 Service Unavailable
            Error::StoreUnavailable => 503,

            // 500 Internal Server Error - server-side setup or environment
            Error::Config { .. } => 500,
            Error::MissingTool { .. } => 500,
            Error::ExternalTool(_) => 500,
            Error::Database(_) => 500,
            Error::Sqlx(_) => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::MissingTool { .. } => "missing_tool",
            Error::Validation(_) => "validation_error",
            Error::Download(e) => match e {
                DownloadError::ToolFailed { .. } => "download_failed",
                DownloadError::TimedOut { .. } => "download_timeout",
                DownloadError::NoArtifact { .. } => "no_artifact",
            },
            Error::Database(_) => "database_error",
            Error::Sqlx(_) => "database_error",
            Error::StoreUnavailable => "service_unavailable",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ExternalTool(_) => "external_tool_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::MissingTool { tool, .. } => Some(serde_json::json!({
                "tool": tool,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::Download(DownloadError::ToolFailed {
                exit_code: Some(code),
                ..
            }) => Some(serde_json::json!({
                "exit_code": code,
            })),
            Error::Download(DownloadError::TimedOut { timeout }) => Some(serde_json::json!({
                "timeout_secs": timeout.as_secs(),
            })),
            _ => None,
        };

        let mut api_error = ApiError::new(code, message);
        api_error.error.details = details;
        api_error
    }
}
