//! # AppError
//!
//! Failure taxonomy for the catalog and admin flows. Every variant displays
//! the backend-reported message verbatim so it can be rendered inline.

use thiserror::Error;

/// Structured failure returned by a backend adapter: a human-readable
/// message and, when the failure came over HTTP, its status code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
    pub status: Option<u16>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), status: None }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self { message: message.into(), status: Some(status) }
    }
}

/// The primary error type for all at-core flows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Catalog query rejected or backend unreachable
    #[error("{0}")]
    Read(String),

    /// Binary upload rejected (naming collision, storage error)
    #[error("{0}")]
    Upload(String),

    /// Upload went through but no public URL could be obtained for it
    #[error("Could not get public URL for the uploaded {0}.")]
    UrlResolution(&'static str),

    /// Insert, update or delete rejected
    #[error("{0}")]
    Write(String),

    /// Another submission targeting the same record is still in flight
    #[error("Another submission for item {0} is still in progress.")]
    Busy(String),

    /// A staged file or field exceeded the configured size cap
    #[error("The {field} exceeds the {limit} byte upload limit.")]
    TooLarge { field: String, limit: usize },

    /// A form field carried a value its control cannot produce
    #[error("invalid value for {field}: {value:?}")]
    Invalid { field: String, value: String },
}

impl AppError {
    pub fn read(err: BackendError) -> Self {
        AppError::Read(err.message)
    }

    pub fn upload(err: BackendError) -> Self {
        AppError::Upload(err.message)
    }

    pub fn write(err: BackendError) -> Self {
        AppError::Write(err.message)
    }
}

/// A specialized Result type for Atelier flows.
pub type Result<T> = std::result::Result<T, AppError>;
