//! Centralized error handling for tabloid.
//!
//! Fatal conditions are variants of [`PlatformError`]. Loader and batch
//! failures surface to the caller of a run; the analyser never raises for
//! data-shape reasons and reports degraded results through
//! [`crate::analyser::CountMode`] instead.
//!
//! ```
//! use tabloid::error::PlatformError;
//!
//! fn describe(err: &PlatformError) -> &'static str {
//!     match err {
//!         PlatformError::UnsupportedFormat { .. } => "skip or rename the file",
//!         PlatformError::ParseFailure { .. } => "inspect the file contents",
//!         PlatformError::NoInputData { .. } => "upload something first",
//!         _ => "unexpected failure",
//!     }
//! }
//! ```
//!
//! The [`ResultExt`] trait adds `.context()` to any result whose error
//! converts into [`PlatformError`].

use std::fmt;

/// Main error type for tabloid operations.
#[derive(Debug)]
pub enum PlatformError {
    /// I/O errors (local files, filesystem-backed storage)
    Io(std::io::Error),

    /// The file extension is not one the loader recognizes
    UnsupportedFormat { file: String, extension: String },

    /// Every parsing strategy for the file was exhausted
    ParseFailure { file: String, reason: String },

    /// The input namespace holds no objects
    NoInputData { namespace: String },

    /// A dataset violated its shape invariants
    InvalidDataset(String),

    /// Object storage collaborator errors
    Storage(String),

    /// Requested object does not exist
    ObjectNotFound { namespace: String, name: String },

    /// Configuration errors
    Config(String),

    /// Report or document serialization errors
    Serialization(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnsupportedFormat { file, extension } => {
                write!(f, "Unsupported format for '{file}': '.{extension}'")
            }
            Self::ParseFailure { file, reason } => {
                write!(f, "Failed to parse '{file}': {reason}")
            }
            Self::NoInputData { namespace } => {
                write!(f, "No input data found in namespace '{namespace}'")
            }
            Self::InvalidDataset(msg) => write!(f, "Invalid dataset: {msg}"),
            Self::Storage(msg) => write!(f, "Storage error: {msg}"),
            Self::ObjectNotFound { namespace, name } => {
                write!(f, "Object not found: {namespace}/{name}")
            }
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl PlatformError {
    /// True for the per-file loader failures a skip policy may tolerate.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::ParseFailure { .. }
        )
    }
}

impl From<std::io::Error> for PlatformError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for PlatformError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(format!("JSON error: {err}"))
    }
}

impl From<csv::Error> for PlatformError {
    fn from(err: csv::Error) -> Self {
        Self::Serialization(format!("CSV error: {err}"))
    }
}

impl From<PlatformError> for String {
    fn from(err: PlatformError) -> Self {
        err.to_string()
    }
}

/// Result type alias for tabloid operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PlatformError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: PlatformError = e.into();
            PlatformError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: PlatformError = e.into();
            PlatformError::Other(format!("{}: {}", f(), err))
        })
    }
}
