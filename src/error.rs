//! Centralized error handling for Treecast
//!
//! This module provides a unified error type that covers all error scenarios
//! in the export pipeline: missing or empty export targets, artifact
//! delivery, snapshot parsing, and configuration.
//!
//! Locally recoverable conditions (a stylesheet that cannot be enumerated, a
//! selector that matches nothing, a font that fails to fetch) are *not*
//! errors: they degrade in place and are logged. Only the structural absence
//! of the primary export target aborts an export, and it does so before any
//! artifact bytes are produced.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the crate.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Export Aborts
    // ─────────────────────────────────────────────────────────────────────────
    /// The requested export root does not exist
    MissingExportRoot { target: String },

    /// The export root exists but holds no content
    EmptyExportRoot { target: String },

    /// No tree data was supplied for a tree export
    TreeDataUnavailable,

    // ─────────────────────────────────────────────────────────────────────────
    // Artifact Delivery
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to write a finished artifact to disk
    ArtifactWrite { path: PathBuf, source: io::Error },

    // ─────────────────────────────────────────────────────────────────────────
    // Snapshot Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to parse a snapshot (invalid JSON or shape)
    SnapshotParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,
}

// Conversions from underlying error types
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SnapshotParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-visible messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Export Aborts
            Error::MissingExportRoot { target } => {
                write!(f, "Export root '{target}' was not found")
            }
            Error::EmptyExportRoot { target } => {
                write!(f, "Export root '{target}' is empty at this step")
            }
            Error::TreeDataUnavailable => {
                write!(f, "No tree data available; has the tree been built?")
            }

            // Artifact Delivery
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::ArtifactWrite { path, source } => {
                write!(f, "Failed to write artifact '{}': {source}", path.display())
            }

            // Snapshot Errors
            Error::SnapshotParse { message, .. } => {
                write!(f, "Invalid snapshot format: {message}")
            }

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(f, "Could not load settings from '{}': {source}", path.display())
            }
            Error::ConfigSave { path, source } => {
                write!(f, "Could not save settings to '{}': {source}", path.display())
            }
            Error::ConfigDirNotFound => {
                write!(f, "No configuration directory could be determined")
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::ArtifactWrite { source, .. } => Some(source),
            Error::ConfigLoad { source, .. } | Error::ConfigSave { source, .. } => {
                Some(source.as_ref())
            }
            Error::SnapshotParse { source, .. } => source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::MissingExportRoot { .. }
            | Error::EmptyExportRoot { .. }
            | Error::TreeDataUnavailable
            | Error::ConfigDirNotFound => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension methods for [`Result`] supporting the degrade-in-place policy.
pub trait ResultExt<T> {
    /// Log the error at warning level and substitute `default`.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        self.unwrap_or_else(|err| {
            warn!("{context}: {err}. Using default.");
            default
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
