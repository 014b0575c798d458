//! Unified error types for chatstitch.
//!
//! This module provides a single [`StitchError`] enum for the operations that can
//! actually fail: loading an export, loading configuration, and writing output.
//!
//! The consolidation engine itself never fails. Problems with individual media
//! files or transcriptions are reported through small outcome enums instead:
//!
//! - [`SkipReason`] - a media reference that could not be resolved (skip-class)
//! - [`MarkingError`] - the marking service rejected a file (falls back to copy)
//! - [`TranscriptionError`] - a single transcription failed (null result)

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatstitch operations.
pub type Result<T> = std::result::Result<T, StitchError>;

/// The error type for fallible chatstitch operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StitchError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The export file doesn't exist
    /// - The output media directory can't be created
    /// - Disk is full (when writing output)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse the input export.
    #[error("Failed to parse {format} export{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Parse {
        /// The format being parsed (e.g., "Telegram JSON")
        format: &'static str,
        /// The underlying parse error
        #[source]
        source: serde_json::Error,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// JSON serialization error while writing output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The configuration file is missing or malformed.
    #[error("Invalid configuration ({}): {message}", path.display())]
    Config {
        /// Path of the configuration file
        path: PathBuf,
        /// Description of what's wrong
        message: String,
    },

    /// Refused to overwrite an existing configuration file.
    #[error("Configuration file already exists: {}", path.display())]
    ConfigExists {
        /// Path of the existing file
        path: PathBuf,
    },

    /// The requested output format is unknown or not compiled in.
    #[error("Invalid output format: {message}")]
    InvalidFormat {
        /// Description of what's wrong
        message: String,
    },
}

impl From<std::string::FromUtf8Error> for StitchError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        StitchError::Io(io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl StitchError {
    /// Creates a parse error for the Telegram export format.
    pub fn telegram_parse(source: serde_json::Error, path: Option<PathBuf>) -> Self {
        StitchError::Parse {
            format: "Telegram JSON",
            source,
            path,
        }
    }

    /// Creates a configuration error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        StitchError::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an output format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        StitchError::InvalidFormat {
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, StitchError::Io(_))
    }

    /// Returns `true` if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, StitchError::Parse { .. })
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            StitchError::Config { .. } | StitchError::ConfigExists { .. }
        )
    }
}

/// Why a media reference was skipped.
///
/// Skips are logged and the message is kept with no media attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The path does not exist, or could not be inspected.
    NotFound,
    /// The path resolves outside the export's base directory.
    OutOfBounds,
    /// The path names a directory.
    IsDirectory,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "not found"),
            SkipReason::OutOfBounds => write!(f, "outside base directory"),
            SkipReason::IsDirectory => write!(f, "is a directory"),
        }
    }
}

/// Failure reported by a [`MarkingService`](crate::media::MarkingService).
///
/// Every variant falls back to a plain copy. `EngineUnavailable` additionally
/// turns marking off for the rest of the run.
#[derive(Debug, Error)]
pub enum MarkingError {
    /// The marker ran but could not produce output for this file.
    #[error("marking failed: {0}")]
    MarkingFailed(String),

    /// The file is not a valid media file of the expected kind.
    #[error("invalid media: {0}")]
    InvalidMedia(String),

    /// The processing engine (e.g. ffmpeg) is missing or unusable.
    #[error("processing engine unavailable: {0}")]
    EngineUnavailable(String),
}

impl MarkingError {
    /// Returns `true` if marking should be disabled for the rest of the run.
    pub fn disables_marking(&self) -> bool {
        matches!(self, MarkingError::EngineUnavailable(_))
    }
}

/// Failure of a single transcription item.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The worker could not construct its engine instance.
    #[error("failed to load transcription engine: {0}")]
    EngineInit(String),

    /// The engine failed on this file.
    #[error("transcription failed: {0}")]
    Failed(String),
}

// ============================================================================
// Tests
// ============================================================================
