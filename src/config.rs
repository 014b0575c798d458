//! Configuration types for archive processing.
//!
//! [`ProcessingConfig`] mirrors the flat `chatstitch_config.json` file:
//!
//! ```json
//! {
//!   "mark_media": false,
//!   "transcribe_media": false,
//!   "transcription_model": "small",
//!   "transcription_device": "cpu",
//!   "transcription_compute_type": "int8"
//! }
//! ```
//!
//! # Example
//!
//! ```rust
//! use chatstitch::config::{ProcessingConfig, TranscriptionConfig};
//!
//! let config = ProcessingConfig::new()
//!     .with_mark_media(true)
//!     .with_transcription(TranscriptionConfig::new().with_model("medium"));
//!
//! assert!(config.mark_media);
//! assert_eq!(config.transcription.model, "medium");
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StitchError};

/// File name used by `chatstitch --init`.
pub const CONFIG_FILE_NAME: &str = "chatstitch_config.json";

/// Top-level processing options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Run media through the marking service (default: false)
    pub mark_media: bool,

    /// Replace voice and video media with transcripts (default: false)
    pub transcribe_media: bool,

    /// Transcription engine settings, stored flat as `transcription_*` keys
    #[serde(flatten)]
    pub transcription: TranscriptionConfig,
}

impl ProcessingConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| StitchError::config(path, format!("cannot read file: {e}")))?;
        Self::from_json(&content).map_err(|e| StitchError::config(path, e.to_string()))
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Writes the default configuration as a template.
    ///
    /// Never overwrites an existing file.
    pub fn write_template(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            return Err(StitchError::ConfigExists {
                path: path.to_path_buf(),
            });
        }
        let json = serde_json::to_string_pretty(&Self::default())?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Enables or disables media marking.
    #[must_use]
    pub fn with_mark_media(mut self, enabled: bool) -> Self {
        self.mark_media = enabled;
        self
    }

    /// Enables or disables transcription.
    #[must_use]
    pub fn with_transcribe_media(mut self, enabled: bool) -> Self {
        self.transcribe_media = enabled;
        self
    }

    /// Sets the transcription engine settings.
    #[must_use]
    pub fn with_transcription(mut self, transcription: TranscriptionConfig) -> Self {
        self.transcription = transcription;
        self
    }
}

/// Read-only settings shared by every transcription worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Model name (default: "small")
    #[serde(rename = "transcription_model")]
    pub model: String,

    /// Device the model runs on (default: "cpu")
    #[serde(rename = "transcription_device")]
    pub device: String,

    /// Compute precision (default: "int8")
    #[serde(rename = "transcription_compute_type")]
    pub compute_type: String,

    /// Worker count override; `None` derives it from available parallelism
    #[serde(
        rename = "transcription_workers",
        skip_serializing_if = "Option::is_none"
    )]
    pub workers: Option<usize>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "small".to_string(),
            device: "cpu".to_string(),
            compute_type: "int8".to_string(),
            workers: None,
        }
    }
}

impl TranscriptionConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the device.
    #[must_use]
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Sets the compute precision.
    #[must_use]
    pub fn with_compute_type(mut self, compute_type: impl Into<String>) -> Self {
        self.compute_type = compute_type.into();
        self
    }

    /// Overrides the number of workers.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Number of pool workers: the override if set, otherwise one less than
    /// the available parallelism. Never below 1.
    pub fn worker_count(&self) -> usize {
        if let Some(workers) = self.workers {
            return workers.max(1);
        }
        let cpus = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1);
        cpus.saturating_sub(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_processing_config_default() {
        let config = ProcessingConfig::default();
        assert!(!config.mark_media);
        assert!(!config.transcribe_media);
        assert_eq!(config.transcription.model, "small");
        assert_eq!(config.transcription.device, "cpu");
        assert_eq!(config.transcription.compute_type, "int8");
    }

    #[test]
    fn test_flat_keys() {
        let json = r#"{
            "mark_media": true,
            "transcribe_media": true,
            "transcription_model": "large-v3",
            "transcription_device": "cuda",
            "transcription_compute_type": "float16"
        }"#;
        let config = ProcessingConfig::from_json(json).unwrap();
        assert!(config.mark_media);
        assert!(config.transcribe_media);
        assert_eq!(config.transcription.model, "large-v3");
        assert_eq!(config.transcription.device, "cuda");
        assert_eq!(config.transcription.compute_type, "float16");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ProcessingConfig::from_json(r#"{"mark_media": true}"#).unwrap();
        assert!(config.mark_media);
        assert_eq!(config.transcription, TranscriptionConfig::default());
    }

    #[test]
    fn test_template_round_trip_and_no_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        ProcessingConfig::write_template(&path).unwrap();
        let loaded = ProcessingConfig::from_file(&path).unwrap();
        assert_eq!(loaded, ProcessingConfig::default());

        let err = ProcessingConfig::write_template(&path).unwrap_err();
        assert!(matches!(err, StitchError::ConfigExists { .. }));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let err = ProcessingConfig::from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_worker_count() {
        assert_eq!(TranscriptionConfig::new().with_workers(0).worker_count(), 1);
        assert_eq!(TranscriptionConfig::new().with_workers(3).worker_count(), 3);
        assert!(TranscriptionConfig::new().worker_count() >= 1);
    }
}
