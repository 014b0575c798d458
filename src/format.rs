//! Output format selection.
//!
//! # Example
//!
//! ```rust
//! use chatstitch::format::OutputFormat;
//!
//! let format = OutputFormat::from_path("archive.jsonl").unwrap();
//! assert_eq!(format, OutputFormat::Jsonl);
//! assert_eq!(format.extension(), "jsonl");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::processor::ArchiveOutput;
use crate::error::{Result, StitchError};

/// Output format for a processed archive.
///
/// - [`Json`](OutputFormat::Json) - author map plus message array (default)
/// - [`Jsonl`](OutputFormat::Jsonl) - one message per line
/// - [`Csv`](OutputFormat::Csv) - flat table, text and media columns only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Jsonl,
    Csv,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["json", "jsonl", "ndjson", "csv"]
    }

    /// Detects format from a file path based on extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        ext.parse().map_err(|_| {
            StitchError::invalid_format(format!(
                "Unknown file extension: '.{ext}'. Expected one of: json, jsonl, csv"
            ))
        })
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

/// Writes a processed archive in the given format.
///
/// # Errors
///
/// Fails if the file cannot be written, or for CSV when the `csv-output`
/// feature is disabled.
pub fn write_to_format(output: &ArchiveOutput, path: impl AsRef<Path>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => crate::core::output::write_json(output, path),
        OutputFormat::Jsonl => crate::core::output::write_jsonl(output, path),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::write_csv(output, path),
        #[cfg(not(feature = "csv-output"))]
        OutputFormat::Csv => Err(StitchError::invalid_format(
            "CSV output requires the 'csv-output' feature to be enabled",
        )),
    }
}
