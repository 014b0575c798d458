//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure, plus the path and config resolution
//!   the binary applies to it
//! - [`FormatArg`] - output format as a clap value

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::config::{CONFIG_FILE_NAME, ProcessingConfig};
use crate::error::{Result, StitchError};
use crate::format::OutputFormat;

/// Default output file stem, placed next to the export.
pub const DEFAULT_OUTPUT_STEM: &str = "chatstitch_output";

/// Consolidate a Telegram Desktop export into a compact archive:
/// split posts stitched, replies redirected, media collected.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatstitch")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatstitch export/result.json
    chatstitch export/result.json -o archive.jsonl --format jsonl
    chatstitch export/result.json --media-dir out/media --config my_config.json
    chatstitch --init")]
pub struct Args {
    /// Path to the export file (result.json)
    #[arg(required_unless_present = "init")]
    pub input: Option<PathBuf>,

    /// Path to output file [default: <export dir>/chatstitch_output.<format>]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for copied media [default: <output dir>/media]
    #[arg(long, value_name = "DIR")]
    pub media_dir: Option<PathBuf>,

    /// Configuration file [default: ./chatstitch_config.json if present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: FormatArg,

    /// Mark voice, video and photo media while copying
    #[arg(long)]
    pub mark_media: bool,

    /// Transcribe voice and video messages
    #[arg(long)]
    pub transcribe: bool,

    /// Verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write a default configuration file to the current directory and exit
    #[arg(long)]
    pub init: bool,
}

impl Args {
    /// The export file, required unless `--init` is given.
    pub fn input_path(&self) -> Result<&Path> {
        self.input.as_deref().ok_or_else(|| {
            StitchError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no export file given",
            ))
        })
    }

    /// Directory media references are resolved against: the export's parent.
    pub fn base_dir(&self) -> PathBuf {
        self.input
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let format: OutputFormat = self.format.into();
            self.base_dir()
                .join(format!("{DEFAULT_OUTPUT_STEM}.{}", format.extension()))
        })
    }

    pub fn media_dir(&self) -> PathBuf {
        self.media_dir.clone().unwrap_or_else(|| {
            self.output_path()
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .join("media")
        })
    }

    /// Loads the configuration and applies flag overrides.
    ///
    /// `--config` must exist; otherwise `./chatstitch_config.json` is used if
    /// present, else defaults. Flags can only turn options on.
    pub fn processing_config(&self) -> Result<ProcessingConfig> {
        let config = match &self.config {
            Some(path) => ProcessingConfig::from_file(path)?,
            None if Path::new(CONFIG_FILE_NAME).exists() => {
                ProcessingConfig::from_file(CONFIG_FILE_NAME)?
            }
            None => ProcessingConfig::default(),
        };

        let mark_media = config.mark_media || self.mark_media;
        let transcribe_media = config.transcribe_media || self.transcribe;
        Ok(config
            .with_mark_media(mark_media)
            .with_transcribe_media(transcribe_media))
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default)]
pub enum FormatArg {
    /// Author map plus message array
    #[default]
    Json,

    /// One JSON message per line (ideal for RAG)
    #[value(alias = "ndjson")]
    Jsonl,

    /// Semicolon-delimited table
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> OutputFormat {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Jsonl => OutputFormat::Jsonl,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}
