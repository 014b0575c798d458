//! # Chatstitch
//!
//! A Rust library for consolidating Telegram Desktop chat exports into a
//! compact, LLM-friendly archive.
//!
//! ## Overview
//!
//! Telegram splits one logical post into several records when it carries more
//! than one media item. Chatstitch:
//! - stitches such runs back into a single message (texts joined, reactions merged)
//! - redirects replies that pointed at an absorbed record
//! - assigns compact author ids (`U1`, `U2`, ...)
//! - collects referenced media into one directory, optionally through a
//!   marking service, and attaches transcripts for voice and video messages
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatstitch::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let export = load_export("export/result.json")?;
//!     let output = ArchiveProcessor::new(ProcessingConfig::default())
//!         .process_export(&export, "export".as_ref(), "out/media".as_ref())?;
//!
//!     write_json(&output, "out/chatstitch_output.json")?;
//!     println!(
//!         "{} records -> {} messages",
//!         output.stats.source_count, output.stats.stitched_count
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## External collaborators
//!
//! Media marking and speech-to-text are capabilities the caller provides by
//! implementing [`MarkingService`](media::MarkingService) and
//! [`EngineFactory`](media::EngineFactory). Without them the pipeline runs
//! copy-only.
//!
//! ## Module Structure
//!
//! - [`parsing`] - export types ([`SourceMessage`](parsing::SourceMessage)) and the markdown text renderer
//! - [`media`] - path resolver, media dispatcher, transcription pool
//! - [`core`] - author map, reactions, stitcher, reply rewrite, processor, output writers
//! - [`message`] - output types ([`ParsedMessage`](message::ParsedMessage))
//! - [`config`] - [`ProcessingConfig`](config::ProcessingConfig)
//! - [`format`] - [`OutputFormat`](format::OutputFormat)
//! - [`progress`] - progress callbacks
//! - [`error`] - [`StitchError`], [`Result`]
//! - [`prelude`] - Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod media;
pub mod message;
pub mod parsing;
pub mod progress;

// Re-export the main types at the crate root for convenience
pub use error::{Result, StitchError};
pub use message::ParsedMessage;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatstitch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Result, StitchError};

    pub use crate::config::{ProcessingConfig, TranscriptionConfig};

    pub use crate::parsing::{ChatExport, SourceMessage, load_export, parse_export};

    pub use crate::message::{Content, MediaDescriptor, ParsedMessage, ReactionEntry, ReactionShape};

    pub use crate::core::{
        ArchiveOutput, ArchiveProcessor, AuthorMap, IdAliasMap, ProcessingStats, rewrite_replies,
    };

    pub use crate::media::{
        EngineFactory, MarkKind, MarkingService, TranscriptionEngine,
    };

    #[cfg(feature = "csv-output")]
    pub use crate::core::output::{to_csv, write_csv};
    pub use crate::core::output::{to_json, to_jsonl, write_json, write_jsonl};

    pub use crate::format::{OutputFormat, write_to_format};

    pub use crate::progress::{Progress, ProgressCallback, Stage};
}
