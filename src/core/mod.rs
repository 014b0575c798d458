//! Consolidation passes.
//!
//! This module contains:
//! - [`authors`] - compact author ids (`U1`, `U2`, ...)
//! - [`reactions`] - reaction normalization and merging
//! - [`stitcher`] - folds split posts into canonical messages
//! - [`replies`] - redirects replies that point at absorbed records
//! - [`processor`] - runs the passes in order and collects statistics
//! - [`output`] - format writers (JSON, JSONL, CSV)
//!
//! The passes are sequential: the reply rewrite starts only after stitching
//! has produced the full message list and alias map.

pub mod authors;
pub mod output;
pub mod processor;
pub mod reactions;
pub mod replies;
pub mod stitcher;

pub use authors::{AuthorEntry, AuthorMap};
pub use processor::{ArchiveOutput, ArchiveProcessor, ProcessingStats, collect_transcribable};
pub use replies::{rewrite_replies, rewrite_replies_with_progress};
pub use stitcher::{ABSORB_SEPARATOR, IdAliasMap, StitchOutput, Stitcher};

#[cfg(feature = "csv-output")]
pub use output::{to_csv, write_csv};
pub use output::{to_json, to_jsonl, write_json, write_jsonl};
