//! Output format writers.
//!
//! - [`write_json`] / [`to_json`] - author map plus message array
//! - [`write_jsonl`] / [`to_jsonl`] - one message per line, for RAG pipelines
//! - [`write_csv`] / [`to_csv`] - flat table with `;` delimiter - requires `csv-output` feature
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> chatstitch::Result<()> {
//! use chatstitch::prelude::*;
//!
//! let export = load_export("export/result.json")?;
//! let output = ArchiveProcessor::new(ProcessingConfig::default())
//!     .process_export(&export, "export".as_ref(), "out/media".as_ref())?;
//!
//! write_json(&output, "out/chatstitch_output.json")?;
//! write_jsonl(&output, "out/chatstitch_output.jsonl")?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
mod json_writer;
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
pub use json_writer::{to_json, write_json};
pub use jsonl_writer::{to_jsonl, write_jsonl};
