//! JSON Lines (JSONL) output writer.
//!
//! One message per line, for RAG ingestion and streaming consumers. The author
//! map is not included; messages carry compact author ids only.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::processor::ArchiveOutput;
use crate::error::Result;

/// Writes each message as one JSON object per line.
///
/// ```jsonl
/// {"message_id":1,"timestamp":"...","author_id":"U1","content":{"text":"Hi"}}
/// {"message_id":3,"timestamp":"...","author_id":"U2","content":{"text":"Yo"}}
/// ```
pub fn write_jsonl(output: &ArchiveOutput, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for message in &output.messages {
        serde_json::to_writer(&mut writer, message)?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(())
}

/// Same as [`write_jsonl`], returned as a string.
pub fn to_jsonl(output: &ArchiveOutput) -> Result<String> {
    let mut result = String::new();
    for message in &output.messages {
        result.push_str(&serde_json::to_string(message)?);
        result.push('\n');
    }
    Ok(result)
}
