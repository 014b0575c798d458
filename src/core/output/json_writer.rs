//! JSON output writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::core::authors::AuthorMap;
use crate::core::processor::ArchiveOutput;
use crate::error::Result;
use crate::message::ParsedMessage;

/// Top-level JSON document.
#[derive(Serialize)]
struct JsonDocument<'a> {
    author_map: &'a AuthorMap,
    messages: &'a [ParsedMessage],
}

/// Writes the author map and messages to a pretty-printed JSON file.
///
/// # Format
/// ```json
/// {
///   "author_map": {"U1": {"name": "Alice", "id": "user1"}},
///   "messages": [
///     {"message_id": 1, "timestamp": "...", "author_id": "U1", "content": {"text": "Hi"}}
///   ]
/// }
/// ```
pub fn write_json(output: &ArchiveOutput, path: impl AsRef<Path>) -> Result<()> {
    let json = to_json(output)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Same document as [`write_json`], returned as a string.
pub fn to_json(output: &ArchiveOutput) -> Result<String> {
    let document = JsonDocument {
        author_map: &output.author_map,
        messages: &output.messages,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
