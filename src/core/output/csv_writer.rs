//! CSV output writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::core::processor::ArchiveOutput;
use crate::error::Result;
use crate::message::ParsedMessage;

const HEADER: [&str; 7] = [
    "MessageId",
    "AuthorId",
    "Timestamp",
    "ReplyTo",
    "Text",
    "Media",
    "Transcript",
];

/// Writes messages to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: `MessageId`, `AuthorId`, `Timestamp`, `ReplyTo`, `Text`, `Media`, `Transcript`
/// - Encoding: UTF-8
pub fn write_csv(output: &ArchiveOutput, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path)?;
    write_records(output, file)
}

/// Same as [`write_csv`], returned as a string.
pub fn to_csv(output: &ArchiveOutput) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(output, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

fn write_records<W: Write>(output: &ArchiveOutput, sink: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(sink);

    writer.write_record(HEADER)?;
    for message in &output.messages {
        writer.write_record(build_record(message))?;
    }

    writer.flush()?;
    Ok(())
}

fn build_record(message: &ParsedMessage) -> [String; 7] {
    let media = message.content.media.as_ref();
    [
        message.message_id.to_string(),
        message.author_id.clone().unwrap_or_default(),
        message.timestamp.clone(),
        message
            .reply_to_message_id
            .map(|id| id.to_string())
            .unwrap_or_default(),
        message.content.text.clone(),
        media.map(|m| m.source_file.clone()).unwrap_or_default(),
        media
            .and_then(|m| m.transcript.clone())
            .unwrap_or_default(),
    ]
}
