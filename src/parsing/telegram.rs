//! Telegram Desktop export types and the text-entity renderer.
//!
//! Telegram exports chats as JSON with the following structure:
//! ```json
//! {
//!   "name": "Chat Name",
//!   "type": "personal_chat",
//!   "id": 123456789,
//!   "messages": [
//!     {
//!       "id": 12345,
//!       "type": "message",
//!       "date": "2024-01-15T10:30:00",
//!       "date_unixtime": "1705314600",
//!       "from": "Sender Name",
//!       "from_id": "user42",
//!       "text": "Hello" | ["Hello", {"type": "bold", "text": "world"}],
//!       "reply_to_message_id": 12344,
//!       "photo": "photos/photo_1@15-01-2024_10-30-00.jpg",
//!       "reactions": [{"type": "emoji", "count": 2, "emoji": "👍", "recent": [...]}]
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Result, StitchError};
use crate::media::MediaKey;
use crate::message::Poll;

/// A whole Telegram export file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatExport {
    /// Chat name
    #[serde(default)]
    pub name: Option<String>,
    /// Chat type (`personal_chat`, `private_group`, ...)
    #[serde(default, rename = "type")]
    pub chat_type: Option<String>,
    /// Chat id
    #[serde(default)]
    pub id: Option<i64>,
    /// Every record in export order
    pub messages: Vec<SourceMessage>,
}

/// Raw Telegram record, exactly as exported.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceMessage {
    /// Source-assigned message id
    pub id: u64,
    /// Record type; only `"message"` is processed
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Human-readable send date
    pub date: String,
    /// Unix timestamp as string
    pub date_unixtime: Option<String>,
    /// Sender name
    pub from: Option<String>,
    /// Sender identity (`user123`, `channel456`)
    pub from_id: Option<String>,
    /// Message text (string, entity array, or absent)
    pub text: Option<Value>,
    /// Reply reference
    pub reply_to_message_id: Option<u64>,
    /// Original author of a forwarded message
    pub forwarded_from: Option<String>,
    /// Edit date, if edited
    pub edited: Option<String>,
    /// Signature of a channel post author
    pub author: Option<String>,
    /// Poll attached to the message
    pub poll: Option<Poll>,
    /// Reactions on the message
    pub reactions: Option<Vec<RawReaction>>,

    pub photo: Option<String>,
    pub video_file: Option<String>,
    pub voice_message: Option<String>,
    pub video_message: Option<String>,
    pub sticker: Option<String>,
    pub file: Option<String>,
}

impl SourceMessage {
    /// Returns `true` for regular messages (as opposed to service records).
    pub fn is_message(&self) -> bool {
        self.msg_type == "message"
    }

    /// Returns the first media reference present, in [`MediaKey::ALL`] order.
    pub fn media_reference(&self) -> Option<(MediaKey, &str)> {
        MediaKey::ALL.iter().find_map(|&key| {
            let value = match key {
                MediaKey::Photo => &self.photo,
                MediaKey::VideoFile => &self.video_file,
                MediaKey::VoiceMessage => &self.voice_message,
                MediaKey::VideoMessage => &self.video_message,
                MediaKey::Sticker => &self.sticker,
                MediaKey::File => &self.file,
            };
            value.as_deref().map(|v| (key, v))
        })
    }

    /// Renders the text field to markdown. Absent text renders as `""`.
    pub fn rendered_text(&self) -> String {
        self.text.as_ref().map(render_text).unwrap_or_default()
    }

    /// Parses `date_unixtime` into a UTC timestamp.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.date_unixtime
            .as_deref()
            .and_then(parse_unix_timestamp)
    }
}

/// Raw reaction as exported.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawReaction {
    /// `emoji`, `custom_emoji`, `paid`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u64,
    pub emoji: Option<String>,
    /// Custom emoji document; exported as a path or a number
    #[serde(deserialize_with = "string_or_number")]
    pub document_id: Option<String>,
    pub recent: Vec<RawReactor>,
}

/// One entry of a reaction's `recent` list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawReactor {
    pub from: Option<String>,
    pub from_id: Option<String>,
    pub date: String,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Parses an export from a JSON string.
pub fn parse_export(content: &str) -> Result<ChatExport> {
    serde_json::from_str(content).map_err(|e| StitchError::telegram_parse(e, None))
}

/// Reads and parses an export file.
pub fn load_export(path: impl AsRef<Path>) -> Result<ChatExport> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| StitchError::telegram_parse(e, Some(path.to_path_buf())))
}

/// Converts Telegram's `text` field to markdown.
///
/// The field can be:
/// - A simple string: `"Hello"`
/// - An array of strings and entity objects: `["Text", {"type": "bold", "text": "x"}]`
pub fn render_text(text_value: &Value) -> String {
    match text_value {
        Value::String(s) => s.clone(),
        Value::Array(entities) => entities.iter().map(render_entity).collect(),
        _ => String::new(),
    }
}

fn render_entity(entity: &Value) -> String {
    let obj = match entity {
        Value::String(s) => return s.clone(),
        Value::Object(obj) => obj,
        _ => return String::new(),
    };

    let text = obj.get("text").and_then(Value::as_str).unwrap_or_default();
    if text.is_empty() {
        return String::new();
    }

    let str_field = |key: &str| obj.get(key).and_then(Value::as_str);
    match str_field("type").unwrap_or("plain") {
        "bold" => format!("**{text}**"),
        "italic" => format!("*{text}*"),
        "strikethrough" => format!("~~{text}~~"),
        "code" => format!("`{text}`"),
        "pre" => format!("```{}\n{text}\n```", str_field("language").unwrap_or_default()),
        "text_link" => format!("[{text}]({})", str_field("href").unwrap_or("#")),
        // plain, link, mention, hashtag and anything newer
        _ => text.to_string(),
    }
}

/// Parses a Unix timestamp string to DateTime.
///
/// Telegram stores timestamps as strings like "1234567890".
pub fn parse_unix_timestamp(ts_str: &str) -> Option<DateTime<Utc>> {
    ts_str
        .parse::<i64>()
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
}
