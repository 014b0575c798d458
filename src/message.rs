//! Canonical output types.
//!
//! A [`ParsedMessage`] is what the stitcher emits: one logical message built from
//! one or more consecutive source records. Its JSON shape is compact; empty and
//! absent optional fields are omitted.
//!
//! # Example
//!
//! ```
//! use chatstitch::message::{ParsedMessage, ReactionEntry, ReactionShape};
//!
//! let mut msg = ParsedMessage::new(1, "2024-01-15T10:30:00").with_author("U1");
//! msg.content.text = "Hi".to_string();
//! msg.reactions = Some(vec![ReactionEntry::new("emoji", 2, ReactionShape::Emoji("👍".into()))]);
//!
//! let json = serde_json::to_value(&msg)?;
//! assert_eq!(json["author_id"], "U1");
//! assert_eq!(json["reactions"][0]["emoji"], "👍");
//! # Ok::<(), serde_json::Error>(())
//! ```

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::media::MediaKey;

/// A consolidated chat message.
///
/// `message_id` is always the id of the first source record in the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedMessage {
    /// Id of the first absorbed source record.
    pub message_id: u64,

    /// Send date as exported.
    pub timestamp: String,

    /// Compact author id (`U1`, `U2`, ...); `null` when the sender is unknown.
    pub author_id: Option<String>,

    /// Text and media.
    pub content: Content,

    /// Id of the message this replies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarded_from: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_time: Option<String>,

    /// Channel post signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll: Option<Poll>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<ReactionEntry>>,
}

impl ParsedMessage {
    /// Creates an empty message with the given id and timestamp.
    pub fn new(message_id: u64, timestamp: impl Into<String>) -> Self {
        Self {
            message_id,
            timestamp: timestamp.into(),
            author_id: None,
            content: Content::default(),
            reply_to_message_id: None,
            forwarded_from: None,
            edited_time: None,
            post_author: None,
            poll: None,
            reactions: None,
        }
    }

    /// Builder method to set the compact author id.
    #[must_use]
    pub fn with_author(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    /// Builder method to set the reply reference.
    #[must_use]
    pub fn with_reply_to(mut self, reply_id: u64) -> Self {
        self.reply_to_message_id = Some(reply_id);
        self
    }

    /// Returns `true` if the text is non-empty.
    pub fn has_text(&self) -> bool {
        !self.content.text.is_empty()
    }

    /// Returns `true` if media is attached.
    pub fn has_media(&self) -> bool {
        self.content.media.is_some()
    }
}

/// Message body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Content {
    /// Markdown text; paragraphs of stitched records are separated by a blank line.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaDescriptor>,
}

/// Media attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaDescriptor {
    /// Export key the media came from (`photo`, `voice_message`, ...).
    #[serde(rename = "type")]
    pub kind: MediaKey,

    /// Relative path inside the export.
    pub source_file: String,

    /// Transcript, for voice and video media when transcription ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl MediaDescriptor {
    pub fn new(kind: MediaKey, source_file: impl Into<String>) -> Self {
        Self {
            kind,
            source_file: source_file.into(),
            transcript: None,
        }
    }

    /// Builder method to attach a transcript.
    #[must_use]
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = Some(transcript.into());
        self
    }
}

/// Poll attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Poll {
    pub question: String,
    pub closed: bool,
    pub answers: Vec<PollAnswer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollAnswer {
    pub text: String,
    pub voters: u64,
    pub chosen: bool,
}

/// What a reaction looks like.
///
/// Two reactions merge only when their type and shape are both equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReactionShape {
    /// Unicode emoji
    Emoji(String),
    /// Custom emoji or sticker document id
    StickerId(String),
    /// Paid reaction
    Star,
}

impl ReactionShape {
    /// Marker used for paid reactions.
    pub const STAR: &'static str = "⭐️";

    /// Returns the serialized shape value.
    pub fn value(&self) -> &str {
        match self {
            ReactionShape::Emoji(s) | ReactionShape::StickerId(s) => s,
            ReactionShape::Star => Self::STAR,
        }
    }
}

/// A reaction on a canonical message.
///
/// Serialized with the reaction type doubling as the shape key, e.g.
/// `{"type": "emoji", "count": 3, "emoji": "👍"}` or
/// `{"type": "paid", "count": 1, "paid": "⭐️"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionEntry {
    /// Reaction type (`emoji`, `custom_emoji`, `paid`, ...)
    pub kind: String,
    pub count: u64,
    pub shape: ReactionShape,
    /// Recent reactors, minimized against the author map.
    pub recent: Vec<RecentReactor>,
}

impl ReactionEntry {
    pub fn new(kind: impl Into<String>, count: u64, shape: ReactionShape) -> Self {
        Self {
            kind: kind.into(),
            count,
            shape,
            recent: Vec::new(),
        }
    }

    /// Returns `true` if `kind` and `shape` identify this entry.
    pub fn matches(&self, kind: &str, shape: &ReactionShape) -> bool {
        self.kind == kind && &self.shape == shape
    }
}

impl Serialize for ReactionEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.recent.is_empty() { 3 } else { 4 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", &self.kind)?;
        map.serialize_entry("count", &self.count)?;
        map.serialize_entry(&self.kind, self.shape.value())?;
        if !self.recent.is_empty() {
            map.serialize_entry("recent", &self.recent)?;
        }
        map.end()
    }
}

/// A recent reactor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecentReactor {
    /// Reactor found in the author map.
    Author { author_id: String, date: String },
    /// Reactor who never wrote in the chat; kept verbatim.
    Unmapped {
        from: Option<String>,
        from_id: Option<String>,
        date: String,
    },
}
