//! Media resolution and dispatch.
//!
//! - [`path`] - resolves a relative media reference against the export directory
//! - [`dispatch`] - routes resolved media to the marking service or a plain copy
//! - [`transcription`] - transcript cache and the parallel transcription pool
//!
//! Media problems never fail a run. Every message keeps its text; media that
//! cannot be resolved is dropped from that message with a log line.

pub mod dispatch;
pub mod path;
pub mod transcription;

use serde::Serialize;

pub use dispatch::{
    BLOCKED_PLACEHOLDERS, DispatchOutcome, MarkKind, MarkingService, MarkingSwitch,
    MediaDispatcher, is_blocked_placeholder,
};
pub use path::{ResolvedPath, resolve, resolve_silent};
pub use transcription::{
    EngineFactory, TranscriptionCache, TranscriptionEngine, TranscriptionPool,
};

/// Export keys that can carry a media reference, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKey {
    Photo,
    VideoFile,
    VoiceMessage,
    /// Round video message
    VideoMessage,
    Sticker,
    File,
}

impl MediaKey {
    /// Every key, highest priority first.
    pub const ALL: [MediaKey; 6] = [
        MediaKey::Photo,
        MediaKey::VideoFile,
        MediaKey::VoiceMessage,
        MediaKey::VideoMessage,
        MediaKey::Sticker,
        MediaKey::File,
    ];

    /// Returns the export key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKey::Photo => "photo",
            MediaKey::VideoFile => "video_file",
            MediaKey::VoiceMessage => "voice_message",
            MediaKey::VideoMessage => "video_message",
            MediaKey::Sticker => "sticker",
            MediaKey::File => "file",
        }
    }
}

impl std::fmt::Display for MediaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media type, derived from the name of the directory the export stored it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// `voice_messages/`
    Voice,
    /// `round_video_messages/`
    RoundVideo,
    /// `video_files/`
    Video,
    /// `photos/`
    Photo,
    Other,
}

impl MediaType {
    /// Classifies media by its parent directory name.
    pub fn from_dir_name(name: &str) -> Self {
        match name {
            "voice_messages" => MediaType::Voice,
            "round_video_messages" => MediaType::RoundVideo,
            "video_files" => MediaType::Video,
            "photos" => MediaType::Photo,
            _ => MediaType::Other,
        }
    }

    /// Returns `true` for media with an audio track worth transcribing.
    pub fn is_transcribable(&self) -> bool {
        matches!(
            self,
            MediaType::Voice | MediaType::RoundVideo | MediaType::Video
        )
    }
}
