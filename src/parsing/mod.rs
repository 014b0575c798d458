//! Export parsing.
//!
//! This module holds the raw record types read from a Telegram Desktop export
//! and the renderer that turns Telegram text entities into markdown.

pub mod telegram;

// Re-export commonly used items
pub use telegram::{
    ChatExport, RawReaction, RawReactor, SourceMessage, load_export, parse_export,
    parse_unix_timestamp, render_text,
};
