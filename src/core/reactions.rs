//! Reaction normalization and merging.
//!
//! Raw reactions carry their shape in a type-dependent field (`emoji`,
//! `document_id`, or nothing for paid stars). They are normalized into
//! [`ReactionEntry`] values with a structured [`ReactionShape`], and recent
//! reactors are shortened to a compact author id when the reactor is known.

use tracing::debug;

use super::authors::AuthorMap;
use crate::message::{ReactionEntry, ReactionShape, RecentReactor};
use crate::parsing::{RawReaction, RawReactor};

/// Derives the shape: emoji, else document id, else the paid star.
pub fn shape_of(raw: &RawReaction) -> ReactionShape {
    if let Some(emoji) = raw.emoji.as_deref().filter(|e| !e.is_empty()) {
        return ReactionShape::Emoji(emoji.to_string());
    }
    if let Some(doc) = raw.document_id.as_deref().filter(|d| !d.is_empty()) {
        return ReactionShape::StickerId(doc.to_string());
    }
    if raw.kind != "paid" {
        debug!(kind = %raw.kind, "reaction without a shape, treating as star");
    }
    ReactionShape::Star
}

/// Shortens recent reactors known to the author map to `{author_id, date}`.
///
/// Unknown reactors keep `from`, `from_id` and `date` as exported.
pub fn minimize_recent(recent: &[RawReactor], authors: &AuthorMap) -> Vec<RecentReactor> {
    recent
        .iter()
        .map(|reactor| {
            match reactor
                .from_id
                .as_deref()
                .and_then(|id| authors.compact_id(id))
            {
                Some(author_id) => RecentReactor::Author {
                    author_id: author_id.to_string(),
                    date: reactor.date.clone(),
                },
                None => RecentReactor::Unmapped {
                    from: reactor.from.clone(),
                    from_id: reactor.from_id.clone(),
                    date: reactor.date.clone(),
                },
            }
        })
        .collect()
}

/// Builds one entry per raw reaction.
pub fn normalize(raw: &[RawReaction], authors: &AuthorMap) -> Vec<ReactionEntry> {
    raw.iter().map(|r| normalize_one(r, authors)).collect()
}

fn normalize_one(raw: &RawReaction, authors: &AuthorMap) -> ReactionEntry {
    ReactionEntry {
        kind: raw.kind.clone(),
        count: raw.count,
        shape: shape_of(raw),
        recent: minimize_recent(&raw.recent, authors),
    }
}

/// Merges raw reactions into an existing entry list.
///
/// A reaction with the same type and shape as an existing entry adds to its
/// count and recent list; anything else is appended as a new entry.
pub fn merge_into(
    canonical: &mut Vec<ReactionEntry>,
    incoming: &[RawReaction],
    authors: &AuthorMap,
) {
    for raw in incoming {
        let shape = shape_of(raw);
        match canonical
            .iter_mut()
            .find(|entry| entry.matches(&raw.kind, &shape))
        {
            Some(existing) => {
                existing.count += raw.count;
                existing
                    .recent
                    .extend(minimize_recent(&raw.recent, authors));
            }
            None => canonical.push(normalize_one(raw, authors)),
        }
    }
}
