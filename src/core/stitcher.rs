//! Message stitching.
//!
//! Telegram splits one logical post into several records when it carries
//! several media items: every record shares the author, send time and forward
//! origin, and each carries its own text. The stitcher folds such runs into the
//! first record of the run (the canonical) and records an alias for every id it
//! absorbed so replies can be redirected afterwards.
//!
//! # Example
//! Input:  `[#1 Alice 10:00 "Hi", #2 Alice 10:00 "there", #3 Bob 10:01 "Yo"]`
//! Output: `[#1 "Hi\n\nthere", #3 "Yo"]`, aliases `{2 -> 1}`

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::{debug, warn};

use super::authors::AuthorMap;
use super::reactions::{merge_into, normalize};
use crate::media::{DispatchOutcome, MediaDispatcher, TranscriptionCache};
use crate::message::ParsedMessage;
use crate::parsing::SourceMessage;
use crate::progress::{Progress, ProgressCallback, Stage, no_progress};

/// Separator placed between the texts of absorbed records.
pub const ABSORB_SEPARATOR: &str = "\n\n";

/// Absorbed id to canonical id. Entries are never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAliasMap(BTreeMap<u64, u64>);

impl IdAliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `absorbed -> canonical`.
    ///
    /// Returns `false` and keeps the existing target if `absorbed` is already mapped.
    pub fn insert(&mut self, absorbed: u64, canonical: u64) -> bool {
        match self.0.entry(absorbed) {
            Entry::Vacant(slot) => {
                slot.insert(canonical);
                true
            }
            Entry::Occupied(existing) => {
                warn!(
                    absorbed,
                    canonical = *existing.get(),
                    ignored = canonical,
                    "duplicate alias ignored"
                );
                false
            }
        }
    }

    pub fn get(&self, id: u64) -> Option<u64> {
        self.0.get(&id).copied()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.0.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of one stitching pass.
#[derive(Debug, Default)]
pub struct StitchOutput {
    /// Canonical messages in source order.
    pub messages: Vec<ParsedMessage>,
    pub aliases: IdAliasMap,
    /// Records skipped because they were not of type `message`.
    pub skipped: usize,
}

/// Folds split posts into canonical messages.
pub struct Stitcher<'a> {
    authors: &'a AuthorMap,
    dispatcher: &'a MediaDispatcher<'a>,
    cache: &'a TranscriptionCache,
    progress: ProgressCallback,
}

impl<'a> Stitcher<'a> {
    pub fn new(
        authors: &'a AuthorMap,
        dispatcher: &'a MediaDispatcher<'a>,
        cache: &'a TranscriptionCache,
    ) -> Self {
        Self {
            authors,
            dispatcher,
            cache,
            progress: no_progress(),
        }
    }

    /// Sets the callback invoked once per source record.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// Runs the two-pointer pass over `source`.
    ///
    /// Each record is visited once: either it starts a canonical message, it is
    /// absorbed into the preceding canonical, or it is skipped.
    pub fn stitch(&self, source: &[SourceMessage]) -> StitchOutput {
        let total = source.len();
        let mut output = StitchOutput::default();
        let mut index = 0;

        while index < total {
            let head = &source[index];
            index += 1;

            if !head.is_message() {
                debug!(id = head.id, kind = %head.msg_type, "skipping service record");
                output.skipped += 1;
                self.report(index, total);
                continue;
            }

            let mut canonical = self.parse_message(head);
            self.report(index, total);

            while let Some(next) = source.get(index) {
                if !self.absorb(head, next, &mut canonical) {
                    break;
                }
                output.aliases.insert(next.id, canonical.message_id);
                index += 1;
                self.report(index, total);
            }

            output.messages.push(canonical);
        }

        debug!(
            source = total,
            stitched = output.messages.len(),
            absorbed = output.aliases.len(),
            "stitching finished"
        );
        output
    }

    /// Builds the canonical form of one record, dispatching its media.
    pub fn parse_message(&self, message: &SourceMessage) -> ParsedMessage {
        let mut parsed = ParsedMessage::new(message.id, message.date.clone());
        parsed.author_id = message
            .from_id
            .as_deref()
            .and_then(|id| self.authors.compact_id(id))
            .map(str::to_string);
        parsed.content.text = message.rendered_text();

        let (outcome, media) = self.dispatcher.process(message, self.cache);
        if outcome != DispatchOutcome::NoMedia {
            debug!(id = message.id, ?outcome, "media dispatched");
        }
        parsed.content.media = media;

        parsed.reply_to_message_id = message.reply_to_message_id;
        parsed.forwarded_from.clone_from(&message.forwarded_from);
        parsed.edited_time.clone_from(&message.edited);
        parsed.post_author.clone_from(&message.author);
        parsed.poll.clone_from(&message.poll);
        parsed.reactions = message
            .reactions
            .as_deref()
            .map(|raw| normalize(raw, self.authors));
        parsed
    }

    /// Folds `next` into `canonical` if it continues the post started by `head`.
    fn absorb(
        &self,
        head: &SourceMessage,
        next: &SourceMessage,
        canonical: &mut ParsedMessage,
    ) -> bool {
        if !continues_post(head, next) || !canonical.has_text() {
            return false;
        }
        let next_text = next.rendered_text();
        if next_text.is_empty() {
            return false;
        }

        canonical.content.text.push_str(ABSORB_SEPARATOR);
        canonical.content.text.push_str(&next_text);

        if canonical.content.media.is_none() {
            let (_, media) = self.dispatcher.process(next, self.cache);
            canonical.content.media = media;
        }

        if let Some(incoming) = next.reactions.as_deref() {
            merge_into(
                canonical.reactions.get_or_insert_with(Vec::new),
                incoming,
                self.authors,
            );
        }

        debug!(absorbed = next.id, into = canonical.message_id, "record absorbed");
        true
    }

    fn report(&self, processed: usize, total: usize) {
        (self.progress)(Progress::new(Stage::Stitching, processed).with_total(total));
    }
}

/// Same author, same second, same forward origin, and `next` is a message.
fn continues_post(head: &SourceMessage, next: &SourceMessage) -> bool {
    next.is_message()
        && next.from_id == head.from_id
        && next.date_unixtime == head.date_unixtime
        && next.forwarded_from == head.forwarded_from
}
