//! Reply alias rewrite.
//!
//! After stitching, a reply may still point at a record that was absorbed into
//! another message. This pass redirects such replies to the canonical id.

use tracing::debug;

use super::stitcher::IdAliasMap;
use crate::message::ParsedMessage;
use crate::progress::{Progress, ProgressCallback, Stage, no_progress};

/// Rewrites replies that point at absorbed ids. Returns how many were changed.
///
/// Running it twice changes nothing the second time: alias targets are always
/// canonical ids, which are never aliased themselves.
pub fn rewrite_replies(messages: &mut [ParsedMessage], aliases: &IdAliasMap) -> usize {
    rewrite_replies_with_progress(messages, aliases, &no_progress())
}

/// Same as [`rewrite_replies`], reporting once per message.
pub fn rewrite_replies_with_progress(
    messages: &mut [ParsedMessage],
    aliases: &IdAliasMap,
    progress: &ProgressCallback,
) -> usize {
    let total = messages.len();
    let mut rewritten = 0;

    for (index, message) in messages.iter_mut().enumerate() {
        if let Some(target) = message
            .reply_to_message_id
            .and_then(|reply| aliases.get(reply))
        {
            debug!(
                id = message.message_id,
                from = ?message.reply_to_message_id,
                to = target,
                "reply redirected"
            );
            message.reply_to_message_id = Some(target);
            rewritten += 1;
        }
        progress(Progress::new(Stage::Replies, index + 1).with_total(total));
    }

    rewritten
}
