//! Property-based tests for the stitcher and the reply rewrite.
//!
//! These tests generate random record runs to find edge cases.

use std::path::Path;

use proptest::prelude::*;

use chatstitch::core::{ABSORB_SEPARATOR, AuthorMap, Stitcher, rewrite_replies};
use chatstitch::media::{MarkingSwitch, MediaDispatcher, TranscriptionCache};
use chatstitch::parsing::{RawReaction, SourceMessage};

/// `(from_id, date_unixtime, forwarded_from, text, is_service, likes, reply_to)`
type Record = (Option<String>, String, Option<String>, String, bool, u64, Option<u64>);

/// Generate a record using fast strategies: few authors and timestamps so runs
/// actually occur.
fn arb_record() -> impl Strategy<Value = Record> {
    (
        prop::sample::select(vec![Some("user1".to_string()), Some("user2".to_string()), None]),
        prop::sample::select(vec!["100".to_string(), "101".to_string()]),
        prop::sample::select(vec![None, Some("News".to_string())]),
        prop::sample::select(vec![
            "Hello".to_string(),
            "Привет мир".to_string(),
            "🎉🔥 emoji".to_string(),
            "line\nbreak".to_string(),
            String::new(),
        ]),
        // service record
        prop::bool::weighted(0.1),
        0u64..4,
        prop::option::of(0u64..40),
    )
}

fn build(records: Vec<Record>) -> Vec<SourceMessage> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, (from_id, unix, forwarded, text, service, likes, reply))| SourceMessage {
            id: i as u64 + 1,
            msg_type: if service { "service" } else { "message" }.to_string(),
            date: "2024-01-15T10:30:00".to_string(),
            date_unixtime: Some(unix),
            from_id,
            forwarded_from: forwarded,
            text: Some(serde_json::Value::String(text)),
            reply_to_message_id: reply,
            reactions: (likes > 0).then(|| {
                vec![RawReaction {
                    kind: "emoji".to_string(),
                    count: likes,
                    emoji: Some("👍".to_string()),
                    ..RawReaction::default()
                }]
            }),
            ..SourceMessage::default()
        })
        .collect()
}

fn stitch(source: &[SourceMessage]) -> chatstitch::core::StitchOutput {
    let authors = AuthorMap::build(source);
    let switch = MarkingSwitch::new(false);
    let dispatcher = MediaDispatcher::new(Path::new("."), Path::new("."), &switch);
    let cache = TranscriptionCache::new();
    Stitcher::new(&authors, &dispatcher, &cache).stitch(source)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every message record is either emitted or absorbed, never both.
    #[test]
    fn prop_records_partitioned(records in prop::collection::vec(arb_record(), 0..60)) {
        let source = build(records);
        let output = stitch(&source);

        let message_records = source.iter().filter(|m| m.is_message()).count();
        prop_assert_eq!(output.messages.len() + output.aliases.len(), message_records);
        prop_assert_eq!(output.skipped, source.len() - message_records);

        for message in &output.messages {
            prop_assert!(!output.aliases.contains(message.message_id));
        }
    }

    /// Alias targets are emitted ids, and point backwards.
    #[test]
    fn prop_aliases_target_emitted(records in prop::collection::vec(arb_record(), 0..60)) {
        let source = build(records);
        let output = stitch(&source);

        for (absorbed, canonical) in output.aliases.iter() {
            prop_assert!(output.messages.iter().any(|m| m.message_id == canonical));
            prop_assert!(canonical < absorbed);
        }
    }

    /// A canonical's text is its run members' texts joined by a blank line.
    #[test]
    fn prop_text_is_joined_run(records in prop::collection::vec(arb_record(), 0..60)) {
        let source = build(records);
        let output = stitch(&source);

        for message in &output.messages {
            let expected: Vec<String> = source
                .iter()
                .filter(|s| s.id == message.message_id || output.aliases.get(s.id) == Some(message.message_id))
                .map(SourceMessage::rendered_text)
                .collect();
            prop_assert_eq!(&message.content.text, &expected.join(ABSORB_SEPARATOR));
        }
    }

    /// Reaction counts survive stitching.
    #[test]
    fn prop_reaction_counts_preserved(records in prop::collection::vec(arb_record(), 0..60)) {
        let source = build(records);
        let output = stitch(&source);

        let input: u64 = source
            .iter()
            .filter(|m| m.is_message())
            .flat_map(|m| m.reactions.iter().flatten())
            .map(|r| r.count)
            .sum();
        let emitted: u64 = output
            .messages
            .iter()
            .flat_map(|m| m.reactions.iter().flatten())
            .map(|r| r.count)
            .sum();
        prop_assert_eq!(input, emitted);

        for message in &output.messages {
            if let Some(reactions) = &message.reactions {
                prop_assert!(reactions.len() <= 1, "same-shape reactions must merge");
            }
        }
    }

    /// The reply rewrite is idempotent and leaves no reply on an absorbed id.
    #[test]
    fn prop_reply_rewrite_idempotent(records in prop::collection::vec(arb_record(), 0..60)) {
        let source = build(records);
        let mut output = stitch(&source);

        rewrite_replies(&mut output.messages, &output.aliases);
        let once = output.messages.clone();
        prop_assert_eq!(rewrite_replies(&mut output.messages, &output.aliases), 0);
        prop_assert_eq!(&once, &output.messages);

        for message in &output.messages {
            if let Some(reply) = message.reply_to_message_id {
                prop_assert!(!output.aliases.contains(reply));
            }
        }
    }
}
