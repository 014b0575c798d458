//! Compact author ids.
//!
//! Every distinct `from_id` in the export gets a short id (`U1`, `U2`, ...) in
//! first-seen order. Records without a `from_id` get none.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::parsing::SourceMessage;

/// Author details behind a compact id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorEntry {
    /// Display name at first sighting.
    pub name: Option<String>,
    /// Telegram identity (`user123`, `channel456`).
    #[serde(rename = "id")]
    pub original_id: String,
}

/// Mapping from compact id to author, in allocation order.
///
/// Serializes as a JSON object keyed by compact id, `U1` first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorMap {
    entries: Vec<(String, AuthorEntry)>,
    by_original: HashMap<String, usize>,
}

impl AuthorMap {
    /// Builds the map from every record of an export, whatever its type.
    pub fn build(messages: &[SourceMessage]) -> Self {
        let mut map = Self::default();
        for message in messages {
            if let Some(from_id) = message.from_id.as_deref() {
                map.register(from_id, message.from.as_deref());
            }
        }
        map
    }

    /// Returns the compact id for `original_id`, allocating one on first sight.
    pub fn register(&mut self, original_id: &str, name: Option<&str>) -> &str {
        let index = match self.by_original.get(original_id) {
            Some(&index) => index,
            None => {
                let index = self.entries.len();
                self.entries.push((
                    format!("U{}", index + 1),
                    AuthorEntry {
                        name: name.map(str::to_string),
                        original_id: original_id.to_string(),
                    },
                ));
                self.by_original.insert(original_id.to_string(), index);
                index
            }
        };
        &self.entries[index].0
    }

    /// Looks up the compact id of a Telegram identity.
    pub fn compact_id(&self, original_id: &str) -> Option<&str> {
        self.by_original
            .get(original_id)
            .map(|&index| self.entries[index].0.as_str())
    }

    /// Looks up an author by compact id.
    pub fn get(&self, compact_id: &str) -> Option<&AuthorEntry> {
        self.entries
            .iter()
            .find(|(id, _)| id == compact_id)
            .map(|(_, entry)| entry)
    }

    /// Iterates `(compact_id, entry)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AuthorEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AuthorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, entry) in &self.entries {
            map.serialize_entry(id, entry)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(from: Option<&str>, from_id: Option<&str>) -> SourceMessage {
        SourceMessage {
            msg_type: "message".into(),
            from: from.map(String::from),
            from_id: from_id.map(String::from),
            ..SourceMessage::default()
        }
    }

    #[test]
    fn test_first_seen_order() {
        let map = AuthorMap::build(&[
            record(Some("Bob"), Some("user2")),
            record(Some("Alice"), Some("user1")),
            record(Some("Bob"), Some("user2")),
        ]);

        assert_eq!(map.len(), 2);
        assert_eq!(map.compact_id("user2"), Some("U1"));
        assert_eq!(map.compact_id("user1"), Some("U2"));
        assert_eq!(map.get("U2").unwrap().name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_null_from_id_never_allocates() {
        let map = AuthorMap::build(&[
            record(Some("Ghost"), None),
            record(Some("Alice"), Some("user1")),
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.compact_id("user1"), Some("U1"));
    }

    #[test]
    fn test_name_from_first_sighting() {
        let map = AuthorMap::build(&[
            record(Some("Old Name"), Some("user1")),
            record(Some("New Name"), Some("user1")),
        ]);
        assert_eq!(map.get("U1").unwrap().name.as_deref(), Some("Old Name"));
    }

    #[test]
    fn test_serializes_in_allocation_order() {
        let mut map = AuthorMap::default();
        for i in 0..11 {
            map.register(&format!("user{i}"), Some("x"));
        }
        let json = serde_json::to_string(&map).unwrap();
        let u2 = json.find("\"U2\"").unwrap();
        let u10 = json.find("\"U10\"").unwrap();
        assert!(u2 < u10);
        assert!(json.starts_with(r#"{"U1":{"name":"x","id":"user0"}"#));
    }
}
