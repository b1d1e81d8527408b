use crate::repository::LinkRecord;
use crate::shortcode::ShortCode;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// The in-memory code → record mapping.
///
/// Entries keep insertion order, which is also the order they are serialized
/// in. Alongside the entries the table keeps two indexes: code → position,
/// and original URL → the first code (in insertion order) holding that URL.
/// Duplicate URLs are allowed; uniqueness is a policy of the shortening
/// service, not of the table.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    entries: Vec<(ShortCode, LinkRecord)>,
    positions: HashMap<ShortCode, usize>,
    by_url: HashMap<String, ShortCode>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
            by_url: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.positions.contains_key(code)
    }

    pub fn get(&self, code: &str) -> Option<&LinkRecord> {
        self.positions.get(code).map(|&pos| &self.entries[pos].1)
    }

    /// Mutable access to the click counter of a link.
    ///
    /// The URL and creation time are not reachable mutably so the URL index
    /// can never go stale.
    pub fn clicks_mut(&mut self, code: &str) -> Option<&mut u64> {
        let pos = *self.positions.get(code)?;
        Some(&mut self.entries[pos].1.clicks)
    }

    /// Returns the first code, in insertion order, whose record points at `url`.
    pub fn find_by_url(&self, url: &str) -> Option<&ShortCode> {
        self.by_url.get(url)
    }

    /// Inserts a record, returning the previous record stored under `code`.
    ///
    /// A new code is appended at the end. An existing code is replaced in
    /// place and keeps its position.
    pub fn insert(&mut self, code: ShortCode, record: LinkRecord) -> Option<LinkRecord> {
        match self.positions.get(&code).copied() {
            None => {
                self.by_url
                    .entry(record.original_url.clone())
                    .or_insert_with(|| code.clone());
                self.positions.insert(code.clone(), self.entries.len());
                self.entries.push((code, record));
                None
            }
            Some(pos) => {
                let previous = std::mem::replace(&mut self.entries[pos].1, record);
                let current_url = self.entries[pos].1.original_url.clone();
                if previous.original_url != current_url {
                    self.reindex_url(&previous.original_url);
                    self.reindex_url(&current_url);
                }
                Some(previous)
            }
        }
    }

    /// Iterates over all links in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ShortCode, &LinkRecord)> {
        self.entries.iter().map(|(code, record)| (code, record))
    }

    fn reindex_url(&mut self, url: &str) {
        match self
            .entries
            .iter()
            .find(|(_, record)| record.original_url == url)
        {
            Some((code, _)) => {
                self.by_url.insert(url.to_string(), code.clone());
            }
            None => {
                self.by_url.remove(url);
            }
        }
    }
}

impl PartialEq for LinkTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for LinkTable {}

impl FromIterator<(ShortCode, LinkRecord)> for LinkTable {
    fn from_iter<I: IntoIterator<Item = (ShortCode, LinkRecord)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut table = Self::with_capacity(iter.size_hint().0);
        for (code, record) in iter {
            table.insert(code, record);
        }
        table
    }
}

impl Serialize for LinkTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, record) in &self.entries {
            map.serialize_entry(code, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LinkTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = LinkTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of short codes to link records")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut table = LinkTable::with_capacity(access.size_hint().unwrap_or(0));
                // Keys come from our own file, so they are not re-validated.
                // A repeated key keeps its first position and its last value.
                while let Some((code, record)) = access.next_entry::<ShortCode, LinkRecord>()? {
                    table.insert(code, record);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn record(url: &str) -> LinkRecord {
        LinkRecord::new(url, Timestamp::from_second(1_700_000_000).unwrap())
    }

    #[test]
    fn insert_and_get() {
        let mut table = LinkTable::new();
        assert!(table.insert(code("abc123"), record("https://example.com")).is_none());

        assert_eq!(table.len(), 1);
        assert!(table.contains("abc123"));
        assert_eq!(
            table.get("abc123").unwrap().original_url,
            "https://example.com"
        );
        assert!(table.get("nope").is_none());
    }

    #[test]
    fn keeps_insertion_order() {
        let table: LinkTable = ["zzz", "aaa", "mmm"]
            .into_iter()
            .map(|c| (code(c), record(&format!("https://{c}.com"))))
            .collect();

        let codes: Vec<&str> = table.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(codes, ["zzz", "aaa", "mmm"]);
    }

    #[test]
    fn find_by_url_returns_first_holder() {
        let mut table = LinkTable::new();
        table.insert(code("first"), record("https://dup.com"));
        table.insert(code("second"), record("https://dup.com"));

        assert_eq!(table.find_by_url("https://dup.com").unwrap().as_str(), "first");
        assert!(table.find_by_url("https://other.com").is_none());
    }

    #[test]
    fn replacing_a_record_keeps_position_and_fixes_url_index() {
        let mut table = LinkTable::new();
        table.insert(code("first"), record("https://dup.com"));
        table.insert(code("second"), record("https://dup.com"));

        let previous = table.insert(code("first"), record("https://moved.com"));
        assert_eq!(previous.unwrap().original_url, "https://dup.com");

        assert_eq!(table.iter().next().unwrap().0.as_str(), "first");
        assert_eq!(table.find_by_url("https://dup.com").unwrap().as_str(), "second");
        assert_eq!(table.find_by_url("https://moved.com").unwrap().as_str(), "first");

        // Moving "first" back makes it the first holder again.
        table.insert(code("first"), record("https://dup.com"));
        assert_eq!(table.find_by_url("https://dup.com").unwrap().as_str(), "first");
        assert!(table.find_by_url("https://moved.com").is_none());
    }

    #[test]
    fn clicks_mut_updates_counter_only() {
        let mut table = LinkTable::new();
        table.insert(code("abc123"), record("https://example.com"));

        *table.clicks_mut("abc123").unwrap() += 2;

        assert_eq!(table.get("abc123").unwrap().clicks, 2);
        assert!(table.clicks_mut("nope").is_none());
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let table: LinkTable = ["zzz", "aaa", "mmm"]
            .into_iter()
            .map(|c| (code(c), record(&format!("https://{c}.com"))))
            .collect();

        let json = serde_json::to_string(&table).unwrap();
        let back: LinkTable = serde_json::from_str(&json).unwrap();

        assert_eq!(back, table);
        let codes: Vec<&str> = back.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(codes, ["zzz", "aaa", "mmm"]);
        assert_eq!(back.find_by_url("https://aaa.com").unwrap().as_str(), "aaa");
    }

    #[test]
    fn reads_the_flat_json_layout() {
        let json = r#"{
            "Ab3xY9": {
                "original_url": "https://example.com",
                "clicks": 4,
                "created_at": "2024-05-01T12:00:00Z"
            }
        }"#;

        let table: LinkTable = serde_json::from_str(json).unwrap();
        let record = table.get("Ab3xY9").unwrap();

        assert_eq!(record.original_url, "https://example.com");
        assert_eq!(record.clicks, 4);
        assert_eq!(
            record.created_at,
            "2024-05-01T12:00:00Z".parse::<Timestamp>().unwrap()
        );
    }

    #[test]
    fn rejects_malformed_records() {
        assert!(serde_json::from_str::<LinkTable>("[]").is_err());
        assert!(serde_json::from_str::<LinkTable>(r#"{"a": {"clicks": 1}}"#).is_err());
        assert!(serde_json::from_str::<LinkTable>(
            r#"{"a": {"original_url": "https://x", "clicks": -1, "created_at": "2024-05-01T12:00:00Z"}}"#
        )
        .is_err());
        assert!(serde_json::from_str::<LinkTable>(
            r#"{"a": {"original_url": "https://x", "clicks": 0, "created_at": "N/A"}}"#
        )
        .is_err());
    }
}
