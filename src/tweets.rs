use std::collections::HashMap;
use tracing::{debug, warn};

use crate::storage::{Slot, SlotStore};
use crate::types::AssociationRecord;

/// Append-only log of generated tweets keyed by item URL.
///
/// Later records shadow earlier ones with the same key. The full log is written
/// back to storage on every append.
pub struct TweetLog {
    records: Vec<AssociationRecord>,
    latest: HashMap<String, usize>,
    store: SlotStore,
}

impl TweetLog {
    /// Load the persisted log. Absent or malformed data yields an empty log.
    pub fn load(store: SlotStore) -> Self {
        let records: Vec<AssociationRecord> = store.load(Slot::Tweets).unwrap_or_default();
        debug!(records = records.len(), "Loaded tweet log");
        Self::from_records(records, store)
    }

    fn from_records(records: Vec<AssociationRecord>, store: SlotStore) -> Self {
        let mut latest = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            latest.insert(record.key.clone(), index);
        }
        Self {
            records,
            latest,
            store,
        }
    }

    /// Append a record and rewrite the persisted log.
    ///
    /// A failed write is logged; the in-memory log keeps the record.
    pub fn append(&mut self, key: impl Into<String>, text: impl Into<String>) {
        let record = AssociationRecord {
            key: key.into(),
            text: text.into(),
        };
        self.latest.insert(record.key.clone(), self.records.len());
        self.records.push(record);

        if let Err(e) = self.store.save(Slot::Tweets, &self.records) {
            warn!(error = %e, "Failed to persist tweet log");
        }
    }

    /// Text of the most recently appended record for `key`.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.latest
            .get(key)
            .map(|&index| self.records[index].text.as_str())
    }

    /// All records in append order, shadowed ones included.
    pub fn records(&self) -> &[AssociationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_resolve_returns_latest_for_key() {
        let mut log = TweetLog::load(SlotStore::in_memory());
        log.append("u1", "first");
        log.append("u2", "other");
        log.append("u1", "second");
        log.append("u3", "another");

        assert_eq!(log.resolve("u1"), Some("second"));
        assert_eq!(log.resolve("u2"), Some("other"));
        assert_eq!(log.resolve("missing"), None);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_resolve_does_not_reorder_log() {
        let mut log = TweetLog::load(SlotStore::in_memory());
        log.append("u1", "a");
        log.append("u2", "b");
        log.append("u1", "c");
        let before = log.records().to_vec();

        let first = log.resolve("u1").map(str::to_string);
        let second = log.resolve("u1").map(str::to_string);

        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("c"));
        assert_eq!(log.records(), before.as_slice());
    }

    #[test]
    fn test_append_is_not_idempotent() {
        let mut log = TweetLog::load(SlotStore::in_memory());
        log.append("u1", "same");
        log.append("u1", "same");
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_append_rewrites_persisted_array() {
        let store = SlotStore::in_memory();
        let mut log = TweetLog::load(store.clone());
        log.append("u1", "a");
        log.append("u1", "b");

        assert_eq!(
            store.raw(Slot::Tweets).unwrap().as_deref(),
            Some(r#"[{"url":"u1","tweet":"a"},{"url":"u1","tweet":"b"}]"#)
        );

        let reloaded = TweetLog::load(store);
        assert_eq!(reloaded.resolve("u1"), Some("b"));
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_load_treats_malformed_log_as_empty() {
        let store = SlotStore::new(Arc::new(
            MemoryStore::new().with_entry("tweets", "{\"not\": \"an array\"}"),
        ));
        let log = TweetLog::load(store);
        assert!(log.is_empty());
    }
}
