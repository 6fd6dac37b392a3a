// crates/locator-core/src/recents.rs
//! # Recents Store
//!
//! Bounded, deduplicated, most-recent-first list of past search queries.
//!
//! The in-memory list is authoritative. Every mutation is written through to
//! a [`RecentsBackend`]; backend failures are logged and otherwise ignored,
//! so durability is best effort.

use crate::error::Result;
use crate::text::fold_key;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unix timestamp in milliseconds.
pub type Timestamp = i64;

/// Default bound on retained entries.
pub const DEFAULT_MAX_RECENTS: usize = 20;

/// One remembered query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub query: String,
    pub last_used_at: Timestamp,
}

/// Persistent storage for the recents list.
///
/// Implementations receive the complete, already ordered list on every
/// save; the storage format is theirs to choose. Saves triggered by the
/// debounce timer run on tokio's blocking pool; saves from explicit commands
/// run on the caller's thread.
pub trait RecentsBackend: Send + Sync {
    fn load(&self) -> Result<Vec<RecentEntry>>;
    fn save(&self, entries: &[RecentEntry]) -> Result<()>;
}

/// Backend that keeps the list in process memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<Vec<RecentEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<RecentEntry>) -> Self {
        MemoryBackend {
            entries: Mutex::new(entries),
        }
    }

    /// What was last saved.
    pub fn snapshot(&self) -> Vec<RecentEntry> {
        self.entries.lock().clone()
    }
}

impl RecentsBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<RecentEntry>> {
        Ok(self.entries.lock().clone())
    }

    fn save(&self, entries: &[RecentEntry]) -> Result<()> {
        *self.entries.lock() = entries.to_vec();
        Ok(())
    }
}

pub struct RecentsStore {
    entries: Mutex<Vec<RecentEntry>>,
    backend: Arc<dyn RecentsBackend>,
    max_entries: usize,
}

impl std::fmt::Debug for RecentsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentsStore")
            .field("entries", &*self.entries.lock())
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}

impl RecentsStore {
    /// Loads the persisted list. A failing backend yields an empty store.
    ///
    /// Loaded data is re-normalized: sorted newest first, deduplicated and
    /// truncated to `max_entries` (a bound of 0 is treated as 1).
    pub fn open(backend: Arc<dyn RecentsBackend>, max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        let mut entries = match backend.load() {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load recent searches; starting empty");
                Vec::new()
            }
        };

        entries.retain(|e| !e.query.trim().is_empty());
        entries.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        let mut seen = std::collections::HashSet::new();
        entries.retain(|e| seen.insert(fold_key(e.query.trim())));
        entries.truncate(max_entries);

        RecentsStore {
            entries: Mutex::new(entries),
            backend,
            max_entries,
        }
    }

    /// Store backed by a fresh [`MemoryBackend`].
    pub fn in_memory(max_entries: usize) -> Self {
        Self::open(Arc::new(MemoryBackend::new()), max_entries)
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Inserts `query` at the front, or moves an existing entry with the
    /// same normalized text there. Returns `false` for blank queries.
    pub fn commit(&self, query: &str) -> bool {
        self.commit_at(query, now_millis())
    }

    /// [`commit`](Self::commit) with an explicit clock reading.
    ///
    /// Timestamps stay strictly decreasing along the list: a commit not
    /// newer than the current head is stamped `head + 1`. Once stamps reach
    /// `Timestamp::MAX`, older entries are pushed down instead.
    pub fn commit_at(&self, query: &str, now: Timestamp) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        let key = fold_key(query);

        let mut entries = self.entries.lock();
        entries.retain(|e| fold_key(e.query.trim()) != key);
        let stamp = match entries.first() {
            Some(head) if head.last_used_at >= now => head.last_used_at.saturating_add(1),
            _ => now,
        };
        entries.insert(
            0,
            RecentEntry {
                query: query.to_owned(),
                last_used_at: stamp,
            },
        );
        entries.truncate(self.max_entries);
        // only bites once stamps saturate at `Timestamp::MAX`
        for i in 1..entries.len() {
            let ceiling = entries[i - 1].last_used_at.saturating_sub(1);
            if entries[i].last_used_at > ceiling {
                entries[i].last_used_at = ceiling;
            }
        }
        tracing::debug!(query, total = entries.len(), "recent search committed");
        self.persist(&entries);
        true
    }

    /// Removes the entry matching `query` (normalized). Returns whether one existed.
    pub fn remove(&self, query: &str) -> bool {
        let key = fold_key(query.trim());
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|e| fold_key(e.query.trim()) != key);
        let removed = entries.len() != before;
        if removed {
            self.persist(&entries);
        }
        removed
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        self.persist(&entries);
    }

    /// Queries, most recent first.
    pub fn list(&self) -> Vec<String> {
        self.entries.lock().iter().map(|e| e.query.clone()).collect()
    }

    pub fn entries(&self) -> Vec<RecentEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn persist(&self, entries: &[RecentEntry]) {
        if let Err(err) = self.backend.save(entries) {
            tracing::warn!(error = %err, "failed to persist recent searches");
        }
    }
}

fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocatorError;
    use proptest::prelude::*;

    struct BrokenBackend;

    impl RecentsBackend for BrokenBackend {
        fn load(&self) -> Result<Vec<RecentEntry>> {
            Err(LocatorError::NotFound("recents".into()))
        }

        fn save(&self, _entries: &[RecentEntry]) -> Result<()> {
            Err(LocatorError::InvalidData("read-only".into()))
        }
    }

    #[test]
    fn repeat_commit_moves_to_front_without_duplicating() {
        let store = RecentsStore::in_memory(10);
        store.commit("aaa");
        store.commit("bbb");
        store.commit("aaa");
        assert_eq!(store.list(), vec!["aaa", "bbb"]);
    }

    #[test]
    fn normalized_duplicates_collapse_to_latest_spelling() {
        let store = RecentsStore::in_memory(10);
        store.commit("Zürich");
        store.commit("  zurich ");
        assert_eq!(store.list(), vec!["zurich"]);
    }

    #[test]
    fn blank_queries_are_ignored() {
        let store = RecentsStore::in_memory(10);
        assert!(!store.commit("   "));
        assert!(store.is_empty());
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let store = RecentsStore::in_memory(3);
        for q in ["a", "b", "c", "d"] {
            store.commit(q);
        }
        assert_eq!(store.list(), vec!["d", "c", "b"]);
    }

    #[test]
    fn remove_keeps_relative_order() {
        let store = RecentsStore::in_memory(10);
        for q in ["one", "two", "three", "four"] {
            store.commit(q);
        }
        assert!(store.remove("TWO"));
        assert!(!store.remove("missing"));
        assert_eq!(store.list(), vec!["four", "three", "one"]);
    }

    #[test]
    fn timestamps_strictly_decrease() {
        let store = RecentsStore::in_memory(10);
        store.commit_at("a", 1_000);
        store.commit_at("b", 1_000);
        store.commit_at("c", 900);
        let stamps: Vec<_> = store.entries().iter().map(|e| e.last_used_at).collect();
        assert_eq!(stamps, vec![1_002, 1_001, 1_000]);
    }

    #[test]
    fn saturated_timestamps_do_not_overflow() {
        let backend = Arc::new(MemoryBackend::with_entries(vec![RecentEntry {
            query: "old".into(),
            last_used_at: Timestamp::MAX,
        }]));
        let store = RecentsStore::open(backend, 10);
        assert!(store.commit("new"));
        assert!(store.commit("newer"));
        assert_eq!(store.list(), vec!["newer", "new", "old"]);
        let stamps: Vec<_> = store.entries().iter().map(|e| e.last_used_at).collect();
        assert_eq!(
            stamps,
            vec![Timestamp::MAX, Timestamp::MAX - 1, Timestamp::MAX - 2]
        );
    }

    #[test]
    fn writes_through_to_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let store = RecentsStore::open(backend.clone(), 10);
        store.commit("swiss");
        assert_eq!(backend.snapshot().len(), 1);
        store.clear();
        assert!(backend.snapshot().is_empty());
    }

    #[test]
    fn open_normalizes_loaded_entries() {
        let backend = Arc::new(MemoryBackend::with_entries(vec![
            RecentEntry { query: "old".into(), last_used_at: 1 },
            RecentEntry { query: "new".into(), last_used_at: 3 },
            RecentEntry { query: "NEW".into(), last_used_at: 2 },
            RecentEntry { query: " ".into(), last_used_at: 4 },
        ]));
        let store = RecentsStore::open(backend, 10);
        assert_eq!(store.list(), vec!["new", "old"]);
    }

    #[test]
    fn backend_failures_do_not_affect_the_session() {
        let store = RecentsStore::open(Arc::new(BrokenBackend), 10);
        store.commit("aaa");
        store.commit("bbb");
        assert_eq!(store.list(), vec!["bbb", "aaa"]);
    }

    proptest! {
        #[test]
        fn list_is_unique_bounded_and_newest_first(
            queries in prop::collection::vec("[a-c]{1,2}", 0..40),
            max in 1usize..8,
        ) {
            let store = RecentsStore::in_memory(max);
            for q in &queries {
                store.commit(q);
            }
            let list = store.list();
            prop_assert!(list.len() <= max);
            let unique: std::collections::HashSet<_> = list.iter().collect();
            prop_assert_eq!(unique.len(), list.len());
            if let Some(last) = queries.last() {
                prop_assert_eq!(&list[0], last);
            }
            let entries = store.entries();
            prop_assert!(entries.windows(2).all(|w| w[0].last_used_at > w[1].last_used_at));
        }
    }
}
