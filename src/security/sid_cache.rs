//! Process-wide SID-to-account-name cache (spec.md section 3 "SidCache",
//! section 4.2 "translate_sid").
//!
//! Grounded on the teacher's `inode_cache: DashSet<(u64, u64)>`
//! (`walk/finder.rs`): same lock-free concurrent-map shape, keyed on the
//! SID's string form rather than a raw pointer, per spec.md section 9's
//! explicit warning against pointer-keyed caches.

use dashmap::DashMap;

/// Add-only, thread-safe cache from a SID's canonical string form to its
/// resolved account name. A failed lookup memoizes the SID string as its own
/// "name" so repeated failures are O(1) (spec.md section 3).
#[derive(Debug, Default)]
pub struct SidCache {
    entries: DashMap<String, String>,
}

impl SidCache {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    #[must_use]
    pub fn get(&self, sid: &str) -> Option<String> {
        self.entries.get(sid).map(|entry| entry.value().clone())
    }

    /// Records a resolution. Idempotent under concurrent races: whichever
    /// writer wins, subsequent readers see one consistent value for `sid`
    /// (spec.md section 5, "duplicate inserts idempotent").
    pub fn insert(&self, sid: String, name: String) {
        self.entries.entry(sid).or_insert(name);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
