//! Work-queue task and duplicate-visitation guard (spec.md section 3).

use std::path::PathBuf;

use dashmap::DashSet;

/// One unit of pending work: a directory still to be opened, and its depth
/// relative to the walk root. Consumed exactly once by whichever worker
/// pops it (spec.md section 3, "`WalkTask`").
#[derive(Clone, Debug)]
pub struct WalkTask {
    pub path: PathBuf,
    pub depth: u32,
}

/// The set of directory paths already scheduled (spec.md section 3,
/// "`DedupSet`"). Grounded on the teacher's
/// `inode_cache: DashSet<(u64, u64)>` (`walk/finder.rs`), keyed on the path
/// itself rather than `(device, inode)` since reparse points aren't followed
/// here (spec.md section 9, "Open questions").
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: DashSet<PathBuf>,
}

impl DedupSet {
    #[must_use]
    pub fn new() -> Self {
        Self { seen: DashSet::new() }
    }

    /// Returns `true` the first time `path` is inserted, `false` on every
    /// later attempt — the at-most-once visitation guarantee.
    pub fn insert(&self, path: PathBuf) -> bool {
        self.seen.insert(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_insert_of_same_path_fails() {
        let seen = DedupSet::new();
        assert!(seen.insert(PathBuf::from(r"C:\a")));
        assert!(!seen.insert(PathBuf::from(r"C:\a")));
        assert!(seen.insert(PathBuf::from(r"C:\b")));
    }
}
