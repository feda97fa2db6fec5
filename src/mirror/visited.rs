// src/mirror/visited.rs
// =============================================================================
// The visited ledger: every CanonicalPath that has been scheduled this run.
//
// insert() is a single atomic check-and-set, so when two workers discover the
// same path at the same moment only one of them gets `true` and fetches it.
// =============================================================================

use super::path::CanonicalPath;
use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct VisitedSet {
    paths: DashSet<CanonicalPath>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns true if the path was not present before (the caller now owns it)
    pub fn insert(&self, path: &CanonicalPath) -> bool {
        self.paths.insert(path.clone())
    }

    #[cfg(test)]
    pub fn contains(&self, path: &CanonicalPath) -> bool {
        self.paths.contains(path)
    }

    pub fn count(&self) -> usize {
        self.paths.len()
    }
}
