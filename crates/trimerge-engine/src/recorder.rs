//! Conflict accumulation for one merge invocation.

use serde_json::Value;
use trimerge_types::{Conflict, Path};

/// Accumulates conflicts in walk order.
///
/// Owned exclusively by a single merge call; conflicts are append-only and
/// ordered by first encounter (depth-first, field order, then output list
/// order). Recording a conflict never aborts the merge.
#[derive(Debug, Default)]
pub struct ConflictRecorder {
    conflicts: Vec<Conflict>,
}

impl ConflictRecorder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a discarded value at `path`.
    pub fn record_set(&mut self, path: Path, rejected: Value) {
        self.conflicts.push(Conflict::set_field(path, rejected));
    }

    /// Record a rejected deletion at `path`.
    pub fn record_remove(&mut self, path: Path) {
        self.conflicts.push(Conflict::remove_field(path));
    }

    /// Number of conflicts recorded so far.
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Returns `true` if no conflict has been recorded.
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Consume the recorder, yielding the ordered conflict list.
    pub fn into_conflicts(self) -> Vec<Conflict> {
        self.conflicts
    }
}
