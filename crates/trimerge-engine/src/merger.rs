//! The merge entry point.

use serde::Serialize;
use serde_json::Value;

use trimerge_types::{Conflict, Path};

use crate::config::MergeConfig;
use crate::dict_merger::merge_value;
use crate::recorder::ConflictRecorder;

/// The outcome of one merge invocation.
///
/// Created fresh per call and immutable once returned. Serializes as
/// `{"merged": ..., "conflicts": [[kind, path, rejected], ...]}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergeResult {
    /// The reconciled tree.
    pub merged: Value,
    /// Every divergence the engine could not silently resolve, ordered by
    /// first encounter during the walk.
    pub conflicts: Vec<Conflict>,
}

impl MergeResult {
    /// Returns `true` if any conflict was recorded.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Merge the curated (`head`) and incoming (`update`) versions of a record
/// against their common ancestor (`root`).
///
/// A pure function of its inputs: no version is mutated, no state survives
/// the call, and concurrent callers need no coordination. The merge always
/// completes; conflicts are the sole error channel, and malformed comparator
/// configuration degrades to "never matches" rather than failing.
pub fn merge(root: &Value, head: &Value, update: &Value, config: &MergeConfig) -> MergeResult {
    let mut recorder = ConflictRecorder::new();
    let merged = merge_value(
        Some(root),
        Some(head),
        Some(update),
        &Path::root(),
        config,
        &mut recorder,
    )
    .unwrap_or(Value::Null);

    MergeResult {
        merged,
        conflicts: recorder.into_conflicts(),
    }
}
