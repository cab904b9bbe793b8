//! Recursive object merging with per-field fallback policy.
//!
//! The walk is three-way at every level: each field's head and update values
//! are judged against the root baseline. One-sided changes win silently;
//! divergent changes go to the field's configured fallback and the loser is
//! recorded as a `SET_FIELD` conflict; a deletion racing a surviving value
//! always loses and is recorded as `REMOVE_FIELD`. Object values recurse; diverging
//! array values delegate to the list unifier.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::debug;

use trimerge_types::Path;

use crate::config::{FieldFallback, MergeConfig};
use crate::list_unifier::unify_lists;
use crate::recorder::ConflictRecorder;

/// Merge one location of the tree.
///
/// `None` means the corresponding version does not carry this location.
/// Returns the merged value, or `None` when the location is absent from the
/// merged output (deleted by both sides, or never present).
pub(crate) fn merge_value(
    root: Option<&Value>,
    head: Option<&Value>,
    update: Option<&Value>,
    path: &Path,
    config: &MergeConfig,
    recorder: &mut ConflictRecorder,
) -> Option<Value> {
    match (head, update) {
        // Nobody carries the field: deleted by both, or never present.
        (None, None) => None,

        // One side is missing the field. Without a baseline this is a pure
        // addition by the carrying side. With a baseline it is a deletion
        // racing a surviving value: the deletion loses, unconditionally.
        (Some(kept), None) | (None, Some(kept)) => {
            if root.is_some() {
                recorder.record_remove(path.clone());
            }
            Some(kept.clone())
        }

        (Some(head_value), Some(update_value)) => {
            if head_value == update_value {
                return Some(head_value.clone());
            }

            // Lists are governed by their unification operation whenever the
            // versions diverge at all, so membership policies (keep-only,
            // conflict-on-delete) apply even when one side left the list
            // untouched.
            if let (Some(head_items), Some(update_items)) =
                (head_value.as_array(), update_value.as_array())
            {
                let root_items = root.and_then(Value::as_array).map_or(&[][..], Vec::as_slice);
                return Some(Value::Array(unify_lists(
                    root_items,
                    head_items,
                    update_items,
                    path,
                    config,
                    recorder,
                )));
            }

            // An untouched side never contests the other side's edit.
            if let Some(root_value) = root {
                if head_value == root_value {
                    return Some(update_value.clone());
                }
                if update_value == root_value {
                    return Some(head_value.clone());
                }
            }

            // Both sides changed the value. Objects reconcile structurally;
            // anything else is a full-value conflict.
            if let (Some(head_obj), Some(update_obj)) =
                (head_value.as_object(), update_value.as_object())
            {
                let empty = Map::new();
                let root_obj = root.and_then(Value::as_object).unwrap_or(&empty);
                return Some(Value::Object(merge_objects(
                    root_obj, head_obj, update_obj, path, config, recorder,
                )));
            }

            let fallback = config.field_fallback(&path.policy_key());
            let (winner, loser) = match fallback {
                FieldFallback::KeepHead => (head_value, update_value),
                FieldFallback::KeepUpdate => (update_value, head_value),
            };
            debug!(path = %path, %fallback, "divergent field");
            recorder.record_set(path.clone(), loser.clone());
            Some(winner.clone())
        }
    }
}

/// Merge two object nodes field by field against the root baseline.
///
/// Fields are visited in lexicographic order (the underlying map is ordered),
/// so conflict emission is deterministic.
pub(crate) fn merge_objects(
    root: &Map<String, Value>,
    head: &Map<String, Value>,
    update: &Map<String, Value>,
    path: &Path,
    config: &MergeConfig,
    recorder: &mut ConflictRecorder,
) -> Map<String, Value> {
    let fields: BTreeSet<&String> = head.keys().chain(update.keys()).collect();

    let mut merged = Map::new();
    for field in fields {
        let field_path = path.child(field.as_str());
        if let Some(value) = merge_value(
            root.get(field),
            head.get(field),
            update.get(field),
            &field_path,
            config,
            recorder,
        ) {
            merged.insert(field.clone(), value);
        }
    }
    merged
}
