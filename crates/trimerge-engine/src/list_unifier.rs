//! List reconciliation via entity matching.
//!
//! Lists carry no stable element identity, so the three versions of a list
//! are first aligned into match groups by the path's configured comparator,
//! then assembled according to the path's unification operation. Matching is
//! injective per source list and first-match-wins in source order, so the
//! result is deterministic.

use serde_json::Value;
use tracing::debug;

use trimerge_match::Comparator;
use trimerge_types::Path;

use crate::config::{ListUnifyOp, MergeConfig};
use crate::dict_merger::merge_value;
use crate::recorder::ConflictRecorder;

/// Element indices judged to denote the same logical entity.
///
/// At most one index per source list; every source element belongs to
/// exactly one group (possibly alone).
#[derive(Clone, Copy, Debug, Default)]
struct MatchGroup {
    root: Option<usize>,
    head: Option<usize>,
    update: Option<usize>,
}

/// Reconcile the three versions of one list field.
///
/// Matched groups recurse through the dict merger with the path extended by
/// their output index; unmatched elements pass through unchanged. Entities a
/// membership policy drops produce no conflict, except under
/// [`ListUnifyOp::KeepUpdateConflictOnHeadDelete`].
pub(crate) fn unify_lists(
    root: &[Value],
    head: &[Value],
    update: &[Value],
    path: &Path,
    config: &MergeConfig,
    recorder: &mut ConflictRecorder,
) -> Vec<Value> {
    let policy_key = path.policy_key();
    let op = config.list_op(&policy_key);
    let comparator = config.comparator(&policy_key);

    let groups = build_groups(root, head, update, comparator);

    let mut head_ordered: Vec<&MatchGroup> =
        groups.iter().filter(|g| g.head.is_some()).collect();
    head_ordered.sort_by_key(|g| g.head);
    let mut update_ordered: Vec<&MatchGroup> =
        groups.iter().filter(|g| g.update.is_some()).collect();
    update_ordered.sort_by_key(|g| g.update);

    // Survivors in output order; the flag marks a head entity retained only
    // because update deleted it, which must be reported.
    let survivors: Vec<(&MatchGroup, bool)> = match op {
        ListUnifyOp::KeepOnlyHeadEntities => {
            head_ordered.into_iter().map(|g| (g, false)).collect()
        }
        ListUnifyOp::KeepOnlyUpdateEntities => {
            update_ordered.into_iter().map(|g| (g, false)).collect()
        }
        ListUnifyOp::KeepHeadAndUpdateHeadFirst => head_ordered
            .into_iter()
            .map(|g| (g, false))
            .chain(
                update_ordered
                    .into_iter()
                    .filter(|g| g.head.is_none())
                    .map(|g| (g, false)),
            )
            .collect(),
        ListUnifyOp::KeepHeadAndUpdateUpdateFirst => update_ordered
            .into_iter()
            .map(|g| (g, false))
            .chain(
                head_ordered
                    .into_iter()
                    .filter(|g| g.update.is_none())
                    .map(|g| (g, false)),
            )
            .collect(),
        ListUnifyOp::KeepUpdateConflictOnHeadDelete => update_ordered
            .into_iter()
            .map(|g| (g, false))
            .chain(
                head_ordered
                    .into_iter()
                    .filter(|g| g.update.is_none() && g.root.is_some())
                    .map(|g| (g, true)),
            )
            .collect(),
    };

    let mut merged_list = Vec::with_capacity(survivors.len());
    for (group, update_deleted) in survivors {
        let entity_path = path.child(merged_list.len());

        if update_deleted {
            // The curator kept this baseline entity and update dropped it:
            // retain the head version and surface the rejected deletion.
            recorder.record_remove(entity_path);
            if let Some(hi) = group.head {
                merged_list.push(head[hi].clone());
            }
            continue;
        }

        // An absent side counts as "unchanged from the group baseline".
        let r = group.root.map(|i| &root[i]);
        let h = group.head.map(|i| &head[i]).or(r);
        let u = group.update.map(|i| &update[i]).or(r);
        if let Some(value) = merge_value(r, h, u, &entity_path, config, recorder) {
            merged_list.push(value);
        }
    }

    debug!(
        path = %path,
        %op,
        groups = groups.len(),
        merged = merged_list.len(),
        "unified list"
    );
    merged_list
}

/// Align the three source lists into match groups.
///
/// Head and update elements each match against the root baseline first;
/// groups sharing a root element union through it. Leftover head and update
/// elements then match against each other. First-match-wins in source order
/// keeps every element in at most one group.
fn build_groups(
    root: &[Value],
    head: &[Value],
    update: &[Value],
    comparator: &Comparator,
) -> Vec<MatchGroup> {
    let mut head_for_root: Vec<Option<usize>> = vec![None; root.len()];
    let mut update_for_root: Vec<Option<usize>> = vec![None; root.len()];
    let mut root_for_head: Vec<Option<usize>> = vec![None; head.len()];
    let mut root_for_update: Vec<Option<usize>> = vec![None; update.len()];

    for (hi, element) in head.iter().enumerate() {
        for (ri, baseline) in root.iter().enumerate() {
            if head_for_root[ri].is_none() && comparator.matches(element, baseline) {
                head_for_root[ri] = Some(hi);
                root_for_head[hi] = Some(ri);
                break;
            }
        }
    }
    for (ui, element) in update.iter().enumerate() {
        for (ri, baseline) in root.iter().enumerate() {
            if update_for_root[ri].is_none() && comparator.matches(element, baseline) {
                update_for_root[ri] = Some(ui);
                root_for_update[ui] = Some(ri);
                break;
            }
        }
    }

    // Pair the leftovers directly: entities added on both sides.
    let mut update_for_head: Vec<Option<usize>> = vec![None; head.len()];
    let mut head_for_update: Vec<Option<usize>> = vec![None; update.len()];
    for (hi, element) in head.iter().enumerate() {
        if root_for_head[hi].is_some() {
            continue;
        }
        for (ui, candidate) in update.iter().enumerate() {
            if root_for_update[ui].is_some() || head_for_update[ui].is_some() {
                continue;
            }
            if comparator.matches(element, candidate) {
                update_for_head[hi] = Some(ui);
                head_for_update[ui] = Some(hi);
                break;
            }
        }
    }

    let mut groups = Vec::new();
    for ri in 0..root.len() {
        groups.push(MatchGroup {
            root: Some(ri),
            head: head_for_root[ri],
            update: update_for_root[ri],
        });
    }
    for hi in 0..head.len() {
        if root_for_head[hi].is_none() {
            groups.push(MatchGroup {
                root: None,
                head: Some(hi),
                update: update_for_head[hi],
            });
        }
    }
    for ui in 0..update.len() {
        if root_for_update[ui].is_none() && head_for_update[ui].is_none() {
            groups.push(MatchGroup {
                root: None,
                head: None,
                update: Some(ui),
            });
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trimerge_types::ConflictKind;

    fn unify(
        root: Value,
        head: Value,
        update: Value,
        op: ListUnifyOp,
    ) -> (Vec<Value>, Vec<trimerge_types::Conflict>) {
        let config = MergeConfig::new(crate::config::FieldFallback::KeepHead, op)
            .with_comparator("keywords", Comparator::by_key("value"));
        let mut recorder = ConflictRecorder::new();
        let path = Path::root().child("keywords");
        let merged = unify_lists(
            root.as_array().unwrap(),
            head.as_array().unwrap(),
            update.as_array().unwrap(),
            &path,
            &config,
            &mut recorder,
        );
        (merged, recorder.into_conflicts())
    }

    #[test]
    fn head_first_appends_update_additions() {
        let (merged, conflicts) = unify(
            json!([{"value": "colliding beams"}]),
            json!([{"value": "colliding super beams"}, {"value": "scattering"}]),
            json!([{"value": "mass: lower limit"}]),
            ListUnifyOp::KeepHeadAndUpdateHeadFirst,
        );
        assert_eq!(
            merged,
            vec![
                json!({"value": "colliding super beams"}),
                json!({"value": "scattering"}),
                json!({"value": "mass: lower limit"}),
            ]
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn update_first_prepends_update_entities() {
        let (merged, conflicts) = unify(
            json!([{"value": "colliding beams"}]),
            json!([{"value": "colliding super beams"}, {"value": "scattering"}]),
            json!([{"value": "mass: lower limit"}]),
            ListUnifyOp::KeepHeadAndUpdateUpdateFirst,
        );
        assert_eq!(
            merged,
            vec![
                json!({"value": "mass: lower limit"}),
                json!({"value": "colliding super beams"}),
                json!({"value": "scattering"}),
            ]
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn keep_only_head_drops_update_additions_silently() {
        let (merged, conflicts) = unify(
            json!([{"value": "bar"}]),
            json!([{"value": "bar"}, {"value": "foo"}]),
            json!([{"value": "baz"}, {"value": "spam"}]),
            ListUnifyOp::KeepOnlyHeadEntities,
        );
        assert_eq!(merged, vec![json!({"value": "bar"}), json!({"value": "foo"})]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn keep_only_update_drops_head_entities_silently() {
        let (merged, conflicts) = unify(
            json!([{"value": "bar"}]),
            json!([{"value": "bar"}, {"value": "foo"}]),
            json!([{"value": "baz"}]),
            ListUnifyOp::KeepOnlyUpdateEntities,
        );
        assert_eq!(merged, vec![json!({"value": "baz"})]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn union_ops_keep_entities_deleted_by_one_side() {
        // Update dropped an entity the head still carries: union membership
        // retains it, silently.
        let (merged, conflicts) = unify(
            json!([{"value": "kept"}, {"value": "dropped by update"}]),
            json!([{"value": "kept"}, {"value": "dropped by update"}]),
            json!([{"value": "kept"}]),
            ListUnifyOp::KeepHeadAndUpdateHeadFirst,
        );
        assert_eq!(
            merged,
            vec![json!({"value": "kept"}), json!({"value": "dropped by update"})]
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn matched_entities_merge_recursively() {
        let (merged, conflicts) = unify(
            json!([{"value": "qcd"}]),
            json!([{"value": "qcd", "source": "curator"}]),
            json!([{"value": "qcd", "schema": "INSPIRE"}]),
            ListUnifyOp::KeepHeadAndUpdateHeadFirst,
        );
        assert_eq!(
            merged,
            vec![json!({"value": "qcd", "source": "curator", "schema": "INSPIRE"})]
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn inner_conflicts_carry_output_indices() {
        let (merged, conflicts) = unify(
            json!([{"value": "qcd", "source": "arxiv"}]),
            json!([{"value": "qcd", "source": "curator"}]),
            json!([{"value": "qcd", "source": "publisher"}]),
            ListUnifyOp::KeepHeadAndUpdateHeadFirst,
        );
        assert_eq!(merged, vec![json!({"value": "qcd", "source": "curator"})]);
        assert_eq!(
            serde_json::to_value(&conflicts).unwrap(),
            json!([["SET_FIELD", ["keywords", 0, "source"], "publisher"]])
        );
    }

    #[test]
    fn conflict_on_head_delete_retains_and_reports() {
        let (merged, conflicts) = unify(
            json!([{"value": "kept"}, {"value": "dropped"}]),
            json!([{"value": "kept"}, {"value": "dropped"}]),
            json!([{"value": "kept"}]),
            ListUnifyOp::KeepUpdateConflictOnHeadDelete,
        );
        assert_eq!(
            merged,
            vec![json!({"value": "kept"}), json!({"value": "dropped"})]
        );
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::RemoveField);
        assert_eq!(
            serde_json::to_value(&conflicts[0].path).unwrap(),
            json!(["keywords", 1])
        );
    }

    #[test]
    fn conflict_on_head_delete_drops_new_head_entities_silently() {
        // "added by curator" has no baseline, so it is dropped like under
        // keep-only-update, without a conflict.
        let (merged, conflicts) = unify(
            json!([{"value": "kept"}]),
            json!([{"value": "kept"}, {"value": "added by curator"}]),
            json!([{"value": "kept"}]),
            ListUnifyOp::KeepUpdateConflictOnHeadDelete,
        );
        assert_eq!(merged, vec![json!({"value": "kept"})]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn both_sides_adding_the_same_entity_union_once() {
        let (merged, conflicts) = unify(
            json!([]),
            json!([{"value": "new", "source": "curator"}]),
            json!([{"value": "new", "schema": "x"}]),
            ListUnifyOp::KeepHeadAndUpdateHeadFirst,
        );
        assert_eq!(
            merged,
            vec![json!({"value": "new", "source": "curator", "schema": "x"})]
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn scalar_lists_unify_by_equality() {
        let config = MergeConfig::default();
        let mut recorder = ConflictRecorder::new();
        let path = Path::root().child("texkeys");
        let merged = unify_lists(
            &[json!("A:2016")],
            &[json!("A:2016"), json!("B:2017")],
            &[json!("A:2016")],
            &path,
            &config,
            &mut recorder,
        );
        assert_eq!(merged, vec![json!("A:2016"), json!("B:2017")]);
        assert!(recorder.is_empty());
    }

    #[test]
    fn duplicate_elements_match_injectively() {
        // Two identical root entries host one head entry each.
        let config = MergeConfig::default();
        let mut recorder = ConflictRecorder::new();
        let path = Path::root().child("notes");
        let merged = unify_lists(
            &[json!("x"), json!("x")],
            &[json!("x"), json!("x")],
            &[json!("x")],
            &path,
            &config,
            &mut recorder,
        );
        assert_eq!(merged, vec![json!("x"), json!("x")]);
        assert!(recorder.is_empty());
    }
}
