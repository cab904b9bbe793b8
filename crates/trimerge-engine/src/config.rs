//! Merge policy configuration.
//!
//! A [`MergeConfig`] is built once, up front, and passed into every merge
//! call; the engine holds no process-wide state. Per-path overrides are keyed
//! by the canonical policy key (list indices collapsed, see
//! [`Path::policy_key`]); paths without an entry fall back to the engine-wide
//! defaults, never to an error.
//!
//! [`Path::policy_key`]: trimerge_types::Path::policy_key

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use trimerge_match::Comparator;

use crate::error::ConfigError;

/// Tie-break rule when head and update both changed a field differently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FieldFallback {
    /// Prefer the curated version.
    #[default]
    KeepHead,
    /// Prefer the incoming version.
    KeepUpdate,
}

impl FieldFallback {
    /// The canonical configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeepHead => "FALLBACK_KEEP_HEAD",
            Self::KeepUpdate => "FALLBACK_KEEP_UPDATE",
        }
    }
}

impl fmt::Display for FieldFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldFallback {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FALLBACK_KEEP_HEAD" => Ok(Self::KeepHead),
            "FALLBACK_KEEP_UPDATE" => Ok(Self::KeepUpdate),
            other => Err(ConfigError::UnknownFieldFallback(other.to_string())),
        }
    }
}

/// Which list entities survive a merge, and in what order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ListUnifyOp {
    /// Entities present in head, in head order; update-only additions drop.
    KeepOnlyHeadEntities,
    /// Entities present in update, in update order; head-only entities drop.
    KeepOnlyUpdateEntities,
    /// Union: head entities in head order, then update-only additions.
    #[default]
    KeepHeadAndUpdateHeadFirst,
    /// Union: update entities in update order, then head-only entities.
    KeepHeadAndUpdateUpdateFirst,
    /// Like [`KeepOnlyUpdateEntities`], but a baseline entity the curator
    /// retained and update dropped is kept (head version) with a
    /// `REMOVE_FIELD` conflict at its output path.
    ///
    /// [`KeepOnlyUpdateEntities`]: ListUnifyOp::KeepOnlyUpdateEntities
    KeepUpdateConflictOnHeadDelete,
}

impl ListUnifyOp {
    /// The canonical configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeepOnlyHeadEntities => "KEEP_ONLY_HEAD_ENTITIES",
            Self::KeepOnlyUpdateEntities => "KEEP_ONLY_UPDATE_ENTITIES",
            Self::KeepHeadAndUpdateHeadFirst => "KEEP_UPDATE_AND_HEAD_ENTITIES_HEAD_FIRST",
            Self::KeepHeadAndUpdateUpdateFirst => "KEEP_UPDATE_AND_HEAD_ENTITIES_UPDATE_FIRST",
            Self::KeepUpdateConflictOnHeadDelete => {
                "KEEP_UPDATE_ENTITIES_CONFLICT_ON_HEAD_DELETE"
            }
        }
    }
}

impl fmt::Display for ListUnifyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListUnifyOp {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KEEP_ONLY_HEAD_ENTITIES" => Ok(Self::KeepOnlyHeadEntities),
            "KEEP_ONLY_UPDATE_ENTITIES" => Ok(Self::KeepOnlyUpdateEntities),
            "KEEP_UPDATE_AND_HEAD_ENTITIES_HEAD_FIRST" => Ok(Self::KeepHeadAndUpdateHeadFirst),
            "KEEP_UPDATE_AND_HEAD_ENTITIES_UPDATE_FIRST" => {
                Ok(Self::KeepHeadAndUpdateUpdateFirst)
            }
            "KEEP_UPDATE_ENTITIES_CONFLICT_ON_HEAD_DELETE" => {
                Ok(Self::KeepUpdateConflictOnHeadDelete)
            }
            other => Err(ConfigError::UnknownListOp(other.to_string())),
        }
    }
}

/// The full policy surface for one merge invocation.
///
/// Engine-wide defaults plus per-path overrides for field fallbacks, list
/// operations, and comparators. Lists without a configured comparator unify
/// by whole-value equality.
#[derive(Clone, Debug)]
pub struct MergeConfig {
    default_field_fallback: FieldFallback,
    default_list_op: ListUnifyOp,
    default_comparator: Comparator,
    field_fallbacks: HashMap<String, FieldFallback>,
    list_ops: HashMap<String, ListUnifyOp>,
    comparators: HashMap<String, Comparator>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            default_field_fallback: FieldFallback::default(),
            default_list_op: ListUnifyOp::default(),
            default_comparator: Comparator::Equality,
            field_fallbacks: HashMap::new(),
            list_ops: HashMap::new(),
            comparators: HashMap::new(),
        }
    }
}

impl MergeConfig {
    /// A configuration with the given engine-wide defaults and no overrides.
    pub fn new(default_field_fallback: FieldFallback, default_list_op: ListUnifyOp) -> Self {
        Self {
            default_field_fallback,
            default_list_op,
            ..Self::default()
        }
    }

    /// Override the field fallback for one canonical path.
    pub fn with_field_fallback(mut self, path: impl Into<String>, op: FieldFallback) -> Self {
        self.field_fallbacks.insert(path.into(), op);
        self
    }

    /// Override the list operation for one canonical path.
    pub fn with_list_op(mut self, path: impl Into<String>, op: ListUnifyOp) -> Self {
        self.list_ops.insert(path.into(), op);
        self
    }

    /// Register the comparator for one canonical list path.
    pub fn with_comparator(mut self, path: impl Into<String>, comparator: Comparator) -> Self {
        self.comparators.insert(path.into(), comparator);
        self
    }

    /// The field fallback in effect at `policy_key`.
    pub fn field_fallback(&self, policy_key: &str) -> FieldFallback {
        self.field_fallbacks
            .get(policy_key)
            .copied()
            .unwrap_or(self.default_field_fallback)
    }

    /// The list operation in effect at `policy_key`.
    pub fn list_op(&self, policy_key: &str) -> ListUnifyOp {
        self.list_ops
            .get(policy_key)
            .copied()
            .unwrap_or(self.default_list_op)
    }

    /// The comparator in effect at `policy_key`.
    pub fn comparator(&self, policy_key: &str) -> &Comparator {
        self.comparators
            .get(policy_key)
            .unwrap_or(&self.default_comparator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_names_round_trip() {
        for op in [FieldFallback::KeepHead, FieldFallback::KeepUpdate] {
            assert_eq!(op.as_str().parse::<FieldFallback>().unwrap(), op);
        }
        for op in [
            ListUnifyOp::KeepOnlyHeadEntities,
            ListUnifyOp::KeepOnlyUpdateEntities,
            ListUnifyOp::KeepHeadAndUpdateHeadFirst,
            ListUnifyOp::KeepHeadAndUpdateUpdateFirst,
            ListUnifyOp::KeepUpdateConflictOnHeadDelete,
        ] {
            assert_eq!(op.as_str().parse::<ListUnifyOp>().unwrap(), op);
        }
    }

    #[test]
    fn unknown_names_are_errors() {
        assert!(matches!(
            "KEEP_EVERYTHING".parse::<ListUnifyOp>(),
            Err(ConfigError::UnknownListOp(_))
        ));
        assert!(matches!(
            "".parse::<FieldFallback>(),
            Err(ConfigError::UnknownFieldFallback(_))
        ));
    }

    #[test]
    fn unconfigured_paths_fall_back_to_defaults() {
        let config = MergeConfig::new(
            FieldFallback::KeepUpdate,
            ListUnifyOp::KeepOnlyUpdateEntities,
        )
        .with_field_fallback("control_number", FieldFallback::KeepHead)
        .with_list_op("texkeys", ListUnifyOp::KeepOnlyHeadEntities);

        assert_eq!(
            config.field_fallback("control_number"),
            FieldFallback::KeepHead
        );
        assert_eq!(config.field_fallback("anything.else"), FieldFallback::KeepUpdate);
        assert_eq!(config.list_op("texkeys"), ListUnifyOp::KeepOnlyHeadEntities);
        assert_eq!(
            config.list_op("never.configured"),
            ListUnifyOp::KeepOnlyUpdateEntities
        );
        assert!(matches!(
            config.comparator("never.configured"),
            Comparator::Equality
        ));
    }
}
