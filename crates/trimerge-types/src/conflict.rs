//! Conflict records emitted by the merge engine.
//!
//! A conflict does not abort a merge. It records that one side's contribution
//! was discarded at a given path, for human or downstream-policy review.

use std::fmt;

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::path::Path;

/// What kind of divergence was recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    /// A value offered by the losing side was discarded.
    #[serde(rename = "SET_FIELD")]
    SetField,
    /// One side tried to delete a value the winning side retained.
    #[serde(rename = "REMOVE_FIELD")]
    RemoveField,
}

impl ConflictKind {
    /// The canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetField => "SET_FIELD",
            Self::RemoveField => "REMOVE_FIELD",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single divergence encountered during a merge.
///
/// Conflicts serialize as a 3-tuple so they can be consumed by external
/// review tooling:
///
/// ```text
/// ["SET_FIELD", ["titles", 0, "title"], "old title text"]
/// ```
///
/// `REMOVE_FIELD` conflicts carry `null` as their rejected value.
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    /// The kind of divergence.
    pub kind: ConflictKind,
    /// Where in the merged tree the divergence happened.
    pub path: Path,
    /// The value the losing side offered (`Null` for removals).
    pub rejected: Value,
}

impl Conflict {
    /// A discarded value at `path`.
    pub fn set_field(path: Path, rejected: Value) -> Self {
        Self {
            kind: ConflictKind::SetField,
            path,
            rejected,
        }
    }

    /// A rejected deletion at `path`.
    pub fn remove_field(path: Path) -> Self {
        Self {
            kind: ConflictKind::RemoveField,
            path,
            rejected: Value::Null,
        }
    }
}

impl Serialize for Conflict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.kind)?;
        tuple.serialize_element(&self.path)?;
        tuple.serialize_element(&self.rejected)?;
        tuple.end()
    }
}
