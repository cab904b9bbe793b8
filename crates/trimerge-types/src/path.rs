//! Paths into record trees.
//!
//! A [`Path`] is an ordered sequence of [`Segment`]s, each either an object
//! field name or a zero-based list index. Paths label conflicts and scope
//! per-field policy lookups.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step into a tree: an object field or a list index.
///
/// Segments serialize untagged, so a path renders as a plain JSON array like
/// `["titles", 0, "title"]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    /// An object field name.
    Field(String),
    /// A zero-based list index.
    Index(usize),
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{}", name),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

/// An ordered sequence of segments addressing one location in a tree.
///
/// Paths are immutable: [`child`] returns a new path rather than mutating
/// the receiver, so the merge walk can hand the same parent path to every
/// sibling.
///
/// [`child`]: Path::child
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path(Vec<Segment>);

impl Path {
    /// The empty path addressing the whole tree.
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// The segments of this path, outermost first.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Returns `true` if this is the empty (whole-tree) path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The canonical policy-lookup key: field names joined with `.`, list
    /// indices collapsed away.
    ///
    /// `authors.0.full_name` and `authors.3.full_name` both resolve to
    /// `authors.full_name`, so policy tables stay index-independent.
    pub fn policy_key(&self) -> String {
        let mut key = String::new();
        for segment in &self.0 {
            if let Segment::Field(name) = segment {
                if !key.is_empty() {
                    key.push('.');
                }
                key.push_str(name);
            }
        }
        key
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
