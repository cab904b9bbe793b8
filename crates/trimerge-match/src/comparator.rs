//! The closed set of entity-matching strategies.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::distance::DistanceComparator;

/// Rewrites an extracted key value before comparison (e.g. lower-casing a
/// holder string). Returning `None` marks the entity as unusable for key
/// matching, so it never merges by accident.
pub type KeyNormalizer = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Decides whether two list elements denote the same logical entity.
///
/// The variants form a closed set; each is constructed from declarative
/// configuration rather than subclassing. `matches` never fails: on missing
/// or ambiguous data it returns `false`.
#[derive(Clone)]
pub enum Comparator {
    /// Deep value equality. The engine-wide default.
    Equality,
    /// Match on the first applicable key-field group.
    KeySet(KeySetComparator),
    /// Normalizer chain with a distance-function fallback.
    Distance(DistanceComparator),
}

impl Comparator {
    /// A key-set comparator over a single one-field group.
    pub fn by_key(field: impl Into<String>) -> Self {
        Self::KeySet(KeySetComparator::new([vec![field.into()]]))
    }

    /// A key-set comparator over ordered groups of key fields.
    pub fn by_keys<G, F, S>(groups: G) -> Self
    where
        G: IntoIterator<Item = F>,
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::KeySet(KeySetComparator::new(groups))
    }

    /// Returns `true` if `a` and `b` denote the same entity.
    pub fn matches(&self, a: &Value, b: &Value) -> bool {
        match self {
            Self::Equality => a == b,
            Self::KeySet(comparator) => comparator.matches(a, b),
            Self::Distance(comparator) => comparator.matches(a, b),
        }
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equality => write!(f, "Comparator::Equality"),
            Self::KeySet(c) => write!(f, "Comparator::KeySet({:?})", c.groups),
            Self::Distance(c) => write!(f, "Comparator::{:?}", c),
        }
    }
}

/// Follow a dotted field path (`record.$ref`) through nested objects.
pub(crate) fn lookup_path<'a>(entity: &'a Value, dotted: &str) -> Option<&'a Value> {
    let mut current = entity;
    for part in dotted.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

// ---------------------------------------------------------------------------
// KeySetComparator
// ---------------------------------------------------------------------------

/// Exact matching on ordered groups of key fields.
///
/// Groups are tried in declared order. The first group where both entities
/// have all fields present decides: equal values mean a match, unequal values
/// mean no match. A group with a missing field on either side is skipped, so
/// "match by DOI if both have one, else by ISBN" works without a missing DOI
/// counting as a mismatch.
#[derive(Clone)]
pub struct KeySetComparator {
    pub(crate) groups: Vec<Vec<String>>,
    key_normalizers: HashMap<String, KeyNormalizer>,
}

enum ExtractedKey {
    Present(Value),
    Missing,
    Unusable,
}

impl KeySetComparator {
    /// Build from ordered key-field groups.
    pub fn new<G, F, S>(groups: G) -> Self
    where
        G: IntoIterator<Item = F>,
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|group| group.into_iter().map(Into::into).collect())
                .collect(),
            key_normalizers: HashMap::new(),
        }
    }

    /// Attach a normalizer to one key field.
    pub fn with_key_normalizer(
        mut self,
        field: impl Into<String>,
        normalize: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.key_normalizers.insert(field.into(), Arc::new(normalize));
        self
    }

    fn extract(&self, entity: &Value, field: &str) -> ExtractedKey {
        let Some(raw) = lookup_path(entity, field) else {
            return ExtractedKey::Missing;
        };
        match self.key_normalizers.get(field) {
            Some(normalize) => match normalize(raw) {
                Some(value) => ExtractedKey::Present(value),
                None => ExtractedKey::Unusable,
            },
            None => ExtractedKey::Present(raw.clone()),
        }
    }

    /// Returns `true` if the first applicable group compares equal.
    pub fn matches(&self, a: &Value, b: &Value) -> bool {
        for group in &self.groups {
            // An empty group could never identify an entity.
            if group.is_empty() {
                continue;
            }

            let mut keys = Vec::with_capacity(group.len());
            let mut applicable = true;
            for field in group {
                match (self.extract(a, field), self.extract(b, field)) {
                    (ExtractedKey::Unusable, _) | (_, ExtractedKey::Unusable) => return false,
                    (ExtractedKey::Missing, _) | (_, ExtractedKey::Missing) => {
                        applicable = false;
                        break;
                    }
                    (ExtractedKey::Present(ka), ExtractedKey::Present(kb)) => {
                        keys.push((ka, kb));
                    }
                }
            }

            if applicable {
                return keys.iter().all(|(ka, kb)| ka == kb);
            }
        }
        false
    }
}

// Debug shows the declarative part only; normalizers are opaque closures.
impl fmt::Debug for KeySetComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySetComparator")
            .field("groups", &self.groups)
            .field("normalized_fields", &self.key_normalizers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equality_matches_identical_values() {
        let comparator = Comparator::Equality;
        assert!(comparator.matches(&json!({"value": "scattering"}), &json!({"value": "scattering"})));
        assert!(!comparator.matches(&json!({"value": "a"}), &json!({"value": "b"})));
        assert!(comparator.matches(&json!("A:2016"), &json!("A:2016")));
    }

    #[test]
    fn single_key_group_decides() {
        let comparator = Comparator::by_key("value");
        assert!(comparator.matches(
            &json!({"value": "mass", "source": "arxiv"}),
            &json!({"value": "mass", "source": "curator"}),
        ));
        assert!(!comparator.matches(&json!({"value": "mass"}), &json!({"value": "spin"})));
    }

    #[test]
    fn missing_key_is_no_match_not_a_mismatch() {
        let comparator = Comparator::by_key("value");
        // Neither side has the key: no applicable group, so no match.
        assert!(!comparator.matches(&json!({"other": 1}), &json!({"other": 1})));
        // One side has it: still not applicable.
        assert!(!comparator.matches(&json!({"value": "x"}), &json!({})));
    }

    #[test]
    fn groups_fall_through_in_declared_order() {
        let comparator = Comparator::by_keys([vec!["dois"], vec!["isbn"]]);

        // Both have a DOI: it decides, the ISBN never gets consulted.
        assert!(comparator.matches(
            &json!({"dois": "10.1/x", "isbn": "111"}),
            &json!({"dois": "10.1/x", "isbn": "222"}),
        ));
        assert!(!comparator.matches(
            &json!({"dois": "10.1/x", "isbn": "111"}),
            &json!({"dois": "10.1/y", "isbn": "111"}),
        ));

        // DOI missing on one side: fall through to the ISBN group.
        assert!(comparator.matches(
            &json!({"isbn": "111"}),
            &json!({"dois": "10.1/x", "isbn": "111"}),
        ));
    }

    #[test]
    fn multi_field_group_requires_all_fields() {
        let comparator = Comparator::by_keys([vec!["schema", "value"]]);
        assert!(comparator.matches(
            &json!({"schema": "ORCID", "value": "0000-0001"}),
            &json!({"schema": "ORCID", "value": "0000-0001"}),
        ));
        assert!(!comparator.matches(
            &json!({"schema": "ORCID", "value": "0000-0001"}),
            &json!({"schema": "ORCID", "value": "0000-0002"}),
        ));
        // Group skipped when a field is missing, and no later group exists.
        assert!(!comparator.matches(
            &json!({"schema": "ORCID"}),
            &json!({"schema": "ORCID", "value": "0000-0001"}),
        ));
    }

    #[test]
    fn dotted_paths_reach_nested_fields() {
        let comparator = Comparator::by_key("record.$ref");
        assert!(comparator.matches(
            &json!({"record": {"$ref": "http://x/1"}, "value": "a"}),
            &json!({"record": {"$ref": "http://x/1"}, "value": "b"}),
        ));
    }

    #[test]
    fn key_normalizer_rewrites_values() {
        let comparator = Comparator::KeySet(
            KeySetComparator::new([vec!["source"]]).with_key_normalizer("source", |v| {
                v.as_str().map(|s| Value::String(s.to_lowercase()))
            }),
        );
        assert!(comparator.matches(&json!({"source": "arXiv"}), &json!({"source": "ARXIV"})));
    }

    #[test]
    fn unusable_key_never_matches() {
        let comparator = Comparator::KeySet(
            KeySetComparator::new([vec!["source"]]).with_key_normalizer("source", |_| None),
        );
        // Normalizer abstains for every value: the entity matches nothing,
        // not even an identical twin.
        assert!(!comparator.matches(&json!({"source": "x"}), &json!({"source": "x"})));
    }

    #[test]
    fn no_groups_never_matches() {
        let comparator = Comparator::by_keys(Vec::<Vec<String>>::new());
        assert!(!comparator.matches(&json!({"a": 1}), &json!({"a": 1})));
    }
}
