//! Distance-based matching for entities without reliable keys.
//!
//! The main client is author matching: two author records with no shared
//! identifier still need to be recognized as the same person when their
//! names are close enough. Dissimilarity is on a 0..1 scale; 0 is identical.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use similar::TextDiff;
use tracing::debug;

use crate::comparator::lookup_path;
use crate::normalize::Normalizer;
use crate::tokenize::{NameTokenizer, TokenizedName};

/// A numeric dissimilarity between two entities (0 identical, 1 unrelated).
pub trait DistanceFn: Send + Sync {
    fn distance(&self, a: &Value, b: &Value) -> f64;
}

impl<F> DistanceFn for F
where
    F: Fn(&Value, &Value) -> f64 + Send + Sync,
{
    fn distance(&self, a: &Value, b: &Value) -> f64 {
        self(a, b)
    }
}

// ---------------------------------------------------------------------------
// DistanceComparator
// ---------------------------------------------------------------------------

/// Fuzzy matching with exact short-circuits.
///
/// Before the distance function is consulted, the normalizer chain is tried
/// in order; a normalizer producing the same key for both entities confirms
/// the match immediately. Two authors carrying the same ORCID match without
/// any name arithmetic. Normalization is not the final decider: a key
/// mismatch only moves on to the next normalizer, and entities no normalizer
/// could confirm fall through to `distance(a, b) <= threshold`.
#[derive(Clone)]
pub struct DistanceComparator {
    normalizers: Vec<Arc<dyn Normalizer>>,
    distance: Arc<dyn DistanceFn>,
    threshold: f64,
}

impl DistanceComparator {
    /// Default match threshold, tuned for author-name dissimilarity.
    pub const DEFAULT_THRESHOLD: f64 = 0.12;

    /// Build over a distance function with the default threshold and an
    /// empty normalizer chain.
    pub fn new(distance: impl DistanceFn + 'static) -> Self {
        Self {
            normalizers: Vec::new(),
            distance: Arc::new(distance),
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    /// Append a normalizer to the chain. Call order is priority order.
    pub fn with_normalizer(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.normalizers.push(Arc::new(normalizer));
        self
    }

    /// Override the match threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns `true` if the entities denote the same logical entity.
    pub fn matches(&self, a: &Value, b: &Value) -> bool {
        for (index, normalizer) in self.normalizers.iter().enumerate() {
            if let (Some(key_a), Some(key_b)) = (normalizer.normalize(a), normalizer.normalize(b))
            {
                if key_a == key_b {
                    debug!(normalizer = index, "normalizer short-circuit");
                    return true;
                }
            }
        }
        self.distance.distance(a, b) <= self.threshold
    }
}

impl fmt::Debug for DistanceComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistanceComparator")
            .field("normalizers", &self.normalizers.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Name distance
// ---------------------------------------------------------------------------

/// Token-based name dissimilarity over a string field of the entity.
///
/// The field value is tokenized by the supplied [`NameTokenizer`] and the
/// two [`TokenizedName`]s are compared with [`token_distance`]. An entity
/// missing the field is maximally distant from everything.
pub struct NameDistance {
    tokenizer: Arc<dyn NameTokenizer>,
    field: String,
}

impl NameDistance {
    pub fn new(tokenizer: Arc<dyn NameTokenizer>, field: impl Into<String>) -> Self {
        Self {
            tokenizer,
            field: field.into(),
        }
    }
}

impl DistanceFn for NameDistance {
    fn distance(&self, a: &Value, b: &Value) -> f64 {
        let name_a = lookup_path(a, &self.field).and_then(Value::as_str);
        let name_b = lookup_path(b, &self.field).and_then(Value::as_str);
        match (name_a, name_b) {
            (Some(na), Some(nb)) => {
                token_distance(&self.tokenizer.tokenize(na), &self.tokenizer.tokenize(nb))
            }
            _ => 1.0,
        }
    }
}

/// Dissimilarity between two tokenized names, 0..1.
///
/// Last-name tokens align against last-name tokens and other tokens against
/// other tokens. Within a group, each token pairs greedily with its cheapest
/// unused counterpart; unpaired tokens cost 1. The group cost is the pair
/// cost sum over the longer group's length, and the total is the
/// token-count-weighted mean of the group costs. Two token-empty names score
/// 1.0, so degenerate input never produces an accidental match.
pub fn token_distance(a: &TokenizedName, b: &TokenizedName) -> f64 {
    let mut total = 0.0;
    let mut weight = 0usize;

    let groups = [
        (&a.lastname_tokens, &b.lastname_tokens),
        (&a.other_tokens, &b.other_tokens),
    ];
    for (group_a, group_b) in groups {
        if let Some((cost, len)) = group_cost(group_a, group_b) {
            total += cost * len as f64;
            weight += len;
        }
    }

    if weight == 0 {
        return 1.0;
    }
    total / weight as f64
}

/// Mean pairing cost for one token group, with the group length used as
/// weight. `None` when both sides are empty.
fn group_cost(a: &[String], b: &[String]) -> Option<(f64, usize)> {
    let len = a.len().max(b.len());
    if len == 0 {
        return None;
    }

    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut used = vec![false; long.len()];
    let mut cost = 0.0;

    for token in short {
        let mut best: Option<(usize, f64)> = None;
        for (j, candidate) in long.iter().enumerate() {
            if used[j] {
                continue;
            }
            let c = token_cost(token, candidate);
            if best.map_or(true, |(_, best_cost)| c < best_cost) {
                best = Some((j, c));
            }
        }
        if let Some((j, c)) = best {
            used[j] = true;
            cost += c;
        }
    }

    cost += (long.len() - short.len()) as f64;
    Some((cost / len as f64, len))
}

/// Cost of pairing two tokens.
///
/// A token of length one is an initial: it matches any token sharing its
/// first letter and mismatches everything else outright. Longer tokens
/// compare by character-level similarity ratio.
fn token_cost(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 1.0;
    }

    let is_initial = |s: &str| s.chars().count() == 1;
    if is_initial(&a) || is_initial(&b) {
        if a.chars().next() == b.chars().next() {
            0.0
        } else {
            1.0
        }
    } else {
        1.0 - f64::from(TextDiff::from_chars(a.as_str(), b.as_str()).ratio())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Minimal comma-convention tokenizer for exercising the distance math.
    struct CommaTokenizer;

    impl NameTokenizer for CommaTokenizer {
        fn tokenize(&self, name: &str) -> TokenizedName {
            let (last, rest) = name.split_once(',').unwrap_or((name, ""));
            let words = |s: &str| {
                s.split(|c: char| c.is_whitespace() || c == '.')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            };
            TokenizedName {
                lastname_tokens: words(last),
                other_tokens: words(rest),
            }
        }
    }

    fn name_comparator() -> DistanceComparator {
        DistanceComparator::new(NameDistance::new(Arc::new(CommaTokenizer), "full_name"))
    }

    #[test]
    fn identical_names_are_distance_zero() {
        let a = CommaTokenizer.tokenize("Smith, John");
        assert_eq!(token_distance(&a, &a), 0.0);
    }

    #[test]
    fn initial_matches_full_given_name() {
        let a = CommaTokenizer.tokenize("Smith, J.");
        let b = CommaTokenizer.tokenize("Smith, John");
        assert_eq!(token_distance(&a, &b), 0.0);
    }

    #[test]
    fn different_given_names_are_far_apart() {
        let a = CommaTokenizer.tokenize("Smith, John");
        let b = CommaTokenizer.tokenize("Smith, Jane");
        assert!(token_distance(&a, &b) > DistanceComparator::DEFAULT_THRESHOLD);
    }

    #[test]
    fn empty_names_never_match() {
        let empty = TokenizedName::default();
        assert_eq!(token_distance(&empty, &empty), 1.0);
    }

    #[test]
    fn extra_token_costs_proportionally() {
        let a = CommaTokenizer.tokenize("Smith, John");
        let b = CommaTokenizer.tokenize("Smith, John Edward");
        // One unpaired token out of three total.
        let d = token_distance(&a, &b);
        assert!(d > 0.0 && d < 0.5, "distance was {}", d);
    }

    #[test]
    fn comparator_matches_close_names() {
        let comparator = name_comparator();
        assert!(comparator.matches(
            &json!({"full_name": "Smith, J."}),
            &json!({"full_name": "Smith, John"}),
        ));
        assert!(!comparator.matches(
            &json!({"full_name": "Smith, John"}),
            &json!({"full_name": "Jones, John"}),
        ));
    }

    #[test]
    fn missing_name_field_never_matches() {
        let comparator = name_comparator();
        assert!(!comparator.matches(&json!({}), &json!({})));
        assert!(!comparator.matches(&json!({"full_name": "Smith, J."}), &json!({})));
    }

    #[test]
    fn normalizer_short_circuit_beats_distance() {
        let orcid = |entity: &Value| {
            entity
                .get("orcid")
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let comparator = name_comparator().with_normalizer(orcid);

        // Same id: matched despite wildly different names.
        assert!(comparator.matches(
            &json!({"full_name": "Smith, John", "orcid": "0000-0001"}),
            &json!({"full_name": "Kowalski, Jan", "orcid": "0000-0001"}),
        ));
        // Different ids: the chain cannot confirm, so the names decide.
        assert!(comparator.matches(
            &json!({"full_name": "Smith, John", "orcid": "0000-0001"}),
            &json!({"full_name": "Smith, John", "orcid": "0000-0002"}),
        ));
        assert!(!comparator.matches(
            &json!({"full_name": "Smith, John", "orcid": "0000-0001"}),
            &json!({"full_name": "Jones, Mary", "orcid": "0000-0002"}),
        ));
        // No ids on either side: chain abstains, distance decides.
        assert!(comparator.matches(
            &json!({"full_name": "Smith, John"}),
            &json!({"full_name": "Smith, John"}),
        ));
    }
}
