//! The merge policy tables for curated bibliographic records.
//!
//! One entry per record field that needs something other than the engine
//! defaults: which comparator aligns its list entities, which unification
//! operation decides membership and order, and which side wins divergent
//! scalar edits. Paths are canonical (list indices collapsed).

use std::sync::Arc;

use serde_json::Value;

use trimerge_engine::{FieldFallback, ListUnifyOp, MergeConfig};
use trimerge_match::{Comparator, DistanceComparator, KeySetComparator, NameDistance};

use crate::normalizers::{IdNormalizer, NameKeyNormalizer};
use crate::tokenizer::PhraseTokenizer;

/// The author comparator: identifier short-circuits, then canonical name
/// keys of decreasing strictness, then token name distance.
pub fn author_comparator() -> Comparator {
    let tokenizer = Arc::new(PhraseTokenizer);
    Comparator::Distance(
        DistanceComparator::new(NameDistance::new(tokenizer.clone(), "full_name"))
            .with_normalizer(IdNormalizer::new("ORCID"))
            .with_normalizer(IdNormalizer::new("INSPIRE BAI"))
            .with_normalizer(NameKeyNormalizer::new(tokenizer.clone()))
            .with_normalizer(NameKeyNormalizer::new(tokenizer.clone()).with_given_limit(1))
            .with_normalizer(
                NameKeyNormalizer::new(tokenizer)
                    .with_given_limit(1)
                    .initials_only(),
            ),
    )
}

/// Source-keyed matching, case-insensitive on the holder string.
pub fn source_comparator() -> Comparator {
    Comparator::KeySet(
        KeySetComparator::new([vec!["source"]]).with_key_normalizer("source", |value| {
            value.as_str().map(|s| Value::String(s.to_lowercase()))
        }),
    )
}

/// Reference matching by identifier fallback: arXiv eprint if both cite one,
/// else DOIs, else ISBN, else series title, else publication info.
pub fn reference_comparator() -> Comparator {
    Comparator::by_keys([
        vec!["arxiv_eprint"],
        vec!["dois"],
        vec!["isbn"],
        vec!["book_series.title"],
        vec!["publication_info"],
    ])
}

/// Affiliations match by record reference if both carry one, else by the
/// literal value.
fn affiliation_comparator() -> Comparator {
    Comparator::by_keys([vec!["record.$ref"], vec!["value"]])
}

fn comparators() -> Vec<(&'static str, Comparator)> {
    vec![
        ("_desy_bookkeeping", Comparator::by_key("date")),
        ("_fft", Comparator::by_key("creation_datetime")),
        ("_files", Comparator::by_key("version_id")),
        ("_private_notes", source_comparator()),
        ("abstracts", source_comparator()),
        ("acquisition_source", source_comparator()),
        ("arxiv_eprints", Comparator::by_key("value")),
        ("authors", author_comparator()),
        ("authors.affiliations", affiliation_comparator()),
        ("authors.ids", Comparator::by_key("schema")),
        ("authors.raw_affiliations", source_comparator()),
        ("book_series", Comparator::by_key("title")),
        ("collaborations", Comparator::by_key("record.$ref")),
        ("copyright", Comparator::by_key("material")),
        ("deleted_records", Comparator::by_key("$ref")),
        ("dois", Comparator::by_key("value")),
        ("external_system_identifiers", Comparator::by_key("schema")),
        ("funding_info", Comparator::by_key("project_number")),
        ("imprints", Comparator::by_key("publisher")),
        ("isbns", Comparator::by_key("value")),
        ("keywords", Comparator::by_key("value")),
        ("license", Comparator::by_key("imposing")),
        ("new_record", Comparator::by_key("$ref")),
        ("persistent_identifiers", Comparator::by_key("value")),
        ("public_notes", source_comparator()),
        ("references", Comparator::by_key("record.$ref")),
        ("references.reference.authors", author_comparator()),
        ("report_numbers", source_comparator()),
        ("title_translations", Comparator::by_key("language")),
        ("titles", Comparator::by_key("language")),
    ]
}

const LIST_OPS: &[(&str, ListUnifyOp)] = &[
    ("_collections", ListUnifyOp::KeepOnlyHeadEntities),
    ("_desy_bookkeeping", ListUnifyOp::KeepOnlyHeadEntities),
    ("_fft", ListUnifyOp::KeepOnlyHeadEntities),
    ("_files", ListUnifyOp::KeepOnlyUpdateEntities),
    ("_private_notes", ListUnifyOp::KeepOnlyHeadEntities),
    ("abstracts", ListUnifyOp::KeepHeadAndUpdateUpdateFirst),
    ("accelerator_experiments", ListUnifyOp::KeepOnlyHeadEntities),
    ("arxiv_eprints", ListUnifyOp::KeepHeadAndUpdateHeadFirst),
    ("authors", ListUnifyOp::KeepUpdateConflictOnHeadDelete),
    ("authors.affiliations", ListUnifyOp::KeepOnlyHeadEntities),
    ("authors.alternative_names", ListUnifyOp::KeepHeadAndUpdateHeadFirst),
    ("authors.credit_roles", ListUnifyOp::KeepHeadAndUpdateHeadFirst),
    ("authors.emails", ListUnifyOp::KeepUpdateConflictOnHeadDelete),
    ("authors.full_name", ListUnifyOp::KeepOnlyHeadEntities),
    ("authors.ids", ListUnifyOp::KeepOnlyHeadEntities),
    ("authors.inspire_roles", ListUnifyOp::KeepOnlyHeadEntities),
    ("authors.raw_affiliations", ListUnifyOp::KeepOnlyUpdateEntities),
    ("book_series", ListUnifyOp::KeepOnlyHeadEntities),
    ("collaborations", ListUnifyOp::KeepHeadAndUpdateHeadFirst),
    ("copyright", ListUnifyOp::KeepOnlyUpdateEntities),
    ("corporate_author", ListUnifyOp::KeepOnlyUpdateEntities),
    ("deleted_records", ListUnifyOp::KeepOnlyHeadEntities),
    ("document_type", ListUnifyOp::KeepOnlyUpdateEntities),
    ("dois", ListUnifyOp::KeepHeadAndUpdateHeadFirst),
    ("editions", ListUnifyOp::KeepHeadAndUpdateHeadFirst),
    ("energy_ranges", ListUnifyOp::KeepOnlyUpdateEntities),
    ("external_system_identifiers", ListUnifyOp::KeepOnlyUpdateEntities),
    ("funding_info", ListUnifyOp::KeepOnlyHeadEntities),
    ("inspire_categories", ListUnifyOp::KeepHeadAndUpdateUpdateFirst),
    ("isbns", ListUnifyOp::KeepHeadAndUpdateUpdateFirst),
    ("keywords", ListUnifyOp::KeepHeadAndUpdateUpdateFirst),
    ("languages", ListUnifyOp::KeepOnlyUpdateEntities),
    ("license", ListUnifyOp::KeepHeadAndUpdateUpdateFirst),
    ("persistent_identifiers", ListUnifyOp::KeepOnlyHeadEntities),
    ("public_notes", ListUnifyOp::KeepOnlyUpdateEntities),
    ("publication_info", ListUnifyOp::KeepHeadAndUpdateHeadFirst),
    ("publication_type", ListUnifyOp::KeepOnlyUpdateEntities),
    ("references", ListUnifyOp::KeepUpdateConflictOnHeadDelete),
    ("references.raw_refs", ListUnifyOp::KeepOnlyUpdateEntities),
    (
        "references.reference.authors",
        ListUnifyOp::KeepUpdateConflictOnHeadDelete,
    ),
    (
        "references.reference.book_series",
        ListUnifyOp::KeepHeadAndUpdateHeadFirst,
    ),
    (
        "references.reference.collaboration",
        ListUnifyOp::KeepOnlyUpdateEntities,
    ),
    ("references.reference.dois", ListUnifyOp::KeepOnlyUpdateEntities),
    ("references.reference.misc", ListUnifyOp::KeepOnlyUpdateEntities),
    (
        "references.reference.persistent_identifiers",
        ListUnifyOp::KeepOnlyUpdateEntities,
    ),
    ("references.reference.urls", ListUnifyOp::KeepOnlyUpdateEntities),
    ("report_numbers", ListUnifyOp::KeepOnlyUpdateEntities),
    ("special_collections", ListUnifyOp::KeepOnlyHeadEntities),
    ("texkeys", ListUnifyOp::KeepOnlyHeadEntities),
    ("thesis_info.institutions", ListUnifyOp::KeepOnlyUpdateEntities),
    ("title_translations", ListUnifyOp::KeepOnlyHeadEntities),
    ("titles", ListUnifyOp::KeepHeadAndUpdateHeadFirst),
    ("urls", ListUnifyOp::KeepHeadAndUpdateHeadFirst),
];

const FIELD_FALLBACKS: &[(&str, FieldFallback)] = &[
    ("$schema", FieldFallback::KeepHead),
    ("_desy_bookkeeping", FieldFallback::KeepHead),
    ("_export_to", FieldFallback::KeepHead),
    ("_fft", FieldFallback::KeepHead),
    ("_private_notes", FieldFallback::KeepHead),
    ("accelerator_experiments", FieldFallback::KeepHead),
    ("acquisition_source", FieldFallback::KeepHead),
    ("authors", FieldFallback::KeepHead),
    ("authors.affiliations", FieldFallback::KeepHead),
    ("authors.curated_relation", FieldFallback::KeepHead),
    ("authors.full_name", FieldFallback::KeepHead),
    ("authors.ids", FieldFallback::KeepHead),
    ("authors.inspire_roles", FieldFallback::KeepHead),
    ("authors.record", FieldFallback::KeepHead),
    ("authors.raw_affiliations", FieldFallback::KeepUpdate),
    ("authors.signature_block", FieldFallback::KeepUpdate),
    ("authors.uuid", FieldFallback::KeepUpdate),
    ("book_series", FieldFallback::KeepHead),
    ("control_number", FieldFallback::KeepHead),
    ("deleted", FieldFallback::KeepHead),
    ("deleted_records", FieldFallback::KeepHead),
    ("funding_info", FieldFallback::KeepHead),
    ("legacy_creation_date", FieldFallback::KeepHead),
    ("new_record", FieldFallback::KeepHead),
    ("persistent_identifiers", FieldFallback::KeepHead),
    ("preprint_date", FieldFallback::KeepHead),
    ("self", FieldFallback::KeepHead),
    ("special_collections", FieldFallback::KeepHead),
    ("succeeding_entry", FieldFallback::KeepHead),
    ("texkeys", FieldFallback::KeepHead),
    ("thesis_info.institutions", FieldFallback::KeepHead),
    ("title_translations", FieldFallback::KeepHead),
    ("urls", FieldFallback::KeepHead),
    ("references", FieldFallback::KeepUpdate),
    ("references.reference", FieldFallback::KeepHead),
    ("references.reference.arxiv_eprint", FieldFallback::KeepUpdate),
    ("references.reference.authors", FieldFallback::KeepUpdate),
    ("references.reference.book_series", FieldFallback::KeepUpdate),
    ("references.reference.document_type", FieldFallback::KeepUpdate),
    ("references.reference.dois", FieldFallback::KeepUpdate),
    ("references.reference.imprint", FieldFallback::KeepUpdate),
    ("references.reference.isbn", FieldFallback::KeepUpdate),
    ("references.reference.label", FieldFallback::KeepUpdate),
    (
        "references.reference.persistent_identifiers",
        FieldFallback::KeepUpdate,
    ),
    ("references.reference.report_number", FieldFallback::KeepUpdate),
    ("references.reference.texkey", FieldFallback::KeepUpdate),
    ("references.reference.title", FieldFallback::KeepUpdate),
    ("references.reference.urls", FieldFallback::KeepUpdate),
];

/// The full bibliographic policy surface over the given engine defaults.
pub fn bibliographic_config(
    default_field_fallback: FieldFallback,
    default_list_op: ListUnifyOp,
) -> MergeConfig {
    let mut config = MergeConfig::new(default_field_fallback, default_list_op);
    for (path, fallback) in FIELD_FALLBACKS {
        config = config.with_field_fallback(*path, *fallback);
    }
    for (path, op) in LIST_OPS {
        config = config.with_list_op(*path, *op);
    }
    for (path, comparator) in comparators() {
        config = config.with_comparator(path, comparator);
    }
    config
}

/// Curator-biased defaults: keep head on divergence, keep only head entities
/// in unconfigured lists.
pub fn head_preferred() -> MergeConfig {
    bibliographic_config(FieldFallback::KeepHead, ListUnifyOp::KeepOnlyHeadEntities)
}

/// Update-biased defaults: keep update on divergence, keep only update
/// entities in unconfigured lists.
pub fn update_preferred() -> MergeConfig {
    bibliographic_config(
        FieldFallback::KeepUpdate,
        ListUnifyOp::KeepOnlyUpdateEntities,
    )
}
