//! Term expansion policy
//!
//! After a term is successfully crawled, its outbound link associations
//! become candidates for the next depth level. The policy deduplicates
//! candidates against every term already present in the task (including
//! terms discovered earlier in the same batch) and caps the number of new
//! terms enqueued per source term, without which the frontier would grow
//! unbounded.

use crate::storage::{normalize_term, AssociationKind, AssociationSeed};
use std::collections::HashSet;

/// Selects which terms to enqueue at the next depth level
///
/// Only link associations expand; categories are weaker, often noisy
/// semantic tags and never become terms. Comparison against the existing
/// set is on normalized text (case-insensitive, trimmed).
///
/// # Arguments
///
/// * `associations` - The crawled term's extracted associations
/// * `existing` - Normalized texts of every term already in the task
/// * `fan_out_limit` - Maximum number of terms to select
///
/// # Returns
///
/// The selected term texts in their original spelling, at most
/// `fan_out_limit` of them
pub fn select_expansion_terms(
    associations: &[AssociationSeed],
    existing: &HashSet<String>,
    fan_out_limit: usize,
) -> Vec<String> {
    let mut seen = existing.clone();
    let mut selected = Vec::new();

    for assoc in associations {
        if selected.len() >= fan_out_limit {
            break;
        }
        if assoc.kind != AssociationKind::Link {
            continue;
        }
        let norm = normalize_term(&assoc.target_term);
        if norm.is_empty() || seen.contains(&norm) {
            continue;
        }
        seen.insert(norm);
        selected.push(assoc.target_term.clone());
    }

    selected
}
