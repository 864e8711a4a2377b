use crate::core::distance::distance_between;
use crate::domain::model::{BranchRecord, ReferenceLocation};
use std::cmp::Ordering;

/// Lowercased, trimmed form of a search box entry.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Case-insensitive substring match on name, city or street.
///
/// `needle` must already be normalized; absent fields never match.
pub fn matches_query(record: &BranchRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    [Some(record.name.as_str()), record.city.as_deref(), record.street.as_deref()]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Marks non-matching records hidden and returns how many stay visible.
///
/// Records are flagged, never removed, so a later empty query brings every
/// record back in its current order.
pub fn apply_text_filter(records: &mut [BranchRecord], query: &str) -> usize {
    let needle = normalize_query(query);
    let mut visible = 0;

    for record in records.iter_mut() {
        record.is_hidden_by_filter = !matches_query(record, &needle);
        if !record.is_hidden_by_filter {
            visible += 1;
        }
    }

    tracing::debug!(
        "Text filter '{}' keeps {} of {} records",
        needle,
        visible,
        records.len()
    );
    visible
}

/// Attaches distances from `reference` and stable-sorts ascending.
///
/// Records without coordinates get no distance and trail the sorted ones,
/// keeping their prior relative order.
pub fn apply_distance_sort(records: &mut [BranchRecord], reference: &ReferenceLocation) {
    for record in records.iter_mut() {
        record.distance_miles = record
            .coordinates
            .as_ref()
            .map(|coords| distance_between(reference, coords));
    }

    records.sort_by(|a, b| compare_distance(a.distance_miles, b.distance_miles));
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn visible_records(records: &[BranchRecord]) -> impl Iterator<Item = &BranchRecord> {
    records.iter().filter(|record| !record.is_hidden_by_filter)
}
