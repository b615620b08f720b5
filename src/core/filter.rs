//! Keyword filter and duration sort

use crate::types::Row;
use std::cmp::Ordering;

/// Keep rows whose tags contain any keyword (case-sensitive substring).
/// An empty keyword list keeps everything.
pub fn filter_by_keywords(rows: Vec<Row>, keywords: &[String]) -> Vec<Row> {
    if keywords.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| keywords.iter().any(|k| row.tags.contains(k.as_str())))
        .collect()
}

/// Stable ascending sort by duration. Non-numeric durations go last.
pub fn sort_by_duration(rows: &mut [Row]) {
    rows.sort_by(|a, b| compare_durations(a.duration, b.duration));
}

/// Filter, then sort
pub fn filter_and_sort(rows: Vec<Row>, keywords: &[String]) -> Vec<Row> {
    let mut rows = filter_by_keywords(rows, keywords);
    sort_by_duration(&mut rows);
    rows
}

fn compare_durations(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.filter(|d| !d.is_nan());
    let b = b.filter(|d| !d.is_nan());
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
