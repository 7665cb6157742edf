//! Sorting and text filtering over row records
//!
//! Everything here is pure: inputs are borrowed and never mutated.

use std::cmp::Ordering;

use dbv_core::{RowRecord, SortDirection};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Stringified cell value; missing keys read as empty
fn cell_text(row: &RowRecord, column: &str) -> String {
    row.get(column).map(|v| v.to_string()).unwrap_or_default()
}

fn case_rank(c: char) -> u8 {
    if c.is_lowercase() {
        0
    } else {
        1
    }
}

/// Decomposed, lowercased text
fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

/// Folded text with accents and other combining marks dropped
fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    folded(s).filter(|c| !is_combining_mark(*c))
}

/// Compare two strings the way a UI collator orders them.
///
/// Base letters compare first, ignoring accents and case, so `"Éclair"`
/// sorts with the e's. Ties go to the unaccented form, then to lowercase
/// before uppercase, and the raw code points settle anything left.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| {
            a.chars()
                .zip(b.chars())
                .map(|(x, y)| case_rank(x).cmp(&case_rank(y)))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.cmp(b))
}

/// Stable sort permutation of `rows` by the text of `column`.
///
/// `result[i]` is the index in `rows` of the record that sorts to position
/// `i`. Equal values keep their relative order in both directions.
pub fn sort_order(rows: &[RowRecord], column: &str, direction: SortDirection) -> Vec<usize> {
    let keys: Vec<String> = rows.iter().map(|row| cell_text(row, column)).collect();
    let mut order: Vec<usize> = (0..rows.len()).collect();

    // slice::sort_by is stable
    order.sort_by(|&a, &b| match direction {
        SortDirection::Asc => locale_cmp(&keys[a], &keys[b]),
        SortDirection::Desc => locale_cmp(&keys[b], &keys[a]),
    });
    order
}

/// Rows sorted by `column`, as a new sequence
pub fn sort_by(rows: &[RowRecord], column: &str, direction: SortDirection) -> Vec<RowRecord> {
    sort_order(rows, column, direction)
        .into_iter()
        .map(|i| rows[i].clone())
        .collect()
}

/// Lazily yield `(index, row)` for rows whose `anchor_column` contains
/// `predicate`, ignoring case. An empty predicate matches every row.
pub fn filter_by_text<'a>(
    rows: &'a [RowRecord],
    predicate: &str,
    anchor_column: &'a str,
) -> impl Iterator<Item = (usize, &'a RowRecord)> + 'a {
    let needle = predicate.to_lowercase();
    rows.iter().enumerate().filter(move |(_, row)| {
        needle.is_empty() || cell_text(row, anchor_column).to_lowercase().contains(&needle)
    })
}
