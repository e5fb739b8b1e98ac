//! Deterministic statistical summarization of an uploaded dataset.
//!
//! The significance predicate and its thresholds (|fold change| > 0.5,
//! p < 0.05, both strict) are a fixed contract consumed by the prompt
//! builder; they are not tunable.

use std::cmp::Ordering;

use serde::Serialize;

use crate::ingest::{ColumnRoles, Row};

/// How many top-changed rows each direction keeps.
const TOP_N: usize = 10;

/// Derived dataset summary, immutable once computed.
///
/// Recomputed in full whenever the row set or roles change.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub significant: usize,
    pub increased: usize,
    pub decreased: usize,
    pub top_increased: Vec<Row>,
    pub top_decreased: Vec<Row>,
    pub roles: ColumnRoles,
}

/// Effect size of a row; missing or non-numeric cells count as 0.
pub fn effect_size(row: &Row, roles: &ColumnRoles) -> f64 {
    roles
        .effect_size
        .as_ref()
        .and_then(|col| row.get(col))
        .and_then(|cell| cell.as_number())
        .unwrap_or(0.0)
}

/// Significance of a row; a missing p-value counts as 1 so it can never
/// pass the predicate.
pub fn significance(row: &Row, roles: &ColumnRoles) -> f64 {
    roles
        .significance
        .as_ref()
        .and_then(|col| row.get(col))
        .and_then(|cell| cell.as_number())
        .unwrap_or(1.0)
}

/// The fixed significance predicate: |fc| > 0.5 and p < 0.05, strict.
pub fn is_significant(row: &Row, roles: &ColumnRoles) -> bool {
    effect_size(row, roles).abs() > 0.5 && significance(row, roles) < 0.05
}

/// Summarize a dataset. Returns `None` for an empty row set, which is the
/// valid "no data yet" state rather than an error.
pub fn summarize(rows: &[Row], roles: &ColumnRoles) -> Option<Summary> {
    if rows.is_empty() {
        return None;
    }

    let significant: Vec<&Row> = rows.iter().filter(|r| is_significant(r, roles)).collect();

    let mut increased: Vec<Row> = significant
        .iter()
        .filter(|r| effect_size(r, roles) > 0.0)
        .map(|r| (*r).clone())
        .collect();
    let mut decreased: Vec<Row> = significant
        .iter()
        .filter(|r| effect_size(r, roles) < 0.0)
        .map(|r| (*r).clone())
        .collect();

    let increased_count = increased.len();
    let decreased_count = decreased.len();

    // Stable sorts keep input order among equal effect sizes.
    increased.sort_by(|a, b| {
        effect_size(b, roles)
            .partial_cmp(&effect_size(a, roles))
            .unwrap_or(Ordering::Equal)
    });
    decreased.sort_by(|a, b| {
        effect_size(a, roles)
            .partial_cmp(&effect_size(b, roles))
            .unwrap_or(Ordering::Equal)
    });
    increased.truncate(TOP_N);
    decreased.truncate(TOP_N);

    Some(Summary {
        total: rows.len(),
        significant: significant.len(),
        increased: increased_count,
        decreased: decreased_count,
        top_increased: increased,
        top_decreased: decreased,
        roles: roles.clone(),
    })
}
