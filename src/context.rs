//! Renders the dataset summary into the fixed-format text block consumed by
//! the prompt templates.
//!
//! The output is deterministic for a given row set and summary. Missing
//! numeric fields render as the literal `N/A` marker instead of failing.

use crate::ingest::{ColumnRoles, Row};
use crate::stats::{is_significant, Summary};

/// Cap on significant-row detail lines appended after the top lists.
const MAX_DETAIL_ROWS: usize = 50;

/// Absence marker for missing numeric fields.
const MISSING: &str = "N/A";

fn row_name(row: &Row, roles: &ColumnRoles) -> String {
    roles
        .identifier
        .as_ref()
        .and_then(|col| row.get(col))
        .map(|cell| cell.as_text())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn numeric(row: &Row, column: Option<&String>) -> Option<f64> {
    column.and_then(|col| row.get(col)).and_then(|c| c.as_number())
}

fn fmt_fixed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => MISSING.to_string(),
    }
}

fn fmt_scientific(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2e}", v),
        None => MISSING.to_string(),
    }
}

fn top_line(row: &Row, roles: &ColumnRoles) -> String {
    let mut line = format!(
        "{}: FC={}, p={}",
        row_name(row, roles),
        fmt_fixed(numeric(row, roles.effect_size.as_ref()), 2),
        fmt_scientific(numeric(row, roles.significance.as_ref())),
    );
    if let Some(category) = roles.category.as_ref().and_then(|col| row.get(col)) {
        let text = category.as_text();
        if !text.is_empty() {
            line.push_str(&format!(", Pathway: {}", text));
        }
    }
    line
}

fn detail_line(row: &Row, roles: &ColumnRoles) -> String {
    format!(
        "{}: FC={}, p={}",
        row_name(row, roles),
        fmt_fixed(numeric(row, roles.effect_size.as_ref()), 3),
        fmt_scientific(numeric(row, roles.significance.as_ref())),
    )
}

/// Build the dataset context block for prompt templates.
pub fn build_context(rows: &[Row], summary: &Summary) -> String {
    let roles = &summary.roles;
    let mut out = String::new();

    out.push_str("DATASET SUMMARY\n");
    out.push_str(&format!("Total metabolites: {}\n", summary.total));
    out.push_str(&format!(
        "Significant (|FC| > 0.5, p < 0.05): {}\n",
        summary.significant
    ));
    out.push_str(&format!("Increased: {}\n", summary.increased));
    out.push_str(&format!("Decreased: {}\n", summary.decreased));

    out.push_str("\nTOP INCREASED METABOLITES\n");
    for row in &summary.top_increased {
        out.push_str(&top_line(row, roles));
        out.push('\n');
    }

    out.push_str("\nTOP DECREASED METABOLITES\n");
    for row in &summary.top_decreased {
        out.push_str(&top_line(row, roles));
        out.push('\n');
    }

    // Original row order here, not re-sorted.
    out.push_str("\nSIGNIFICANT METABOLITES\n");
    for row in rows
        .iter()
        .filter(|r| is_significant(r, roles))
        .take(MAX_DETAIL_ROWS)
    {
        out.push_str(&detail_line(row, roles));
        out.push('\n');
    }

    out
}
