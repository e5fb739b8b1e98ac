//! Tabular ingest and column-role inference.
//!
//! Parses comma-separated text into typed rows and guesses which column
//! holds the metabolite identifier, effect size, significance value, and
//! pathway category from header-name patterns.
//!
//! Known limitation: cells are split on bare commas; quoted fields with
//! embedded commas are not supported.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// A single parsed cell, typed at parse time.
///
/// Coercion rule: a cell becomes a number only when its trimmed,
/// quote-stripped text is non-empty and parses fully as a finite `f64`.
/// Everything else (including the empty string) stays text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    fn from_raw(raw: &str) -> Self {
        let trimmed = strip_quotes(raw.trim());
        if !trimmed.is_empty() {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return Cell::Number(n);
                }
            }
        }
        Cell::Text(trimmed.to_string())
    }

    /// Numeric value of this cell, if it coerced to a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(_) => None,
        }
    }

    /// Text rendering of this cell for display and prompt building.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

/// One data row: column name to typed cell.
pub type Row = HashMap<String, Cell>;

/// A parsed dataset: headers in file order plus one [`Row`] per data line.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Parse comma-separated text into a [`DataTable`].
///
/// The first line is the header row; each subsequent non-blank line is one
/// row. Fails with [`FormatError`] when the input is empty or the header
/// row yields no columns.
pub fn parse_table(text: &str) -> Result<DataTable, FormatError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header_line = lines.next().ok_or(FormatError::Empty)?;
    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| strip_quotes(h.trim()).to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(FormatError::NoColumns);
    }

    let rows = lines
        .map(|line| {
            headers
                .iter()
                .zip(line.split(','))
                .map(|(header, raw)| (header.clone(), Cell::from_raw(raw)))
                .collect()
        })
        .collect();

    Ok(DataTable { headers, rows })
}

/// Semantic role a column can play in the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Identifier,
    EffectSize,
    Significance,
    Category,
}

/// Inferred column assignments: at most one column per role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnRoles {
    pub identifier: Option<String>,
    pub effect_size: Option<String>,
    pub significance: Option<String>,
    pub category: Option<String>,
}

impl ColumnRoles {
    fn slot_mut(&mut self, role: Role) -> &mut Option<String> {
        match role {
            Role::Identifier => &mut self.identifier,
            Role::EffectSize => &mut self.effect_size,
            Role::Significance => &mut self.significance,
            Role::Category => &mut self.category,
        }
    }
}

/// Header-name detection rules, evaluated in fixed priority order.
///
/// This is a heuristic, not a schema: extend the list without touching the
/// summarizer or extractor.
fn role_rules() -> &'static [(Role, Regex)] {
    static RULES: OnceLock<Vec<(Role, Regex)>> = OnceLock::new();
    RULES
        .get_or_init(|| {
            vec![
                (
                    Role::Identifier,
                    Regex::new(r"(?i)metabolite|compound|analyte|feature|^name$|^id$").unwrap(),
                ),
                (
                    Role::EffectSize,
                    Regex::new(r"(?i)log2|fold|^fc$|effect").unwrap(),
                ),
                (
                    Role::Significance,
                    Regex::new(r"(?i)p[-_. ]?val|^p$|adj|fdr|^q$|q[-_. ]?val").unwrap(),
                ),
                (
                    Role::Category,
                    Regex::new(r"(?i)pathway|class|category|group").unwrap(),
                ),
            ]
        })
        .as_slice()
}

/// Infer [`ColumnRoles`] from header names.
///
/// For each role the first matching header wins; a header may satisfy more
/// than one rule; unmatched headers are ignored.
pub fn infer_roles(headers: &[String]) -> ColumnRoles {
    let mut roles = ColumnRoles::default();
    for (role, pattern) in role_rules() {
        let slot = roles.slot_mut(*role);
        if slot.is_none() {
            if let Some(header) = headers.iter().find(|h| pattern.is_match(h)) {
                *slot = Some(header.clone());
            }
        }
    }
    roles
}
