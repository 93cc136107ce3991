use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SourceKind;

/// Outcome of comparing one logical field across sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// All comparable sources agree.
    Match,
    /// Sources agree only approximately, or the field needs attention.
    Warning,
    /// Sources disagree.
    Mismatch,
    /// Not enough data to compare.
    Info,
}

impl std::fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldStatus::Match => "match",
            FieldStatus::Warning => "warning",
            FieldStatus::Mismatch => "mismatch",
            FieldStatus::Info => "info",
        };
        write!(f, "{s}")
    }
}

/// One row of a validation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldComparison {
    pub field_name: String,
    /// Display value per source; `None` marks a source that carried no value.
    pub values: BTreeMap<SourceKind, Option<String>>,
    pub status: FieldStatus,
    pub message: String,
}

/// Row counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub matches: usize,
    pub warnings: usize,
    pub mismatches: usize,
    pub info: usize,
    pub total: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("field `{0}` appears more than once in the report")]
    DuplicateField(String),
}

/// Ordered field comparisons plus a per-status summary. Immutable once built;
/// a field may appear at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    rows: Vec<FieldComparison>,
    summary: StatusSummary,
}

impl ValidationReport {
    pub fn from_rows(rows: Vec<FieldComparison>) -> Result<Self, ReportError> {
        let mut seen = std::collections::BTreeSet::new();
        for row in &rows {
            if !seen.insert(row.field_name.clone()) {
                return Err(ReportError::DuplicateField(row.field_name.clone()));
            }
        }
        let summary = summarize(&rows);
        Ok(Self { rows, summary })
    }

    pub fn rows(&self) -> &[FieldComparison] {
        &self.rows
    }

    pub fn summary(&self) -> StatusSummary {
        self.summary
    }

    /// Rows that need a human decision before the disclosure can be published.
    pub fn flagged_rows(&self) -> impl Iterator<Item = &FieldComparison> {
        self.rows
            .iter()
            .filter(|r| matches!(r.status, FieldStatus::Warning | FieldStatus::Mismatch))
    }
}

fn summarize(rows: &[FieldComparison]) -> StatusSummary {
    let mut summary = StatusSummary {
        total: rows.len(),
        ..Default::default()
    };
    for row in rows {
        match row.status {
            FieldStatus::Match => summary.matches += 1,
            FieldStatus::Warning => summary.warnings += 1,
            FieldStatus::Mismatch => summary.mismatches += 1,
            FieldStatus::Info => summary.info += 1,
        }
    }
    summary
}
