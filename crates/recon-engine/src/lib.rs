//! Reconciliation engine for real-estate listing disclosures.
//!
//! Takes structured records parsed from up to three sources (the broker's
//! free-form message, the authoritative building registry, and a portal
//! listing export) and produces a trustworthy, explainable verdict per
//! fact: floor references normalized and matched across label formats,
//! legal-use categories classified under area-dependent rules, reported
//! areas reconciled against the registry with whole-unit/split-unit
//! inference, and every field cross-checked into a per-field status report.
//!
//! The engine is a pure, synchronous computation: no I/O, no retries, no
//! shared mutable state. Fetching and parsing belong to upstream
//! collaborators; everything here is a function over immutable inputs.

pub mod area;
pub mod floor;
pub mod reconcile;
pub mod report;
pub mod usage;
pub mod validator;

pub use area::{AreaRecord, AreaTable};
pub use floor::{match_floor, parse_floor, FloorReference};
pub use reconcile::{
    reconcile, reconcile_area, AreaChoice, LeaseComparison, LeaseType, ReconciliationContext,
    SearchHints, UnitCandidate,
};
pub use report::{build_report, VerificationInput};
pub use usage::{
    classify_usage, classify_usage_traced, normalize_usage_label, ClassifierTrace, UsageCategory,
    UsageJudgment,
};
pub use validator::{compare_field, ComparisonRule};

use shared_types::{ReportError, ValidationReport};

/// Entry point tying the pieces together for one verification run.
pub struct ReconEngine;

impl ReconEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run the full cross-source verification and return the field report.
    pub fn verify(&self, input: &VerificationInput) -> Result<ValidationReport, ReportError> {
        report::build_report(input)
    }

    /// Reconcile one reported area against a registry table.
    pub fn reconcile_area(
        &self,
        ctx: &ReconciliationContext,
        table: &AreaTable,
    ) -> LeaseComparison {
        reconcile::reconcile_area(ctx, table)
    }

    /// Classify one usage label.
    pub fn classify_usage(&self, label: &str, area_m2: Option<f64>) -> UsageJudgment {
        usage::classify_usage(label, area_m2)
    }
}

impl Default for ReconEngine {
    fn default() -> Self {
        Self::new()
    }
}
