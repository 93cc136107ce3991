//! Area reconciliation against the registry
//!
//! Given a target floor/unit and the area the broker reported, pick the
//! registry rows that describe that unit, compare areas, and infer whether
//! the lease covers the whole registered unit or only part of it. When the
//! evidence is thin the result says so: a not-found comes back with enough
//! diagnostics for a human to spot the typo, never as a synthetic zero.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::area::{AreaRecord, AreaTable};
use crate::floor::FloorReference;

/// Relative difference treated as an exact match, in percent.
const EXACT_MATCH_PCT: f64 = 0.1;
/// A reported area this much smaller than the registry area reads as a
/// partial lease, in percent.
const SPLIT_LEASE_PCT: f64 = 10.0;
/// A reported contract area may exceed the registry area by measurement
/// slack only.
const CONTRACT_SLACK_RATIO: f64 = 1.01;
/// Absolute tolerance when recommending between the whole-floor sum and a
/// single unit, in m².
const RECOMMEND_TOLERANCE_M2: f64 = 5.0;

/// Everything one reconciliation run needs, passed explicitly. Caller
/// choices (the unit the broker named, the contract area if one was given)
/// are constructor inputs, not session state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationContext {
    pub floor: FloorReference,
    pub unit_label: Option<String>,
    /// Exclusive area the source reported, m².
    pub reported_area_m2: f64,
    /// Contract (shared-inclusive) area, when the source reported one.
    pub contract_area_m2: Option<f64>,
}

impl ReconciliationContext {
    pub fn new(floor: FloorReference, reported_area_m2: f64) -> Self {
        Self {
            floor,
            unit_label: None,
            reported_area_m2,
            contract_area_m2: None,
        }
    }

    pub fn with_unit(mut self, unit_label: impl Into<String>) -> Self {
        self.unit_label = Some(unit_label.into());
        self
    }

    pub fn with_contract_area(mut self, contract_area_m2: f64) -> Self {
        self.contract_area_m2 = Some(contract_area_m2);
        self
    }
}

/// Whole-unit vs. split-unit lease inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseType {
    /// 통임대: the reported area covers the registered unit.
    WholeUnit,
    /// 분할임대: the reported area covers only part of it.
    SplitUnit,
    /// Ambiguous; the caller must confirm instead of auto-deciding.
    Undetermined,
}

impl std::fmt::Display for LeaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeaseType::WholeUnit => "통임대",
            LeaseType::SplitUnit => "분할임대",
            LeaseType::Undetermined => "확인필요",
        };
        write!(f, "{s}")
    }
}

/// One registry row that survived selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitCandidate {
    pub unit_label: Option<String>,
    pub usage_label: String,
    pub area_m2: f64,
}

impl UnitCandidate {
    fn from_record(record: &AreaRecord) -> Self {
        Self {
            unit_label: record.unit_label.clone(),
            usage_label: record.usage_label.clone(),
            area_m2: record.area_m2,
        }
    }
}

/// Which candidate the reported area points at, when several survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaChoice {
    WholeFloor,
    /// Index into [`LeaseComparison::candidates`].
    Unit(usize),
}

/// Diagnostics for the not-found case: what the table actually contains,
/// in the registry's own spelling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchHints {
    pub available_floors: Vec<String>,
    pub units_by_floor: BTreeMap<String, Vec<String>>,
    /// Rows whose unit number matches the target on a different floor, a
    /// common transcription error worth surfacing.
    pub same_unit_other_floors: Vec<String>,
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaseComparison {
    pub reported_area_m2: f64,
    pub registry_area_m2: Option<f64>,
    pub diff_m2: f64,
    pub diff_pct: f64,
    pub lease_type: LeaseType,
    /// No eligible registry row matched the requested floor/unit.
    pub not_found: bool,
    /// `registry_area_m2` is the sum of several exclusive rows on the floor.
    pub whole_floor: bool,
    pub candidates: Vec<UnitCandidate>,
    /// Which candidate the reported area matches within ±5 m², if any.
    pub recommended: Option<AreaChoice>,
    /// The reported contract area exceeds the matched registry area by more
    /// than measurement slack; contract and exclusive may be swapped.
    pub input_error_detected: bool,
    /// Suggested exclusive area for the swap.
    pub suggested_swap_m2: Option<f64>,
    pub hints: SearchHints,
}

impl LeaseComparison {
    fn not_found(ctx: &ReconciliationContext, hints: SearchHints) -> Self {
        Self {
            reported_area_m2: ctx.reported_area_m2,
            registry_area_m2: None,
            diff_m2: 0.0,
            diff_pct: 0.0,
            lease_type: LeaseType::Undetermined,
            not_found: true,
            whole_floor: false,
            candidates: Vec::new(),
            recommended: None,
            input_error_detected: false,
            suggested_swap_m2: None,
            hints,
        }
    }
}

/// Reconcile a reported area against the registry table. Convenience form
/// of [`reconcile_area`] for callers without a contract area.
pub fn reconcile(
    target_floor: FloorReference,
    target_unit: Option<&str>,
    reported_area_m2: f64,
    table: &AreaTable,
) -> LeaseComparison {
    let mut ctx = ReconciliationContext::new(target_floor, reported_area_m2);
    if let Some(unit) = target_unit {
        ctx = ctx.with_unit(unit);
    }
    reconcile_area(&ctx, table)
}

/// Reconcile a reported area against the registry table.
///
/// Selection: exclusive, non-staircase rows on the matching floor; narrowed
/// to the named unit when one is given, falling back to the whole floor when
/// the unit is absent from the registry (collective units). One survivor is
/// the unit's area; several are summed as the whole-floor candidate with
/// each row kept individually, the choice deferred to the caller.
pub fn reconcile_area(ctx: &ReconciliationContext, table: &AreaTable) -> LeaseComparison {
    let hints = collect_hints(ctx, table);

    let mut selected: Vec<&AreaRecord> = table.lettable_rows_on_floor(ctx.floor).collect();

    if let Some(unit) = ctx.unit_label.as_deref() {
        let unit_matched: Vec<&AreaRecord> = selected
            .iter()
            .copied()
            .filter(|r| {
                r.unit_label
                    .as_deref()
                    .is_some_and(|u| unit_labels_equal(unit, u))
            })
            .collect();
        if unit_matched.is_empty() {
            // Collective unit: the registry often has no per-unit rows for
            // the floor the broker subdivided. Keep the floor's rows.
            debug!(unit, "no registry row for unit, falling back to the whole floor");
        } else {
            selected = unit_matched;
        }
    }

    if selected.is_empty() {
        debug!(floor = %ctx.floor, "no eligible registry row on the requested floor");
        return LeaseComparison::not_found(ctx, hints);
    }

    let candidates: Vec<UnitCandidate> = selected.iter().map(|r| UnitCandidate::from_record(r)).collect();
    let whole_floor = candidates.len() > 1;
    let registry_area: f64 = candidates.iter().map(|c| c.area_m2).sum();
    let recommended = recommend(ctx.reported_area_m2, whole_floor, registry_area, &candidates);

    let diff_m2 = (ctx.reported_area_m2 - registry_area).abs();
    let diff_pct = if registry_area > 0.0 {
        diff_m2 / registry_area * 100.0
    } else {
        0.0
    };

    let lease_type = if diff_pct < EXACT_MATCH_PCT {
        LeaseType::WholeUnit
    } else if ctx.reported_area_m2 < registry_area && diff_pct >= SPLIT_LEASE_PCT {
        LeaseType::SplitUnit
    } else {
        LeaseType::Undetermined
    };

    // Input-sanity pass: a contract area larger than the registered area
    // usually means the reporter transposed contract and exclusive.
    let input_error_detected = ctx
        .contract_area_m2
        .is_some_and(|contract| contract > registry_area * CONTRACT_SLACK_RATIO);
    let suggested_swap_m2 = input_error_detected.then_some(ctx.reported_area_m2);

    debug!(
        registry_area,
        diff_m2,
        diff_pct,
        lease = %lease_type,
        whole_floor,
        "area reconciliation complete"
    );

    LeaseComparison {
        reported_area_m2: ctx.reported_area_m2,
        registry_area_m2: Some(registry_area),
        diff_m2,
        diff_pct,
        lease_type,
        not_found: false,
        whole_floor,
        candidates,
        recommended,
        input_error_detected,
        suggested_swap_m2,
        hints,
    }
}

fn recommend(
    reported: f64,
    whole_floor: bool,
    total: f64,
    candidates: &[UnitCandidate],
) -> Option<AreaChoice> {
    if !whole_floor {
        return None;
    }
    if (reported - total).abs() <= RECOMMEND_TOLERANCE_M2 {
        return Some(AreaChoice::WholeFloor);
    }
    candidates
        .iter()
        .position(|c| (reported - c.area_m2).abs() <= RECOMMEND_TOLERANCE_M2)
        .map(AreaChoice::Unit)
}

/// Collect what the table holds, for the humans who resolve not-founds.
fn collect_hints(ctx: &ReconciliationContext, table: &AreaTable) -> SearchHints {
    let mut hints = SearchHints::default();
    for record in table.rows() {
        if !record.is_exclusive || record.is_staircase {
            continue;
        }
        if !hints.available_floors.contains(&record.floor_label) {
            hints.available_floors.push(record.floor_label.clone());
        }
        if let Some(unit) = &record.unit_label {
            let units = hints
                .units_by_floor
                .entry(record.floor_label.clone())
                .or_default();
            if !units.contains(unit) {
                units.push(unit.clone());
            }
            if let Some(target_unit) = ctx.unit_label.as_deref() {
                if unit_labels_equal(target_unit, unit)
                    && !crate::floor::match_floor(ctx.floor, &record.floor_label)
                {
                    hints
                        .same_unit_other_floors
                        .push(format!("{} {}", record.floor_label, unit));
                }
            }
        }
    }
    hints.available_floors.sort();
    for units in hints.units_by_floor.values_mut() {
        units.sort();
    }
    hints
}

/// Unit labels match when their digit runs agree after the trailing "호"
/// suffix is stripped; labels without digits fall back to exact equality.
pub(crate) fn unit_labels_equal(a: &str, b: &str) -> bool {
    let a = normalize_unit_label(a);
    let b = normalize_unit_label(b);
    let da = digit_sequence(&a);
    let db = digit_sequence(&b);
    if da.is_empty() || db.is_empty() {
        a == b
    } else {
        da == db
    }
}

fn normalize_unit_label(label: &str) -> String {
    label.trim().trim_end_matches('호').trim().to_string()
}

fn digit_sequence(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
