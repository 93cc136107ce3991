//! Cross-source field comparison
//!
//! One logical field, up to three sources, one explainable verdict. The
//! comparison never resolves a disagreement in favor of a source; it names
//! the dissenter and leaves the decision to a human.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{FieldComparison, FieldStatus, SourceKind};

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"-?\d+(?:\.\d+)?").unwrap();
}

/// String normalizer applied to both sides before comparison.
pub type Normalizer = fn(&str) -> String;

/// How two values of a field are compared.
#[derive(Debug, Clone, Copy)]
pub enum ComparisonRule {
    /// Numbers agree within `match_pct` percent; disagreements inside
    /// `warn_pct` surface as warnings instead of mismatches.
    NumericEquality { match_pct: f64, warn_pct: f64 },
    StringEquality { normalize: Normalizer },
    /// Folds cardinal-direction suffixes ("남동향" vs "남동") before comparing.
    DirectionEquality,
    /// Values must be equal and drawn from a closed set.
    SetMembership(&'static [&'static str]),
}

impl ComparisonRule {
    /// Exact numeric equality, any difference is a mismatch.
    pub fn numeric_exact() -> Self {
        ComparisonRule::NumericEquality {
            match_pct: 0.0,
            warn_pct: 0.0,
        }
    }

    /// The area bands used throughout: under 1% is a match, under 5% a
    /// warning, beyond that a mismatch.
    pub fn numeric_area() -> Self {
        ComparisonRule::NumericEquality {
            match_pct: 1.0,
            warn_pct: 5.0,
        }
    }

    /// Numeric comparison that never escalates past a warning.
    pub fn numeric_advisory() -> Self {
        ComparisonRule::NumericEquality {
            match_pct: 0.0,
            warn_pct: f64::INFINITY,
        }
    }

    pub fn string_exact() -> Self {
        ComparisonRule::StringEquality {
            normalize: |s| s.trim().to_string(),
        }
    }
}

/// How one pair of values relates under a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairLevel {
    Equal,
    Near,
    Different,
}

fn pair_level(a: &str, b: &str, rule: ComparisonRule) -> PairLevel {
    match rule {
        ComparisonRule::NumericEquality {
            match_pct,
            warn_pct,
        } => {
            let (Some(x), Some(y)) = (parse_number(a), parse_number(b)) else {
                return PairLevel::Different;
            };
            let base = x.abs().max(y.abs());
            if base == 0.0 {
                return PairLevel::Equal;
            }
            let diff_pct = (x - y).abs() / base * 100.0;
            if diff_pct <= match_pct {
                PairLevel::Equal
            } else if diff_pct < warn_pct {
                PairLevel::Near
            } else {
                PairLevel::Different
            }
        }
        ComparisonRule::StringEquality { normalize } => {
            if normalize(a) == normalize(b) {
                PairLevel::Equal
            } else {
                PairLevel::Different
            }
        }
        ComparisonRule::DirectionEquality => {
            if fold_direction(a) == fold_direction(b) {
                PairLevel::Equal
            } else {
                PairLevel::Different
            }
        }
        ComparisonRule::SetMembership(allowed) => {
            let (a, b) = (a.trim(), b.trim());
            if a != b {
                PairLevel::Different
            } else if allowed.contains(&a) {
                PairLevel::Equal
            } else {
                // Equal but outside the closed set: suspicious, not wrong.
                PairLevel::Near
            }
        }
    }
}

/// First number in the string, tolerating units and thousands separators.
fn parse_number(s: &str) -> Option<f64> {
    let cleaned = s.replace(',', "");
    NUMBER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn fold_direction(s: &str) -> String {
    s.trim().replace('향', "")
}

/// Compare one logical field across up to three sources.
///
/// Status derivation:
/// - fewer than two sources carry a value → `Info`;
/// - two values: equal → `Match`, near → `Warning`, else `Mismatch`;
/// - three values: all pairs equal → `Match`; exactly one pair equal →
///   `Mismatch` naming the dissenting source; no pair equal → `Mismatch`
///   ("all three differ"); two pairs equal (tolerance is not transitive) →
///   `Warning`.
///
/// An absent source never downgrades the status of the sources that are
/// present; it only lowers confidence, which the message notes.
pub fn compare_field(
    name: &str,
    values: BTreeMap<SourceKind, Option<String>>,
    rule: ComparisonRule,
) -> FieldComparison {
    let present: Vec<(SourceKind, &str)> = values
        .iter()
        .filter_map(|(kind, value)| value.as_deref().map(|v| (*kind, v)))
        .collect();

    let (status, message) = match present.len() {
        0 => (
            FieldStatus::Info,
            "no source carries a value for this field".to_string(),
        ),
        1 => (
            FieldStatus::Info,
            format!(
                "only the {} carries a value; nothing to compare against",
                present[0].0
            ),
        ),
        2 => two_way(&present, rule),
        _ => three_way(&present, rule),
    };

    FieldComparison {
        field_name: name.to_string(),
        values,
        status,
        message,
    }
}

fn two_way(present: &[(SourceKind, &str)], rule: ComparisonRule) -> (FieldStatus, String) {
    let (first, second) = (present[0], present[1]);
    match pair_level(first.1, second.1, rule) {
        PairLevel::Equal => (
            FieldStatus::Match,
            format!("{} and {} agree (third source absent)", first.0, second.0),
        ),
        PairLevel::Near => (
            FieldStatus::Warning,
            format!(
                "{} and {} differ slightly; check which figure is authoritative",
                first.0, second.0
            ),
        ),
        PairLevel::Different => (
            FieldStatus::Mismatch,
            format!("{} and {} disagree", first.0, second.0),
        ),
    }
}

fn three_way(present: &[(SourceKind, &str)], rule: ComparisonRule) -> (FieldStatus, String) {
    let pairs = [(0, 1), (0, 2), (1, 2)];
    let levels: Vec<PairLevel> = pairs
        .iter()
        .map(|&(i, j)| pair_level(present[i].1, present[j].1, rule))
        .collect();
    let equal_count = levels.iter().filter(|l| **l == PairLevel::Equal).count();

    match equal_count {
        3 => (FieldStatus::Match, "all three sources agree".to_string()),
        2 => (
            FieldStatus::Warning,
            "sources agree only pairwise within tolerance; verify the figures".to_string(),
        ),
        1 => {
            let (i, j) = pairs[levels.iter().position(|l| *l == PairLevel::Equal).unwrap()];
            let dissenter = (0..3).find(|k| *k != i && *k != j).unwrap();
            (
                FieldStatus::Mismatch,
                format!(
                    "the {} disagrees with the {} and the {}",
                    present[dissenter].0, present[i].0, present[j].0
                ),
            )
        }
        _ => (FieldStatus::Mismatch, "all three sources differ".to_string()),
    }
}
