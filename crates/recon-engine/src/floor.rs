//! Floor-reference normalization and registry label matching.
//!
//! The registry and the listing sources spell the same floor a dozen ways:
//! "지하1층", "지1", "B1", "-1", "지상1", "1층 일부", "1F", or a bare "4".
//! Every label is folded into a signed canonical level before any comparison
//! happens, so the rest of the engine never touches raw floor strings.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Basement forms, in recognition priority: "지하1층"/"지하 1" anywhere,
    // then leading "지1층", "B1"/"b1", "-1".
    static ref BASEMENT_FULL: Regex = Regex::new(r"지하\s*(\d+)").unwrap();
    static ref BASEMENT_SHORT: Regex = Regex::new(r"^지\s*(\d+)").unwrap();
    static ref BASEMENT_LETTER: Regex = Regex::new(r"^[Bb]\s*(\d+)").unwrap();
    static ref BASEMENT_MINUS: Regex = Regex::new(r"^-\s*(\d+)").unwrap();

    // Above-ground forms: "지상1"/"지상1층" anywhere, "4층", "4F", bare "4".
    static ref GROUND_PREFIXED: Regex = Regex::new(r"지상\s*(\d+)").unwrap();
    static ref GROUND_SUFFIXED: Regex = Regex::new(r"(\d+)\s*(?:층|[Ff])").unwrap();
    static ref GROUND_BARE: Regex = Regex::new(r"^(\d+)$").unwrap();
}

/// Canonical floor reference: above-ground floor N or basement floor N,
/// both counted from 1. A label that carries no recognizable floor number
/// normalizes to `Unknown`, never to level zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorReference {
    Ground(u32),
    Basement(u32),
    Unknown,
}

impl FloorReference {
    /// Normalize a label, falling back to `Unknown` when nothing parses.
    pub fn parse(label: &str) -> Self {
        parse_floor(label).unwrap_or(FloorReference::Unknown)
    }

    /// Signed level: positive above ground, negative basement.
    pub fn level(self) -> Option<i32> {
        match self {
            FloorReference::Ground(n) => Some(n as i32),
            FloorReference::Basement(n) => Some(-(n as i32)),
            FloorReference::Unknown => None,
        }
    }

    pub fn from_level(level: i32) -> Self {
        match level {
            0 => FloorReference::Unknown,
            n if n > 0 => FloorReference::Ground(n as u32),
            n => FloorReference::Basement(n.unsigned_abs()),
        }
    }

    pub fn is_basement(self) -> bool {
        matches!(self, FloorReference::Basement(_))
    }
}

impl std::fmt::Display for FloorReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FloorReference::Ground(n) => write!(f, "{n}층"),
            FloorReference::Basement(n) => write!(f, "지하{n}층"),
            FloorReference::Unknown => write!(f, "층수미상"),
        }
    }
}

/// Parse a floor label into a canonical reference.
///
/// Basement markers are checked before above-ground forms so that "지하1층"
/// never reads as a first floor. Returns `None` when the label carries no
/// digits, and for level zero, which no registry writes.
pub fn parse_floor(label: &str) -> Option<FloorReference> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    for pattern in [
        &*BASEMENT_FULL,
        &*BASEMENT_SHORT,
        &*BASEMENT_LETTER,
        &*BASEMENT_MINUS,
    ] {
        if let Some(n) = capture_level(pattern, label) {
            return Some(FloorReference::Basement(n));
        }
    }

    for pattern in [&*GROUND_PREFIXED, &*GROUND_SUFFIXED, &*GROUND_BARE] {
        if let Some(n) = capture_level(pattern, label) {
            return Some(FloorReference::Ground(n));
        }
    }

    None
}

fn capture_level(pattern: &Regex, label: &str) -> Option<u32> {
    pattern
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// Does a registry floor label denote the target floor?
///
/// Tolerates registry decorations ("지상1", "1층 일부", "1F") as long as the
/// basement/above-ground polarity and the numeric level agree exactly. The
/// digit run is consumed whole, so "11층" can never fuzzy-match level 1.
pub fn match_floor(target: FloorReference, registry_label: &str) -> bool {
    let Some(level) = target.level() else {
        return false;
    };
    let label = registry_label.trim();
    if label.is_empty() {
        return false;
    }

    if let Some(parsed) = parse_floor(label) {
        return parsed.level() == Some(level);
    }

    // Labels the strict parser rejects ("4 일부") still match when the digit
    // run and the basement polarity both agree.
    let digits: String = label.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return false;
    }
    let has_basement_marker =
        label.contains("지하") || label.starts_with('-') || label.to_lowercase().contains('b');
    if target.is_basement() != has_basement_marker {
        return false;
    }
    digits == level.unsigned_abs().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basement_labels() {
        for label in ["지하1층", "지하 1층", "지하1", "지1층", "지1", "B1", "b1", "B1F", "-1", "-1층"] {
            assert_eq!(
                parse_floor(label),
                Some(FloorReference::Basement(1)),
                "label: {label}"
            );
        }
        assert_eq!(parse_floor("지하2층"), Some(FloorReference::Basement(2)));
    }

    #[test]
    fn test_parse_ground_labels() {
        for label in ["4층", "4", "4F", "지상4", "지상 4층"] {
            assert_eq!(
                parse_floor(label),
                Some(FloorReference::Ground(4)),
                "label: {label}"
            );
        }
        assert_eq!(parse_floor("11층"), Some(FloorReference::Ground(11)));
    }

    #[test]
    fn test_parse_rejects_labels_without_digits() {
        assert_eq!(parse_floor(""), None);
        assert_eq!(parse_floor("옥탑"), None);
        assert_eq!(parse_floor("지하"), None);
    }

    #[test]
    fn test_parse_rejects_level_zero() {
        assert_eq!(parse_floor("0층"), None);
        assert_eq!(parse_floor("0"), None);
    }

    #[test]
    fn test_ground_prefix_is_not_a_basement_marker() {
        // "지상1" starts with 지 but the short basement form must not fire.
        assert_eq!(parse_floor("지상1"), Some(FloorReference::Ground(1)));
    }

    #[test]
    fn test_match_floor_tolerates_registry_decorations() {
        let first = FloorReference::Ground(1);
        assert!(match_floor(first, "1층"));
        assert!(match_floor(first, "지상1"));
        assert!(match_floor(first, "1층 일부"));
        assert!(match_floor(first, "1F"));
        assert!(match_floor(first, "1"));
    }

    #[test]
    fn test_match_floor_rejects_prefix_false_positives() {
        assert!(!match_floor(FloorReference::Ground(1), "11층"));
        assert!(!match_floor(FloorReference::Ground(1), "21층"));
        assert!(match_floor(FloorReference::Ground(11), "11층"));
    }

    #[test]
    fn test_match_floor_keeps_polarity_apart() {
        assert!(match_floor(FloorReference::Basement(1), "지하1층"));
        assert!(match_floor(FloorReference::Basement(1), "B1"));
        assert!(!match_floor(FloorReference::Basement(1), "1층"));
        assert!(!match_floor(FloorReference::Ground(1), "지하1층"));
    }

    #[test]
    fn test_match_floor_unknown_target_never_matches() {
        assert!(!match_floor(FloorReference::Unknown, "1층"));
    }

    #[test]
    fn test_level_round_trip() {
        assert_eq!(FloorReference::Ground(4).level(), Some(4));
        assert_eq!(FloorReference::Basement(2).level(), Some(-2));
        assert_eq!(FloorReference::from_level(-2), FloorReference::Basement(2));
        assert_eq!(FloorReference::from_level(0), FloorReference::Unknown);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for floor in [FloorReference::Ground(7), FloorReference::Basement(3)] {
            assert_eq!(parse_floor(&floor.to_string()), Some(floor));
        }
    }
}
