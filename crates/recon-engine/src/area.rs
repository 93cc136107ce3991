//! Registry area rows, normalized
//!
//! `AreaTable` is the engine-side view of one building's fetched area data:
//! every row parsed, staircase rows flagged, rows without a usable area
//! dropped. The table must be fully populated before reconciliation runs;
//! a partial fetch produces spurious not-found results downstream.

use serde::Serialize;
use shared_types::{RegistryAreaRow, RegistrySnapshot};

use crate::floor::{match_floor, FloorReference};
use crate::usage::merge_usage_labels;

/// One normalized registry area row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaRecord {
    pub floor: FloorReference,
    /// The registry's own spelling of the floor, kept for diagnostics.
    pub floor_label: String,
    pub unit_label: Option<String>,
    /// Exclusive-use (전유) rather than shared/common (공용) area.
    pub is_exclusive: bool,
    pub usage_label: String,
    pub area_m2: f64,
    /// Staircase rows are never lettable area.
    pub is_staircase: bool,
}

impl AreaRecord {
    /// Normalize a raw row. Rows without a positive area carry no usable
    /// information and come back as `None`.
    pub fn from_row(row: &RegistryAreaRow) -> Option<Self> {
        let area_m2 = row.area_m2.filter(|a| *a > 0.0)?;
        Some(Self {
            floor: FloorReference::parse(&row.floor_label),
            floor_label: row.floor_label.trim().to_string(),
            unit_label: row
                .unit_label
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            is_exclusive: row.is_exclusive,
            usage_label: merge_usage_labels(&row.main_usage, row.etc_usage.as_deref()),
            area_m2,
            is_staircase: is_staircase(&row.main_usage, row.etc_usage.as_deref()),
        })
    }

    /// Is this row a lettable exclusive-use row on the given floor?
    pub fn lettable_on(&self, floor: FloorReference) -> bool {
        self.is_exclusive && !self.is_staircase && match_floor(floor, &self.floor_label)
    }
}

/// The registry writes either the explicit "계단실" or the bare word "계단"
/// on its own; anything longer ("계단식 구조") is not a staircase row.
fn is_staircase(main: &str, etc: Option<&str>) -> bool {
    let main = main.trim();
    let etc = etc.unwrap_or("").trim();
    main.contains("계단실") || etc.contains("계단실") || main == "계단" || etc == "계단"
}

/// Ordered collection of area rows for one building.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaTable {
    rows: Vec<AreaRecord>,
}

impl AreaTable {
    pub fn from_rows(rows: &[RegistryAreaRow]) -> Self {
        Self {
            rows: rows.iter().filter_map(AreaRecord::from_row).collect(),
        }
    }

    pub fn from_snapshot(snapshot: &RegistrySnapshot) -> Self {
        Self::from_rows(&snapshot.area_rows)
    }

    pub fn rows(&self) -> &[AreaRecord] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// All rows on the given floor, matched against the registry label so
    /// decorated spellings ("지상1", "1층 일부") are found.
    pub fn rows_on_floor(&self, floor: FloorReference) -> impl Iterator<Item = &AreaRecord> {
        self.rows
            .iter()
            .filter(move |r| match_floor(floor, &r.floor_label))
    }

    /// Exclusive-use, non-staircase rows on the given floor: the only rows
    /// eligible to be a unit's own area.
    pub fn lettable_rows_on_floor(&self, floor: FloorReference) -> impl Iterator<Item = &AreaRecord> {
        self.rows.iter().filter(move |r| r.lettable_on(floor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(floor: &str, unit: Option<&str>, exclusive: bool, usage: &str, area: f64) -> RegistryAreaRow {
        RegistryAreaRow {
            floor_label: floor.to_string(),
            unit_label: unit.map(str::to_string),
            is_exclusive: exclusive,
            main_usage: usage.to_string(),
            etc_usage: None,
            area_m2: Some(area),
        }
    }

    #[test]
    fn test_rows_without_positive_area_are_dropped() {
        let rows = vec![
            row("1층", None, true, "소매점", 44.43),
            RegistryAreaRow {
                area_m2: None,
                ..row("2층", None, true, "사무소", 0.0)
            },
            row("3층", None, true, "사무소", 0.0),
            row("3층", None, true, "사무소", -1.0),
        ];
        let table = AreaTable::from_rows(&rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].area_m2, 44.43);
    }

    #[test]
    fn test_staircase_detection() {
        let stairs = AreaRecord::from_row(&row("1층", None, true, "계단실", 8.0)).unwrap();
        assert!(stairs.is_staircase);

        let bare = AreaRecord::from_row(&RegistryAreaRow {
            etc_usage: Some("계단".to_string()),
            ..row("1층", None, true, "", 8.0)
        })
        .unwrap();
        assert!(bare.is_staircase);

        let shop = AreaRecord::from_row(&row("1층", None, true, "소매점", 44.0)).unwrap();
        assert!(!shop.is_staircase);
    }

    #[test]
    fn test_lettable_rows_exclude_shared_and_staircase() {
        let table = AreaTable::from_rows(&[
            row("1층", Some("101호"), true, "소매점", 44.43),
            row("1층", None, false, "복도", 12.0),
            row("1층", None, true, "계단실", 8.0),
            row("2층", Some("201호"), true, "사무소", 40.0),
        ]);
        let lettable: Vec<_> = table
            .lettable_rows_on_floor(FloorReference::Ground(1))
            .collect();
        assert_eq!(lettable.len(), 1);
        assert_eq!(lettable[0].unit_label.as_deref(), Some("101호"));
    }

    #[test]
    fn test_floor_matching_accepts_registry_decorations() {
        let table = AreaTable::from_rows(&[
            row("지상1", None, true, "소매점", 44.43),
            row("지하1층", None, true, "주차장", 120.0),
        ]);
        assert_eq!(table.rows_on_floor(FloorReference::Ground(1)).count(), 1);
        assert_eq!(table.rows_on_floor(FloorReference::Basement(1)).count(), 1);
        assert_eq!(table.rows_on_floor(FloorReference::Ground(2)).count(), 0);
    }

    #[test]
    fn test_supplementary_legal_label_wins_in_merge() {
        let record = AreaRecord::from_row(&RegistryAreaRow {
            etc_usage: Some("제2종 근린생활시설".to_string()),
            ..row("1층", None, true, "점포", 44.0)
        })
        .unwrap();
        assert_eq!(record.usage_label, "제2종 근린생활시설");
    }

    #[test]
    fn test_unit_labels_are_trimmed_and_emptiness_is_none() {
        let record = AreaRecord::from_row(&RegistryAreaRow {
            unit_label: Some("  ".to_string()),
            ..row("1층", None, true, "소매점", 44.0)
        })
        .unwrap();
        assert_eq!(record.unit_label, None);
    }
}
