//! Report assembly
//!
//! Runs the field validator over the full disclosure field set for one
//! verification run: the broker's message, the registry snapshot, and the
//! portal listing export, whichever of the three are present. Registry-side
//! values that only exist per unit (floor, areas, usage) are derived through
//! the floor matcher, the reconciler and the classifier before comparison.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{
    FieldComparison, ListingRecord, RegistrySnapshot, ReportError, SourceKind, SourceRecord,
    ValidationReport,
};
use tracing::debug;

use crate::area::AreaTable;
use crate::floor::{match_floor, parse_floor, FloorReference};
use crate::reconcile::{reconcile_area, LeaseComparison, ReconciliationContext};
use crate::usage::{classify_usage, normalize_usage_label, UsageCategory};
use crate::validator::{compare_field, ComparisonRule};

lazy_static! {
    static ref LOT_NUMBER: Regex = Regex::new(r"\d+(?:-\d+)?").unwrap();
    static ref YEAR: Regex = Regex::new(r"\d{4}").unwrap();
}

/// Everything one verification run compares. Sources that were never
/// collected stay `None` and never downgrade the comparison of the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationInput {
    pub message: Option<ListingRecord>,
    pub listing_export: Option<ListingRecord>,
    pub registry: Option<RegistrySnapshot>,
}

impl VerificationInput {
    /// Sort tagged source records into their slots. When a kind occurs more
    /// than once the last record wins.
    pub fn from_records(records: Vec<SourceRecord>) -> Self {
        let mut input = Self::default();
        for record in records {
            match record {
                SourceRecord::Message(r) => input.message = Some(r),
                SourceRecord::ListingExport(r) => input.listing_export = Some(r),
                SourceRecord::Registry(s) => input.registry = Some(s),
            }
        }
        input
    }

    fn listings(&self) -> impl Iterator<Item = (SourceKind, &ListingRecord)> {
        self.message
            .iter()
            .map(|r| (SourceKind::Message, r))
            .chain(
                self.listing_export
                    .iter()
                    .map(|r| (SourceKind::ListingExport, r)),
            )
    }

    /// The floor the run is about: the first source that names one.
    fn target_floor(&self) -> Option<FloorReference> {
        self.listings()
            .filter_map(|(_, r)| r.floor_label.as_deref())
            .find_map(parse_floor)
    }

    fn target_unit(&self) -> Option<&str> {
        self.listings().find_map(|(_, r)| r.unit_label.as_deref())
    }

    fn reported_exclusive_area(&self) -> Option<f64> {
        self.listings().find_map(|(_, r)| r.exclusive_area_m2)
    }

    fn reported_contract_area(&self) -> Option<f64> {
        self.listings().find_map(|(_, r)| r.contract_area_m2)
    }
}

/// Registry-side values derived for this run.
struct RegistryView {
    lease: Option<LeaseComparison>,
    floor_label: Option<String>,
    usage_name: Option<String>,
}

impl RegistryView {
    fn empty() -> Self {
        Self {
            lease: None,
            floor_label: None,
            usage_name: None,
        }
    }

    fn derive(input: &VerificationInput) -> Self {
        let Some(snapshot) = &input.registry else {
            return Self::empty();
        };
        let Some(floor) = input.target_floor() else {
            debug!("no source names a parseable floor; registry rows cannot be selected");
            return Self::empty();
        };
        let table = AreaTable::from_snapshot(snapshot);

        let lease = input.reported_exclusive_area().map(|reported| {
            let mut ctx = ReconciliationContext::new(floor, reported);
            if let Some(unit) = input.target_unit() {
                ctx = ctx.with_unit(unit);
            }
            if let Some(contract) = input.reported_contract_area() {
                ctx = ctx.with_contract_area(contract);
            }
            reconcile_area(&ctx, &table)
        });

        let floor_label = table
            .rows()
            .iter()
            .find(|r| match_floor(floor, &r.floor_label))
            .map(|r| r.floor_label.clone());

        // Judge the registry's own usage for the selected rows: the matched
        // candidate's label with the registry area, not the broker's words.
        let usage_name = lease
            .as_ref()
            .filter(|l| !l.not_found)
            .and_then(|l| {
                l.candidates.first().map(|c| {
                    let judgment = classify_usage(&c.usage_label, l.registry_area_m2);
                    match judgment.category {
                        UsageCategory::Unclassified => judgment.source_label,
                        category => category.name().to_string(),
                    }
                })
            });

        Self {
            lease,
            floor_label,
            usage_name,
        }
    }
}

/// Build the full validation report for one run.
pub fn build_report(input: &VerificationInput) -> Result<ValidationReport, ReportError> {
    let registry = RegistryView::derive(input);
    let target_floor = input.target_floor();

    let mut rows: Vec<FieldComparison> = Vec::new();

    rows.push(compare_field(
        "소재지",
        three_values(
            input,
            |r| r.address.clone(),
            input
                .registry
                .as_ref()
                .and_then(|s| s.building.address.clone()),
        ),
        ComparisonRule::StringEquality {
            normalize: normalize_address_tail,
        },
    ));

    rows.push(compare_field(
        "보증금",
        three_values(input, |r| r.deposit.map(|d| d.to_string()), None),
        ComparisonRule::numeric_exact(),
    ));

    rows.push(compare_field(
        "월세",
        three_values(input, |r| r.monthly_rent.map(|d| d.to_string()), None),
        ComparisonRule::numeric_exact(),
    ));

    rows.push(compare_field(
        "전용면적",
        three_values(
            input,
            |r| r.exclusive_area_m2.map(format_area),
            registry
                .lease
                .as_ref()
                .and_then(|l| l.registry_area_m2)
                .map(format_area),
        ),
        ComparisonRule::numeric_area(),
    ));

    rows.push(compare_field(
        "계약면적",
        three_values(
            input,
            |r| r.contract_area_m2.map(format_area),
            registry
                .lease
                .as_ref()
                .and_then(|l| l.registry_area_m2)
                .map(format_area),
        ),
        ComparisonRule::numeric_area(),
    ));

    rows.push(compare_field(
        "건축물 용도",
        three_values(
            input,
            |r| r.usage_label.clone(),
            registry.usage_name.clone(),
        ),
        ComparisonRule::StringEquality {
            normalize: normalize_usage_label,
        },
    ));

    rows.push(compare_field(
        "해당 층",
        three_values(
            input,
            |r| {
                r.floor_label
                    .as_deref()
                    .and_then(parse_floor)
                    .map(|f| f.to_string())
            },
            registry
                .floor_label
                .as_deref()
                .and_then(parse_floor)
                .or(target_floor.filter(|_| registry.floor_label.is_some()))
                .map(|floor| floor.to_string()),
        ),
        ComparisonRule::string_exact(),
    ));

    rows.push(compare_field(
        "총층수",
        three_values(
            input,
            |r| r.total_floors.map(|n| n.to_string()),
            input
                .registry
                .as_ref()
                .and_then(|s| s.building.total_floors)
                .map(|n| n.to_string()),
        ),
        ComparisonRule::numeric_exact(),
    ));

    rows.push(compare_field(
        "사용승인일",
        three_values(
            input,
            |r| r.approval_date.map(|d| d.format("%Y-%m-%d").to_string()),
            input
                .registry
                .as_ref()
                .and_then(|s| s.building.approval_date)
                .map(|d| d.format("%Y-%m-%d").to_string()),
        ),
        // The sources rarely agree past the year; compare at year granularity.
        ComparisonRule::StringEquality {
            normalize: normalize_year,
        },
    ));

    rows.push(compare_field(
        "화장실 수",
        three_values(input, |r| r.bathroom_count.map(|n| n.to_string()), None),
        ComparisonRule::numeric_exact(),
    ));

    rows.push(compare_field(
        "주차대수",
        three_values(
            input,
            |r| r.parking_count.map(|n| n.to_string()),
            input
                .registry
                .as_ref()
                .and_then(|s| s.building.parking_count)
                .map(|n| n.to_string()),
        ),
        // A parking delta is worth checking but never blocks a disclosure.
        ComparisonRule::numeric_advisory(),
    ));

    rows.push(compare_field(
        "방향",
        three_values(input, |r| r.direction.clone(), None),
        ComparisonRule::DirectionEquality,
    ));

    rows.push(compare_field(
        "위반건축물",
        three_values(input, |r| r.illegal_building.map(format_illegal), None),
        ComparisonRule::SetMembership(ILLEGAL_FLAGS),
    ));

    ValidationReport::from_rows(rows)
}

const ILLEGAL_FLAGS: &[&str] = &["위반건축물", "해당없음"];

fn format_illegal(flag: bool) -> String {
    if flag { "위반건축물" } else { "해당없음" }.to_string()
}

fn format_area(area: f64) -> String {
    format!("{area:.2}")
}

/// Assemble the per-source value map for one field. Sources that are absent
/// from the input contribute no entry at all; present sources without the
/// field contribute `None`.
fn three_values(
    input: &VerificationInput,
    extract: impl Fn(&ListingRecord) -> Option<String>,
    registry_value: Option<String>,
) -> BTreeMap<SourceKind, Option<String>> {
    let mut values = BTreeMap::new();
    if let Some(record) = &input.message {
        values.insert(SourceKind::Message, extract(record));
    }
    if let Some(record) = &input.listing_export {
        values.insert(SourceKind::ListingExport, extract(record));
    }
    if input.registry.is_some() {
        values.insert(SourceKind::Registry, registry_value);
    }
    values
}

/// Addresses agree when their trailing lot number agrees; administrative
/// prefixes get abbreviated inconsistently across sources.
fn normalize_address_tail(address: &str) -> String {
    LOT_NUMBER
        .find_iter(address)
        .last()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| address.trim().to_string())
}

fn normalize_year(date: &str) -> String {
    YEAR.find(date)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| date.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use shared_types::{BuildingSummary, FieldStatus, RegistryAreaRow};

    fn message() -> ListingRecord {
        ListingRecord {
            address: Some("중구 대안동 70-1".to_string()),
            floor_label: Some("1층".to_string()),
            unit_label: Some("101호".to_string()),
            exclusive_area_m2: Some(44.43),
            usage_label: Some("1종근생".to_string()),
            deposit: Some(500),
            monthly_rent: Some(35),
            bathroom_count: Some(1),
            direction: Some("동향".to_string()),
            illegal_building: Some(false),
            ..Default::default()
        }
    }

    fn listing_export() -> ListingRecord {
        ListingRecord {
            address: Some("대구 중구 대안동 70-1".to_string()),
            floor_label: Some("1층".to_string()),
            exclusive_area_m2: Some(44.43),
            usage_label: Some("제1종 근린생활시설".to_string()),
            deposit: Some(500),
            monthly_rent: Some(35),
            total_floors: Some(5),
            direction: Some("동".to_string()),
            approval_date: NaiveDate::from_ymd_opt(1996, 2, 15),
            ..Default::default()
        }
    }

    fn registry() -> RegistrySnapshot {
        RegistrySnapshot {
            building: BuildingSummary {
                address: Some("대구광역시 중구 대안동 70-1".to_string()),
                total_floors: Some(5),
                approval_date: NaiveDate::from_ymd_opt(1996, 2, 15),
                parking_count: Some(2),
            },
            area_rows: vec![RegistryAreaRow {
                floor_label: "지상1".to_string(),
                unit_label: Some("101호".to_string()),
                is_exclusive: true,
                main_usage: "소매점".to_string(),
                etc_usage: None,
                area_m2: Some(44.43),
            }],
        }
    }

    fn status_of<'a>(report: &'a ValidationReport, field: &str) -> (&'a FieldComparison, FieldStatus) {
        let row = report
            .rows()
            .iter()
            .find(|r| r.field_name == field)
            .unwrap_or_else(|| panic!("missing field {field}"));
        (row, row.status)
    }

    #[test]
    fn test_full_three_source_run() {
        let input = VerificationInput {
            message: Some(message()),
            listing_export: Some(listing_export()),
            registry: Some(registry()),
        };
        let report = build_report(&input).unwrap();

        assert_eq!(status_of(&report, "소재지").1, FieldStatus::Match);
        assert_eq!(status_of(&report, "보증금").1, FieldStatus::Match);
        assert_eq!(status_of(&report, "월세").1, FieldStatus::Match);
        assert_eq!(status_of(&report, "전용면적").1, FieldStatus::Match);
        assert_eq!(status_of(&report, "건축물 용도").1, FieldStatus::Match);
        assert_eq!(status_of(&report, "해당 층").1, FieldStatus::Match);
        assert_eq!(status_of(&report, "총층수").1, FieldStatus::Match);
        assert_eq!(status_of(&report, "사용승인일").1, FieldStatus::Match);
        assert_eq!(status_of(&report, "방향").1, FieldStatus::Match);

        // Only the message knows the bathroom count.
        assert_eq!(status_of(&report, "화장실 수").1, FieldStatus::Info);
    }

    #[test]
    fn test_registry_usage_is_classified_before_comparison() {
        // Registry says 소매점 at 44.43 m² → Type-1; message shorthand "1종근생"
        // and the export's full name must all fold to the same class.
        let input = VerificationInput {
            message: Some(message()),
            listing_export: Some(listing_export()),
            registry: Some(registry()),
        };
        let report = build_report(&input).unwrap();
        let (row, status) = status_of(&report, "건축물 용도");
        assert_eq!(status, FieldStatus::Match);
        assert_eq!(
            row.values[&SourceKind::Registry],
            Some("제1종 근린생활시설".to_string())
        );
    }

    #[test]
    fn test_dissenting_area_is_flagged() {
        let mut export = listing_export();
        export.exclusive_area_m2 = Some(52.89);
        let input = VerificationInput {
            message: Some(message()),
            listing_export: Some(export),
            registry: Some(registry()),
        };
        let report = build_report(&input).unwrap();
        let (row, status) = status_of(&report, "전용면적");
        assert_eq!(status, FieldStatus::Mismatch);
        assert!(row.message.contains("listing export"), "{}", row.message);
    }

    #[test]
    fn test_two_source_run_without_registry() {
        let input = VerificationInput {
            message: Some(message()),
            listing_export: Some(listing_export()),
            registry: None,
        };
        let report = build_report(&input).unwrap();
        // No registry entry appears in any value map.
        for row in report.rows() {
            assert!(!row.values.contains_key(&SourceKind::Registry));
        }
        assert_eq!(status_of(&report, "보증금").1, FieldStatus::Match);
        // Total floors only came from the export.
        assert_eq!(status_of(&report, "총층수").1, FieldStatus::Info);
    }

    #[test]
    fn test_every_field_appears_exactly_once() {
        let input = VerificationInput {
            message: Some(message()),
            listing_export: Some(listing_export()),
            registry: Some(registry()),
        };
        let report = build_report(&input).unwrap();
        let mut names: Vec<_> = report.rows().iter().map(|r| r.field_name.clone()).collect();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), before);
        assert_eq!(report.summary().total, 13);
    }

    #[test]
    fn test_report_serializes_for_presentation() {
        let input = VerificationInput {
            message: Some(message()),
            registry: Some(registry()),
            listing_export: None,
        };
        let report = build_report(&input).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["rows"].is_array());
        assert!(json["summary"]["total"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_floor_mismatch_between_sources() {
        let mut export = listing_export();
        export.floor_label = Some("2층".to_string());
        let input = VerificationInput {
            message: Some(message()),
            listing_export: Some(export),
            registry: Some(registry()),
        };
        let report = build_report(&input).unwrap();
        let (_, status) = status_of(&report, "해당 층");
        assert_eq!(status, FieldStatus::Mismatch);
    }

    #[test]
    fn test_empty_input_yields_all_info_rows() {
        let report = build_report(&VerificationInput::default()).unwrap();
        assert_eq!(report.summary().info, report.summary().total);
    }

    #[test]
    fn test_input_from_tagged_records() {
        let input = VerificationInput::from_records(vec![
            SourceRecord::Message(message()),
            SourceRecord::Registry(registry()),
        ]);
        assert!(input.message.is_some());
        assert!(input.registry.is_some());
        assert!(input.listing_export.is_none());
        assert_eq!(input, VerificationInput {
            message: Some(message()),
            listing_export: None,
            registry: Some(registry()),
        });
    }
}
