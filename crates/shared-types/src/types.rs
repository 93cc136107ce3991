use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One listing as parsed from a free-form source (the broker's message or a
/// portal listing export). Missing fields are `None`, never empty-string
/// sentinels.
///
/// Amounts are in 만원, areas in m². The floor and unit labels are kept as
/// the source wrote them; normalization happens in the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub address: Option<String>,
    pub floor_label: Option<String>,
    pub unit_label: Option<String>,
    pub exclusive_area_m2: Option<f64>,
    pub contract_area_m2: Option<f64>,
    pub usage_label: Option<String>,
    pub deposit: Option<i64>,
    pub monthly_rent: Option<i64>,
    pub bathroom_count: Option<u32>,
    pub direction: Option<String>,
    pub total_floors: Option<u32>,
    pub parking_count: Option<u32>,
    pub approval_date: Option<NaiveDate>,
    pub illegal_building: Option<bool>,
}

/// Building-level fields from the registry title section (표제부).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingSummary {
    pub address: Option<String>,
    pub total_floors: Option<u32>,
    pub approval_date: Option<NaiveDate>,
    pub parking_count: Option<u32>,
}

/// One raw row of registry area data, from either the exclusive-use section
/// (전유부) or the floor-level summary (층별개요).
///
/// `floor_label` is the registry's own spelling ("지상1", "지하1층", "1층 일부").
/// A row whose `area_m2` is missing or not positive carries no usable area
/// and is treated as absent by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryAreaRow {
    pub floor_label: String,
    pub unit_label: Option<String>,
    pub is_exclusive: bool,
    /// Main usage label (주용도).
    pub main_usage: String,
    /// Supplementary usage label (기타용도), often more specific.
    pub etc_usage: Option<String>,
    pub area_m2: Option<f64>,
}

/// Everything the registry client fetched for one resolved building.
/// A reconciliation run requires the snapshot to be fully populated first;
/// partial tables produce spurious not-found results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub building: BuildingSummary,
    pub area_rows: Vec<RegistryAreaRow>,
}

/// Which collaborator produced a value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The broker's free-form listing message.
    Message,
    /// The authoritative building registry.
    Registry,
    /// An independently-entered portal listing export.
    ListingExport,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Message => "message",
            SourceKind::Registry => "registry",
            SourceKind::ListingExport => "listing export",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A parsed record tagged with its source.
///
/// The accessors return building-level fields for every variant; fields that
/// only exist per-unit on the registry side (floor, area, usage) are derived
/// by the engine through reconciliation and return `None` here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SourceRecord {
    Message(ListingRecord),
    ListingExport(ListingRecord),
    Registry(RegistrySnapshot),
}

impl SourceRecord {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceRecord::Message(_) => SourceKind::Message,
            SourceRecord::ListingExport(_) => SourceKind::ListingExport,
            SourceRecord::Registry(_) => SourceKind::Registry,
        }
    }

    fn listing(&self) -> Option<&ListingRecord> {
        match self {
            SourceRecord::Message(r) | SourceRecord::ListingExport(r) => Some(r),
            SourceRecord::Registry(_) => None,
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            SourceRecord::Registry(s) => s.building.address.as_deref(),
            _ => self.listing().and_then(|r| r.address.as_deref()),
        }
    }

    pub fn floor_label(&self) -> Option<&str> {
        self.listing().and_then(|r| r.floor_label.as_deref())
    }

    pub fn unit_label(&self) -> Option<&str> {
        self.listing().and_then(|r| r.unit_label.as_deref())
    }

    pub fn usage_label(&self) -> Option<&str> {
        self.listing().and_then(|r| r.usage_label.as_deref())
    }

    pub fn exclusive_area_m2(&self) -> Option<f64> {
        self.listing().and_then(|r| r.exclusive_area_m2)
    }

    pub fn contract_area_m2(&self) -> Option<f64> {
        self.listing().and_then(|r| r.contract_area_m2)
    }

    pub fn total_floors(&self) -> Option<u32> {
        match self {
            SourceRecord::Registry(s) => s.building.total_floors,
            _ => self.listing().and_then(|r| r.total_floors),
        }
    }

    pub fn approval_date(&self) -> Option<NaiveDate> {
        match self {
            SourceRecord::Registry(s) => s.building.approval_date,
            _ => self.listing().and_then(|r| r.approval_date),
        }
    }

    pub fn parking_count(&self) -> Option<u32> {
        match self {
            SourceRecord::Registry(s) => s.building.parking_count,
            _ => self.listing().and_then(|r| r.parking_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_record_accessors_follow_the_tag() {
        let record = SourceRecord::Message(ListingRecord {
            address: Some("중구 대안동 70-1".to_string()),
            floor_label: Some("4층".to_string()),
            exclusive_area_m2: Some(24.36),
            ..Default::default()
        });
        assert_eq!(record.kind(), SourceKind::Message);
        assert_eq!(record.address(), Some("중구 대안동 70-1"));
        assert_eq!(record.floor_label(), Some("4층"));
        assert_eq!(record.exclusive_area_m2(), Some(24.36));
        assert_eq!(record.total_floors(), None);
    }

    #[test]
    fn test_registry_record_exposes_building_fields_only() {
        let record = SourceRecord::Registry(RegistrySnapshot {
            building: BuildingSummary {
                address: Some("대구 중구 삼덕동2가 122".to_string()),
                total_floors: Some(5),
                ..Default::default()
            },
            area_rows: vec![],
        });
        assert_eq!(record.kind(), SourceKind::Registry);
        assert_eq!(record.address(), Some("대구 중구 삼덕동2가 122"));
        assert_eq!(record.total_floors(), Some(5));
        // Per-unit fields come from reconciliation, never from the snapshot.
        assert_eq!(record.floor_label(), None);
        assert_eq!(record.exclusive_area_m2(), None);
    }

    #[test]
    fn test_source_kind_serializes_as_snake_case_string() {
        assert_eq!(
            serde_json::to_string(&SourceKind::ListingExport).unwrap(),
            "\"listing_export\""
        );
    }
}
