//! Legal-use categories for building disclosure
//!
//! The closed set of large categories from 건축법 시행령 별표 1 that a floor
//! or unit must be labeled with, plus `Unclassified` for labels no rule can
//! place. A disclosure never invents a category: anything outside this set
//! is surfaced to a human instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageCategory {
    /// 단독주택
    DetachedHousing,
    /// 공동주택
    MultiUnitHousing,
    /// 제1종 근린생활시설
    NeighborhoodType1,
    /// 제2종 근린생활시설
    NeighborhoodType2,
    /// 문화 및 집회시설
    CulturalAssembly,
    /// 종교시설
    Religious,
    /// 판매시설
    Sales,
    /// 운수시설
    Transportation,
    /// 의료시설
    Medical,
    /// 교육연구시설
    EducationResearch,
    /// 노유자시설
    ElderlyAndChildWelfare,
    /// 수련시설
    Training,
    /// 운동시설
    Sports,
    /// 업무시설
    Business,
    /// 숙박시설
    Lodging,
    /// 위락시설
    Entertainment,
    /// 공장
    Factory,
    /// 창고시설
    Warehouse,
    /// 위험물 저장 및 처리시설
    HazardousMaterials,
    /// 자동차 관련시설
    Automotive,
    /// 동물 및 식물 관련시설
    AnimalAndPlant,
    /// 분뇨 및 쓰레기 처리시설
    WasteProcessing,
    /// 교정 및 군사시설
    CorrectionsAndMilitary,
    /// 방송통신시설
    Broadcasting,
    /// 발전시설
    PowerGeneration,
    /// 묘지 관련 시설
    Cemetery,
    /// 관광 휴게시설
    TourismRest,
    /// 장례식장
    FuneralHall,
    /// No rule matched; the raw label must be shown to a human.
    Unclassified,
}

impl UsageCategory {
    /// Statutory Korean name as printed on disclosure documents.
    pub fn name(&self) -> &'static str {
        match self {
            UsageCategory::DetachedHousing => "단독주택",
            UsageCategory::MultiUnitHousing => "공동주택",
            UsageCategory::NeighborhoodType1 => "제1종 근린생활시설",
            UsageCategory::NeighborhoodType2 => "제2종 근린생활시설",
            UsageCategory::CulturalAssembly => "문화 및 집회시설",
            UsageCategory::Religious => "종교시설",
            UsageCategory::Sales => "판매시설",
            UsageCategory::Transportation => "운수시설",
            UsageCategory::Medical => "의료시설",
            UsageCategory::EducationResearch => "교육연구시설",
            UsageCategory::ElderlyAndChildWelfare => "노유자시설",
            UsageCategory::Training => "수련시설",
            UsageCategory::Sports => "운동시설",
            UsageCategory::Business => "업무시설",
            UsageCategory::Lodging => "숙박시설",
            UsageCategory::Entertainment => "위락시설",
            UsageCategory::Factory => "공장",
            UsageCategory::Warehouse => "창고시설",
            UsageCategory::HazardousMaterials => "위험물 저장 및 처리시설",
            UsageCategory::Automotive => "자동차 관련시설",
            UsageCategory::AnimalAndPlant => "동물 및 식물 관련시설",
            UsageCategory::WasteProcessing => "분뇨 및 쓰레기 처리시설",
            UsageCategory::CorrectionsAndMilitary => "교정 및 군사시설",
            UsageCategory::Broadcasting => "방송통신시설",
            UsageCategory::PowerGeneration => "발전시설",
            UsageCategory::Cemetery => "묘지 관련 시설",
            UsageCategory::TourismRest => "관광 휴게시설",
            UsageCategory::FuneralHall => "장례식장",
            UsageCategory::Unclassified => "확인요망",
        }
    }

    /// The two neighborhood-facility classes carry area-dependent rules and
    /// get compared against each other constantly; everything else does not.
    pub fn is_neighborhood_facility(&self) -> bool {
        matches!(
            self,
            UsageCategory::NeighborhoodType1 | UsageCategory::NeighborhoodType2
        )
    }

    pub fn is_residential(&self) -> bool {
        matches!(
            self,
            UsageCategory::DetachedHousing | UsageCategory::MultiUnitHousing
        )
    }

    /// All 28 statutory categories, in the statute's order.
    pub fn legal_categories() -> &'static [UsageCategory] {
        &[
            UsageCategory::DetachedHousing,
            UsageCategory::MultiUnitHousing,
            UsageCategory::NeighborhoodType1,
            UsageCategory::NeighborhoodType2,
            UsageCategory::CulturalAssembly,
            UsageCategory::Religious,
            UsageCategory::Sales,
            UsageCategory::Transportation,
            UsageCategory::Medical,
            UsageCategory::EducationResearch,
            UsageCategory::ElderlyAndChildWelfare,
            UsageCategory::Training,
            UsageCategory::Sports,
            UsageCategory::Business,
            UsageCategory::Lodging,
            UsageCategory::Entertainment,
            UsageCategory::Factory,
            UsageCategory::Warehouse,
            UsageCategory::HazardousMaterials,
            UsageCategory::Automotive,
            UsageCategory::AnimalAndPlant,
            UsageCategory::WasteProcessing,
            UsageCategory::CorrectionsAndMilitary,
            UsageCategory::Broadcasting,
            UsageCategory::PowerGeneration,
            UsageCategory::Cemetery,
            UsageCategory::TourismRest,
            UsageCategory::FuneralHall,
        ]
    }
}

impl std::fmt::Display for UsageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
