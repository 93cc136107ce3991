//! Ordered classification rules for registry usage labels
//!
//! One flat table of (keyword set, area band) → category, evaluated top to
//! bottom with first-match-wins. Rule order is load-bearing: named sales
//! facilities outrank the retail area threshold, specific small-trade rules
//! outrank the large-category sweeps below them, and the PC방 entertainment
//! rule outranks the later sales band for the same keywords. The area
//! thresholds are the ones disclosure practice actually applies; they are
//! not assumed to generalize beyond this table.

use super::category::UsageCategory;

/// Area predicate attached to a rule, in m².
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaBand {
    Any,
    Below(f64),
    AtLeast(f64),
    /// Half-open `[min, max)`.
    Range(f64, f64),
}

impl AreaBand {
    pub fn contains(self, area_m2: f64) -> bool {
        match self {
            AreaBand::Any => true,
            AreaBand::Below(max) => area_m2 < max,
            AreaBand::AtLeast(min) => area_m2 >= min,
            AreaBand::Range(min, max) => area_m2 >= min && area_m2 < max,
        }
    }
}

/// One classification rule: fires when any keyword occurs in the folded,
/// lowercased label, none of the excluded markers occur, and the area falls
/// inside the band.
#[derive(Debug, Clone, Copy)]
pub struct UsageRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub excludes: &'static [&'static str],
    pub band: AreaBand,
    pub category: UsageCategory,
}

impl UsageRule {
    const fn new(
        name: &'static str,
        keywords: &'static [&'static str],
        band: AreaBand,
        category: UsageCategory,
    ) -> Self {
        Self {
            name,
            keywords,
            excludes: &[],
            band,
            category,
        }
    }

    const fn excluding(mut self, excludes: &'static [&'static str]) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn keyword_hit(&self, folded_label: &str) -> bool {
        self.keywords.iter().any(|kw| folded_label.contains(kw))
            && !self.excludes.iter().any(|kw| folded_label.contains(kw))
    }
}

/// Commercial keywords that veto the residential fallback. A unit whose
/// label carries any of these is never a dwelling, whatever else the label
/// says about the building.
pub const COMMERCIAL_KEYWORDS: &[&str] = &[
    "점포",
    "소매점",
    "슈퍼마켓",
    "마트",
    "편의점",
    "상점",
    "매장",
    "사무소",
    "사무실",
    "휴게음식점",
    "일반음식점",
    "카페",
    "커피숍",
    "학원",
    "교습소",
    "노래연습장",
    "의원",
    "병원",
    "미용원",
    "이용원",
];

pub const DETACHED_HOUSING_KEYWORDS: &[&str] = &[
    "단독",
    "단독주택",
    "다중",
    "다중주택",
    "다가구",
    "다가구주택",
    "공관",
];

pub const MULTI_UNIT_HOUSING_KEYWORDS: &[&str] = &[
    "아파트",
    "연립",
    "연립주택",
    "다세대",
    "다세대주택",
    "기숙사",
    "공동주택",
];

const RETAIL_KEYWORDS: &[&str] =
    &["소매점", "슈퍼마켓", "마트", "편의점", "상점", "매장", "일용품"];

const SNACK_BAR_KEYWORDS: &[&str] = &["휴게음식점", "커피숍", "제과점", "카페"];

const OFFICE_KEYWORDS: &[&str] = &["사무소", "중개사무소"];

const ACADEMY_KEYWORDS: &[&str] = &["학원", "교습소"];

const GAME_ROOM_KEYWORDS: &[&str] = &["pc방", "게임장"];

/// Residential rules, applied only when no commercial keyword occurs in the
/// label at all.
pub const RESIDENTIAL_RULES: &[UsageRule] = &[
    UsageRule::new(
        "detached_housing",
        DETACHED_HOUSING_KEYWORDS,
        AreaBand::Any,
        UsageCategory::DetachedHousing,
    ),
    UsageRule::new(
        "multi_unit_housing",
        MULTI_UNIT_HOUSING_KEYWORDS,
        AreaBand::Any,
        UsageCategory::MultiUnitHousing,
    ),
];

/// The commercial/institutional rule ladder. First satisfied rule wins.
pub const USAGE_RULES: &[UsageRule] = &[
    // Named sales facilities win regardless of area.
    UsageRule::new(
        "sales_named",
        &["농수산물도매시장", "대규모점포"],
        AreaBand::Any,
        UsageCategory::Sales,
    ),
    // Retail splits on the 1,000 m² line.
    UsageRule::new(
        "retail_small",
        RETAIL_KEYWORDS,
        AreaBand::Below(1000.0),
        UsageCategory::NeighborhoodType1,
    ),
    UsageRule::new(
        "retail_large",
        RETAIL_KEYWORDS,
        AreaBand::AtLeast(1000.0),
        UsageCategory::Sales,
    ),
    // Snack bars and cafés split on 300 m².
    UsageRule::new(
        "snack_bar_small",
        SNACK_BAR_KEYWORDS,
        AreaBand::Below(300.0),
        UsageCategory::NeighborhoodType1,
    ),
    UsageRule::new(
        "snack_bar_large",
        SNACK_BAR_KEYWORDS,
        AreaBand::AtLeast(300.0),
        UsageCategory::NeighborhoodType2,
    ),
    // Full restaurants are second class whatever the area.
    UsageRule::new(
        "restaurant",
        &["일반음식점"],
        AreaBand::Any,
        UsageCategory::NeighborhoodType2,
    ),
    // Offices: 30 m² and 500 m² lines.
    UsageRule::new(
        "office_small",
        OFFICE_KEYWORDS,
        AreaBand::Below(30.0),
        UsageCategory::NeighborhoodType1,
    ),
    UsageRule::new(
        "office_mid",
        OFFICE_KEYWORDS,
        AreaBand::Range(30.0, 500.0),
        UsageCategory::NeighborhoodType2,
    ),
    UsageRule::new(
        "office_large",
        &["사무소", "금융업소"],
        AreaBand::AtLeast(500.0),
        UsageCategory::Business,
    ),
    // Academies split on 500 m².
    UsageRule::new(
        "academy_small",
        ACADEMY_KEYWORDS,
        AreaBand::Below(500.0),
        UsageCategory::NeighborhoodType2,
    ),
    UsageRule::new(
        "academy_large",
        ACADEMY_KEYWORDS,
        AreaBand::AtLeast(500.0),
        UsageCategory::EducationResearch,
    ),
    UsageRule::new(
        "karaoke",
        &["노래연습장", "노래방"],
        AreaBand::Any,
        UsageCategory::NeighborhoodType2,
    ),
    // Clinics and personal care are first class unconditionally.
    UsageRule::new(
        "clinic",
        &["의원", "치과", "한의원", "산후조리원"],
        AreaBand::Any,
        UsageCategory::NeighborhoodType1,
    ),
    UsageRule::new(
        "personal_care",
        &["이용원", "미용원", "목욕장", "세탁소", "미용실", "이발소"],
        AreaBand::Any,
        UsageCategory::NeighborhoodType1,
    ),
    UsageRule::new(
        "martial_arts_small",
        &["탁구장", "체육도장", "헬스장"],
        AreaBand::Below(500.0),
        UsageCategory::NeighborhoodType1,
    ),
    UsageRule::new(
        "gym_large",
        &["체육도장", "헬스장"],
        AreaBand::AtLeast(500.0),
        UsageCategory::Sports,
    ),
    // A large PC방 reads as entertainment, not sales; this entry must stay
    // above the sales band that names the same keywords.
    UsageRule::new(
        "game_room_small",
        GAME_ROOM_KEYWORDS,
        AreaBand::Below(500.0),
        UsageCategory::NeighborhoodType2,
    ),
    UsageRule::new(
        "game_room_large",
        GAME_ROOM_KEYWORDS,
        AreaBand::AtLeast(500.0),
        UsageCategory::Entertainment,
    ),
    UsageRule::new(
        "public_office_small",
        &["공공업무시설"],
        AreaBand::Below(1000.0),
        UsageCategory::NeighborhoodType1,
    ),
    UsageRule::new(
        "small_venue",
        &["공연장", "종교집회장"],
        AreaBand::Below(500.0),
        UsageCategory::NeighborhoodType2,
    ),
    UsageRule::new(
        "car_dealership_small",
        &["자동차영업소"],
        AreaBand::Below(1000.0),
        UsageCategory::NeighborhoodType2,
    ),
    UsageRule::new(
        "small_trade",
        &["서점", "사진관", "동물병원"],
        AreaBand::Any,
        UsageCategory::NeighborhoodType2,
    ),
    UsageRule::new(
        "massage_parlor",
        &["안마시술소"],
        AreaBand::Any,
        UsageCategory::NeighborhoodType2,
    ),
    UsageRule::new(
        "pub_small",
        &["단란주점"],
        AreaBand::Below(150.0),
        UsageCategory::NeighborhoodType2,
    ),
    UsageRule::new(
        "fitness_small",
        &["운동시설", "체육시설"],
        AreaBand::Below(500.0),
        UsageCategory::NeighborhoodType2,
    ),
    UsageRule::new(
        "gosiwon_small",
        &["고시원"],
        AreaBand::Below(500.0),
        UsageCategory::NeighborhoodType2,
    ),
    UsageRule::new(
        "workshop_small",
        &["제조업소", "수리점"],
        AreaBand::Below(500.0),
        UsageCategory::NeighborhoodType2,
    ),
    // Large categories.
    UsageRule::new(
        "assembly_venue",
        &["공연장", "집회장"],
        AreaBand::AtLeast(300.0),
        UsageCategory::CulturalAssembly,
    ),
    UsageRule::new(
        "assembly_arena",
        &["관람장"],
        AreaBand::AtLeast(1000.0),
        UsageCategory::CulturalAssembly,
    ),
    UsageRule::new(
        "assembly_exhibition",
        &["전시장", "동식물원"],
        AreaBand::Any,
        UsageCategory::CulturalAssembly,
    ),
    UsageRule::new(
        "religious",
        &["종교집회장", "봉안당"],
        AreaBand::AtLeast(300.0),
        UsageCategory::Religious,
    ),
    UsageRule::new(
        "sales_arcade_large",
        &["오락실", "pc방", "게임장"],
        AreaBand::AtLeast(500.0),
        UsageCategory::Sales,
    ),
    UsageRule::new(
        "transportation",
        &["여객자동차터미널", "철도", "공항", "항만시설"],
        AreaBand::Any,
        UsageCategory::Transportation,
    ),
    UsageRule::new(
        "hospital",
        &[
            "병원",
            "종합병원",
            "치과병원",
            "한방병원",
            "격리병원",
            "전염병원",
            "정신병원",
            "요양소",
        ],
        AreaBand::Any,
        UsageCategory::Medical,
    ),
    UsageRule::new(
        "education_research",
        &["학교", "교육원", "연구소", "도서관"],
        AreaBand::Any,
        UsageCategory::EducationResearch,
    ),
    // Private institutes only count when the label does not already place
    // them in a neighborhood facility or a dance hall.
    UsageRule::new(
        "private_institute",
        &["사설강습소"],
        AreaBand::Any,
        UsageCategory::EducationResearch,
    )
    .excluding(&["근생", "무도"]),
    UsageRule::new(
        "welfare",
        &["아동관련시설", "노인복지시설", "사회복지시설"],
        AreaBand::Any,
        UsageCategory::ElderlyAndChildWelfare,
    ),
    UsageRule::new(
        "training",
        &["청소년수련관", "수련원", "야영장", "유스호스텔"],
        AreaBand::Any,
        UsageCategory::Training,
    ),
    UsageRule::new(
        "sports_hall",
        &["탁구장", "체육도장", "볼링장"],
        AreaBand::AtLeast(500.0),
        UsageCategory::Sports,
    ),
    UsageRule::new(
        "sports_arena",
        &["체육관", "운동장"],
        AreaBand::AtLeast(1000.0),
        UsageCategory::Sports,
    ),
    UsageRule::new(
        "business_named",
        &["국가청사", "지자체청사", "오피스텔"],
        AreaBand::Any,
        UsageCategory::Business,
    ),
    UsageRule::new(
        "lodging",
        &["호텔", "여관", "여인숙"],
        AreaBand::Any,
        UsageCategory::Lodging,
    ),
    UsageRule::new(
        "lodging_gosiwon",
        &["고시원"],
        AreaBand::AtLeast(500.0),
        UsageCategory::Lodging,
    ),
    UsageRule::new(
        "entertainment",
        &["유흥음식점", "무도장"],
        AreaBand::Any,
        UsageCategory::Entertainment,
    ),
    UsageRule::new(
        "entertainment_pub",
        &["단란주점"],
        AreaBand::AtLeast(150.0),
        UsageCategory::Entertainment,
    ),
    UsageRule::new(
        "factory",
        &["제조", "가공", "수리"],
        AreaBand::AtLeast(500.0),
        UsageCategory::Factory,
    ),
    UsageRule::new(
        "warehouse",
        &["일반창고", "냉장창고", "냉동창고", "물류터미널"],
        AreaBand::Any,
        UsageCategory::Warehouse,
    ),
    UsageRule::new(
        "hazardous",
        &["주유소", "석유판매소", "액화가스충전소", "위험물제조소"],
        AreaBand::Any,
        UsageCategory::HazardousMaterials,
    ),
    UsageRule::new(
        "automotive",
        &["주차장", "세차장", "폐차장", "검사장", "정비공장", "정비학원"],
        AreaBand::Any,
        UsageCategory::Automotive,
    ),
    UsageRule::new(
        "animal_plant",
        &["축사", "도축장", "작물재배사", "종묘배양시설", "온실"],
        AreaBand::Any,
        UsageCategory::AnimalAndPlant,
    ),
    UsageRule::new(
        "waste",
        &["고물상", "폐기물재활용", "폐기물감량화"],
        AreaBand::Any,
        UsageCategory::WasteProcessing,
    ),
    UsageRule::new(
        "corrections_military",
        &["교정시설", "소년원", "국방시설", "군사시설"],
        AreaBand::Any,
        UsageCategory::CorrectionsAndMilitary,
    ),
    UsageRule::new(
        "broadcasting",
        &["방송국", "촬영소", "통신용시설"],
        AreaBand::Any,
        UsageCategory::Broadcasting,
    ),
    UsageRule::new(
        "power",
        &["발전소"],
        AreaBand::Any,
        UsageCategory::PowerGeneration,
    ),
    // A columbarium inside a religious facility stays religious; the one
    // that reaches this rule is the standalone kind.
    UsageRule::new(
        "cemetery",
        &["화장시설", "봉안당"],
        AreaBand::Any,
        UsageCategory::Cemetery,
    )
    .excluding(&["종교시설"]),
    UsageRule::new(
        "cemetery_annex",
        &["묘지부수건축물"],
        AreaBand::Any,
        UsageCategory::Cemetery,
    ),
    UsageRule::new(
        "tourism_rest",
        &["야외음악당", "야외극장", "어린이회관", "휴게소"],
        AreaBand::Any,
        UsageCategory::TourismRest,
    ),
    UsageRule::new(
        "funeral_hall",
        &["장례식장"],
        AreaBand::Any,
        UsageCategory::FuneralHall,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_band_edges() {
        assert!(AreaBand::Below(1000.0).contains(999.99));
        assert!(!AreaBand::Below(1000.0).contains(1000.0));
        assert!(AreaBand::AtLeast(500.0).contains(500.0));
        assert!(!AreaBand::AtLeast(500.0).contains(499.9));
        assert!(AreaBand::Range(30.0, 500.0).contains(30.0));
        assert!(!AreaBand::Range(30.0, 500.0).contains(500.0));
        assert!(AreaBand::Any.contains(0.0));
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names: Vec<_> = USAGE_RULES
            .iter()
            .chain(RESIDENTIAL_RULES)
            .map(|r| r.name)
            .collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn test_named_sales_rule_precedes_retail_threshold() {
        let sales = USAGE_RULES.iter().position(|r| r.name == "sales_named");
        let retail = USAGE_RULES.iter().position(|r| r.name == "retail_small");
        assert!(sales.unwrap() < retail.unwrap());
    }

    #[test]
    fn test_entertainment_outranks_sales_for_game_rooms() {
        let entertainment = USAGE_RULES
            .iter()
            .position(|r| r.name == "game_room_large")
            .unwrap();
        let sales = USAGE_RULES
            .iter()
            .position(|r| r.name == "sales_arcade_large")
            .unwrap();
        assert!(entertainment < sales);
    }

    #[test]
    fn test_keyword_hit_uses_containment() {
        let rule = &USAGE_RULES[0];
        assert_eq!(rule.name, "sales_named");
        assert!(rule.keyword_hit("기타 대규모점포"));
        assert!(!rule.keyword_hit("소매점"));
    }

    #[test]
    fn test_excludes_veto_a_keyword_hit() {
        let rule = USAGE_RULES
            .iter()
            .find(|r| r.name == "private_institute")
            .unwrap();
        assert!(rule.keyword_hit("사설강습소"));
        assert!(!rule.keyword_hit("사설강습소(근생)"));
        assert!(!rule.keyword_hit("무도 사설강습소"));
    }
}
