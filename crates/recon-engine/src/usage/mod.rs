//! Legal-use classification
//!
//! Takes the usage label a source wrote (registry row, broker message,
//! listing export) plus the unit's floor area, and places it in one of the
//! closed statutory categories. Ambiguous labels are never guessed at: a
//! compound "shop and residence" label or an unknown term comes back as
//! `Unclassified` with the original text preserved for a human.

pub mod category;
pub mod rules;

pub use category::UsageCategory;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rules::{COMMERCIAL_KEYWORDS, RESIDENTIAL_RULES, USAGE_RULES};

lazy_static! {
    // Shorthand legal labels: "2종", "제2종근생", "1종 근린생활시설" …
    static ref TYPE2_SHORTHAND: Regex = Regex::new(r"제?2종\s*(?:근린생활시설|근생)?").unwrap();
    static ref TYPE1_SHORTHAND: Regex = Regex::new(r"제?1종\s*(?:근린생활시설|근생)?").unwrap();
    // Digit guards so "12종" or "제3종" never fold into the two classes.
    static ref NOT_TYPE2_DIGITS: Regex = Regex::new(r"[3-9]종|1[0-9]종|2[1-9]종").unwrap();
    static ref NOT_TYPE1_DIGITS: Regex = Regex::new(r"[2-9]종|1[1-9]종|2[0-9]종").unwrap();
}

/// Result of classifying one usage label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageJudgment {
    pub category: UsageCategory,
    /// The label was compound or unknown; a human must confirm before the
    /// disclosure is published.
    pub needs_manual_review: bool,
    /// The label was the bare storefront word "점포": the caller must ask
    /// which neighborhood-facility class applies instead of guessing.
    pub needs_storefront_selection: bool,
    /// The text that produced this judgment, after spelling folds.
    pub source_label: String,
}

impl UsageJudgment {
    fn of(category: UsageCategory, label: &str) -> Self {
        Self {
            category,
            needs_manual_review: false,
            needs_storefront_selection: false,
            source_label: label.to_string(),
        }
    }

    fn review(label: &str) -> Self {
        Self {
            category: UsageCategory::Unclassified,
            needs_manual_review: true,
            needs_storefront_selection: false,
            source_label: label.to_string(),
        }
    }
}

/// Why the classifier decided what it decided. Returned alongside the
/// judgment so tests and callers assert on structure, not log text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifierTrace {
    pub folded_label: String,
    pub area_m2: Option<f64>,
    /// Name of the table rule that decided the outcome, if one fired.
    pub matched_rule: Option<&'static str>,
    /// Rules whose keywords matched but whose area band rejected them.
    pub rejected_rules: Vec<&'static str>,
}

/// Classify a usage label into a legal category. See [`classify_usage_traced`].
pub fn classify_usage(label: &str, area_m2: Option<f64>) -> UsageJudgment {
    classify_usage_traced(label, area_m2).0
}

/// Classify a usage label, also returning the evaluation trace.
///
/// Evaluation order, first hit wins:
/// 1. compound shop+residence labels → manual review, label preserved;
/// 2. the bare storefront label → external disambiguation signal;
/// 3. labels that already name a legal neighborhood class → passthrough;
/// 4. the ordered keyword/area rule table (needs a known area);
/// 5. residential rules, only when no commercial keyword occurs at all;
/// 6. otherwise `Unclassified` with manual review.
pub fn classify_usage_traced(label: &str, area_m2: Option<f64>) -> (UsageJudgment, ClassifierTrace) {
    let folded = fold_office_spelling(label);
    let mut trace = ClassifierTrace {
        folded_label: folded.clone(),
        area_m2,
        ..Default::default()
    };

    if folded.is_empty() {
        return (UsageJudgment::review(&folded), trace);
    }

    // 1. Compound storefront + residence: never pick a side.
    if is_shop_and_residence(&folded) {
        debug!(label = %folded, "compound shop/residence label, deferring to manual review");
        return (UsageJudgment::review(&folded), trace);
    }

    // 2. A bare storefront label cannot be placed without asking.
    if folded == "점포" {
        let judgment = UsageJudgment {
            category: UsageCategory::Unclassified,
            needs_manual_review: false,
            needs_storefront_selection: true,
            source_label: folded.clone(),
        };
        return (judgment, trace);
    }

    // 3. Already a legal neighborhood-facility name.
    if folded.contains("제1종근린생활시설") || folded.contains("제1종 근린생활시설") {
        return (
            UsageJudgment::of(UsageCategory::NeighborhoodType1, &folded),
            trace,
        );
    }
    if folded.contains("제2종근린생활시설") || folded.contains("제2종 근린생활시설") {
        return (
            UsageJudgment::of(UsageCategory::NeighborhoodType2, &folded),
            trace,
        );
    }

    // 4. The rule table. Thresholds need a known area; without one the
    //    label stays unclassified rather than defaulting to a band.
    let Some(area) = area_m2 else {
        debug!(label = %folded, "no area available, cannot apply threshold rules");
        return (UsageJudgment::review(&folded), trace);
    };

    let lowered = folded.to_lowercase();
    for rule in USAGE_RULES {
        if !rule.keyword_hit(&lowered) {
            continue;
        }
        if rule.band.contains(area) {
            debug!(rule = rule.name, category = %rule.category, "usage rule fired");
            trace.matched_rule = Some(rule.name);
            return (UsageJudgment::of(rule.category, &folded), trace);
        }
        trace.rejected_rules.push(rule.name);
    }

    // 5. Residential only when nothing commercial appears anywhere.
    if !has_commercial_keyword(&lowered) {
        for rule in RESIDENTIAL_RULES {
            if rule.keyword_hit(&lowered) {
                trace.matched_rule = Some(rule.name);
                return (UsageJudgment::of(rule.category, &folded), trace);
            }
        }
    }

    // 6. Nothing matched; surface the raw label.
    debug!(label = %folded, "no usage rule matched");
    (UsageJudgment::review(&folded), trace)
}

/// "사무실" and "사무소" are the same use; fold to the registry spelling.
fn fold_office_spelling(label: &str) -> String {
    label.trim().replace("사무실", "사무소")
}

fn is_shop_and_residence(label: &str) -> bool {
    label.contains("점포 및 주택")
        || label.contains("주택 및 점포")
        || (label.contains("점포") && label.contains("주택") && label.contains("및"))
}

fn has_commercial_keyword(lowered_label: &str) -> bool {
    COMMERCIAL_KEYWORDS
        .iter()
        .any(|kw| lowered_label.contains(kw))
}

/// Fold shorthand legal labels to their full statutory names for
/// cross-source comparison: "2종", "제2종근생", "2종 근생" → the full
/// Type-2 name; likewise for Type-1; sales-facility shorthand → "판매시설".
/// Labels that are not shorthand come back unchanged.
pub fn normalize_usage_label(label: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        return String::new();
    }
    if label.contains("판매시설") {
        return UsageCategory::Sales.name().to_string();
    }
    if TYPE2_SHORTHAND.is_match(label) && !NOT_TYPE2_DIGITS.is_match(label) {
        return UsageCategory::NeighborhoodType2.name().to_string();
    }
    if TYPE1_SHORTHAND.is_match(label) && !NOT_TYPE1_DIGITS.is_match(label) {
        return UsageCategory::NeighborhoodType1.name().to_string();
    }
    label.to_string()
}

/// Merge a registry row's main and supplementary usage labels the way the
/// judgment reads them: a supplementary label that names a legal
/// neighborhood class wins outright, otherwise the two are joined.
pub fn merge_usage_labels(main: &str, etc: Option<&str>) -> String {
    let main = main.trim();
    let etc = etc.map(str::trim).filter(|e| !e.is_empty());
    match etc {
        Some(etc)
            if etc.contains("근린생활시설") || etc.contains("제1종") || etc.contains("제2종") =>
        {
            etc.to_string()
        }
        Some(etc) if main.is_empty() => etc.to_string(),
        Some(etc) if etc == main => main.to_string(),
        Some(etc) => format!("{main}, {etc}"),
        None => main.to_string(),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The classifier must never panic, whatever the label.
        #[test]
        fn classify_no_panic(label in "\\PC*", area in proptest::option::of(0.0f64..10_000.0)) {
            let _ = classify_usage(&label, area);
        }

        /// The category is always drawn from the closed set.
        #[test]
        fn category_is_always_set(label in "\\PC{0,40}", area in 0.0f64..10_000.0) {
            let judgment = classify_usage(&label, Some(area));
            let legal = UsageCategory::legal_categories().contains(&judgment.category);
            prop_assert!(legal || judgment.category == UsageCategory::Unclassified);
        }
    }
}
