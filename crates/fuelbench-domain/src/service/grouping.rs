//! Peer-group key strategies
//!
//! The same fleet is benchmarked under different conventions depending on the
//! segment, so the grouping rule is a parameter of the benchmark run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::Unit;
use fuelbench_types::EquipmentCategory;

/// Group for anything that fits no other cohort
pub const OTHER_GROUP: &str = "Lainnya";

/// Single cohort used by the fleet-wide strategy
pub const FLEET_GROUP: &str = "Seluruh Armada";

/// Grouping strategy without its data, as named in presets and config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingKind {
    CategoryBracket,
    CategoryCapacity,
    PowerRating,
    KpiLabel,
    Fleet,
}

impl std::fmt::Display for GroupingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GroupingKind::CategoryBracket => "category-bracket",
            GroupingKind::CategoryCapacity => "category-capacity",
            GroupingKind::PowerRating => "power-rating",
            GroupingKind::KpiLabel => "kpi-label",
            GroupingKind::Fleet => "fleet",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupingStrategy {
    /// Category with the organisation's capacity brackets
    CategoryBracket,
    /// Category crossed with exact rated capacity
    CategoryCapacity,
    /// Power rating in horsepower
    PowerRating,
    /// Externally assigned KPI group, keyed by canonical unit key
    KpiLabel(BTreeMap<String, String>),
    /// Whole fleet as one cohort
    Fleet,
}

impl GroupingStrategy {
    pub fn kind(&self) -> GroupingKind {
        match self {
            GroupingStrategy::CategoryBracket => GroupingKind::CategoryBracket,
            GroupingStrategy::CategoryCapacity => GroupingKind::CategoryCapacity,
            GroupingStrategy::PowerRating => GroupingKind::PowerRating,
            GroupingStrategy::KpiLabel(_) => GroupingKind::KpiLabel,
            GroupingStrategy::Fleet => GroupingKind::Fleet,
        }
    }

    pub fn group_key(&self, unit: &Unit) -> String {
        match self {
            GroupingStrategy::CategoryBracket => capacity_bracket(unit.category, unit.capacity).to_string(),
            GroupingStrategy::CategoryCapacity => {
                format!("{} ({}T)", unit.category.label(), unit.capacity)
            }
            GroupingStrategy::PowerRating => power_group(unit.power_hp),
            GroupingStrategy::KpiLabel(labels) => labels
                .get(&unit.key)
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .unwrap_or(OTHER_GROUP)
                .to_string(),
            GroupingStrategy::Fleet => FLEET_GROUP.to_string(),
        }
    }
}

/// Benchmark group of the category-bracket convention.
///
/// Unknown forklift capacity (0) falls into the 3-8 ton bracket.
pub fn capacity_bracket(category: EquipmentCategory, capacity: u32) -> &'static str {
    match category {
        EquipmentCategory::Forklift => match capacity {
            0 | 3..=8 => "Forklift (Capacity 3-8)",
            c if c >= 10 => "Forklift (Capacity 10, 28, 32)",
            _ => "Forklift (Lainnya)",
        },
        EquipmentCategory::ReachStacker => "Reach Stacker",
        EquipmentCategory::TopSideLoader => "Top Loader & Side Loader",
        EquipmentCategory::Crane => match capacity {
            c if c >= 70 => "Crane (Capacity 75, 80, 127)",
            c if c >= 40 => "Crane (Capacity 41)",
            _ => "Crane (Lainnya)",
        },
        EquipmentCategory::TrailerTronton => "Trailer/Tronton",
        EquipmentCategory::Other => OTHER_GROUP,
    }
}

fn power_group(power_hp: f64) -> String {
    if power_hp <= 0.0 || power_hp.is_nan() {
        return OTHER_GROUP.to_string();
    }
    if power_hp.fract() == 0.0 {
        format!("{} HP", power_hp as i64)
    } else {
        format!("{:.1} HP", power_hp)
    }
}
