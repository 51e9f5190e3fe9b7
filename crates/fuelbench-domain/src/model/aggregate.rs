//! Per-unit benchmark results and peer cohorts

use fuelbench_types::{EfficiencyStatus, EquipmentCategory, InactiveReason};
use serde::{Deserialize, Serialize};

/// Benchmark result for one unit in one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitAggregate {
    pub unit: String,
    pub display_name: String,
    pub category: EquipmentCategory,
    pub brand: String,
    pub capacity: u32,
    pub power_hp: f64,
    pub location: Option<String>,
    /// Peer group key; also set for inactive units so they can be filtered alongside their peers
    pub group: String,
    pub total_fuel: f64,
    pub total_work: f64,
    /// None when the unit is inactive
    pub fuel_ratio: Option<f64>,
    /// None when the unit is inactive
    pub benchmark: Option<f64>,
    pub status: EfficiencyStatus,
    /// Litres above the peer benchmark; 0 unless wasteful
    pub potential_waste: f64,
    pub inactive_reason: Option<InactiveReason>,
}

impl UnitAggregate {
    pub fn is_active(&self) -> bool {
        self.status != EfficiencyStatus::Inactive
    }

    /// Monetary value of the potential waste at the given fuel price
    pub fn estimated_loss(&self, fuel_price: f64) -> f64 {
        self.potential_waste * fuel_price
    }

    /// Total spend on fuel at the given price
    pub fn fuel_cost(&self, fuel_price: f64) -> f64 {
        self.total_fuel * fuel_price
    }
}

/// Cohort of active units compared against each other.
///
/// The benchmark is always the median of the members' ratios; it has no setter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerGroup {
    key: String,
    members: Vec<(String, f64)>,
    benchmark: f64,
}

impl PeerGroup {
    /// Build a group from `(unit, fuel ratio)` pairs. Returns None for an empty group.
    pub fn from_members(key: impl Into<String>, members: Vec<(String, f64)>) -> Option<Self> {
        let ratios: Vec<f64> = members.iter().map(|(_, r)| *r).collect();
        let benchmark = median(&ratios)?;
        Some(Self {
            key: key.into(),
            members,
            benchmark,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn benchmark(&self) -> f64 {
        self.benchmark
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Median with the usual mean-of-two rule for even counts. NaN values are ignored.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| a.total_cmp(b));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Some(v[mid])
    } else {
        Some((v[mid - 1] + v[mid]) / 2.0)
    }
}
