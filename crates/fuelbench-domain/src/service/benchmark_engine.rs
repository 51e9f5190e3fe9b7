//! Peer-group benchmarking and efficiency classification

use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{FuelIntake, PeerGroup, PeriodDelta, Unit, UnitAggregate};
use crate::service::grouping::GroupingStrategy;
use fuelbench_types::{EfficiencyStatus, InactiveReason};

/// Summed fuel and work of one unit over the analysed period
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitTotals {
    pub total_fuel: f64,
    pub total_work: f64,
}

impl UnitTotals {
    pub fn new(total_fuel: f64, total_work: f64) -> Self {
        Self { total_fuel, total_work }
    }

    /// Both fuel and work were recorded
    pub fn is_active(&self) -> bool {
        self.total_fuel > 0.0 && self.total_work > 0.0
    }

    /// Litres per unit of work, None unless active
    pub fn fuel_ratio(&self) -> Option<f64> {
        self.is_active().then(|| self.total_fuel / self.total_work)
    }
}

/// Sum validated deltas per unit, plus fuel logged on dates without a delta
pub fn aggregate_deltas(
    deltas: &[PeriodDelta],
    unpaired_fuel: &[FuelIntake],
) -> BTreeMap<String, UnitTotals> {
    let mut totals: BTreeMap<String, UnitTotals> = BTreeMap::new();
    for delta in deltas {
        let entry = totals.entry(delta.unit.clone()).or_default();
        entry.total_fuel += delta.fuel;
        entry.total_work += delta.work;
    }
    for intake in unpaired_fuel {
        totals.entry(intake.unit.clone()).or_default().total_fuel += intake.litres;
    }
    totals
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BenchmarkOutcome {
    /// Active units first (by group, then ratio), inactive units after
    pub aggregates: Vec<UnitAggregate>,
    pub groups: Vec<PeerGroup>,
}

impl BenchmarkOutcome {
    pub fn active(&self) -> impl Iterator<Item = &UnitAggregate> {
        self.aggregates.iter().filter(|a| a.is_active())
    }

    pub fn inactive(&self) -> impl Iterator<Item = &UnitAggregate> {
        self.aggregates.iter().filter(|a| !a.is_active())
    }

    pub fn wasteful(&self) -> impl Iterator<Item = &UnitAggregate> {
        self.aggregates
            .iter()
            .filter(|a| a.status == EfficiencyStatus::Wasteful)
    }

    pub fn total_fuel(&self) -> f64 {
        self.aggregates.iter().map(|a| a.total_fuel).sum()
    }

    pub fn total_waste(&self) -> f64 {
        self.aggregates.iter().map(|a| a.potential_waste).sum()
    }

    pub fn group(&self, key: &str) -> Option<&PeerGroup> {
        self.groups.iter().find(|g| g.key() == key)
    }
}

#[derive(Debug, Clone)]
pub struct BenchmarkEngine {
    strategy: GroupingStrategy,
}

impl BenchmarkEngine {
    pub fn new(strategy: GroupingStrategy) -> Self {
        Self { strategy }
    }

    /// Classify every unit against the median ratio of its peer group.
    ///
    /// `units` is the catalog in scope. Units present there but absent from
    /// `totals` never transacted and are reported inactive. Units in `totals`
    /// that the catalog does not know get a placeholder identity.
    pub fn compute(
        &self,
        totals: &BTreeMap<String, UnitTotals>,
        units: &BTreeMap<String, Unit>,
    ) -> BenchmarkOutcome {
        let mut rows: Vec<(Unit, UnitTotals, String)> = Vec::new();
        for (key, unit) in units {
            let t = totals.get(key).cloned().unwrap_or_default();
            let group = self.strategy.group_key(unit);
            rows.push((unit.clone(), t, group));
        }
        for (key, t) in totals {
            if !units.contains_key(key) {
                let unit = Unit::unknown(key, key);
                let group = self.strategy.group_key(&unit);
                rows.push((unit, t.clone(), group));
            }
        }

        let mut members: BTreeMap<String, Vec<(String, f64)>> = BTreeMap::new();
        for (unit, t, group) in &rows {
            if let Some(ratio) = t.fuel_ratio() {
                members
                    .entry(group.clone())
                    .or_default()
                    .push((unit.key.clone(), ratio));
            }
        }
        let groups: Vec<PeerGroup> = members
            .into_iter()
            .filter_map(|(key, m)| PeerGroup::from_members(key, m))
            .collect();
        let benchmarks: BTreeMap<&str, f64> =
            groups.iter().map(|g| (g.key(), g.benchmark())).collect();

        let mut aggregates: Vec<UnitAggregate> = rows
            .into_iter()
            .map(|(unit, t, group)| {
                let ratio = t.fuel_ratio();
                let benchmark = ratio.and(benchmarks.get(group.as_str()).copied());
                let (status, waste) = classify(ratio, benchmark, t.total_work);
                UnitAggregate {
                    unit: unit.key,
                    display_name: unit.display_name,
                    category: unit.category,
                    brand: unit.brand,
                    capacity: unit.capacity,
                    power_hp: unit.power_hp,
                    location: unit.location,
                    group,
                    total_fuel: t.total_fuel,
                    total_work: t.total_work,
                    fuel_ratio: ratio,
                    benchmark,
                    status,
                    potential_waste: waste,
                    inactive_reason: InactiveReason::from_totals(t.total_fuel, t.total_work),
                }
            })
            .collect();

        aggregates.sort_by(|a, b| {
            b.is_active()
                .cmp(&a.is_active())
                .then_with(|| a.group.cmp(&b.group))
                .then_with(|| {
                    let ra = a.fuel_ratio.unwrap_or(0.0);
                    let rb = b.fuel_ratio.unwrap_or(0.0);
                    ra.total_cmp(&rb)
                })
                .then_with(|| a.unit.cmp(&b.unit))
        });

        BenchmarkOutcome { aggregates, groups }
    }
}

fn classify(ratio: Option<f64>, benchmark: Option<f64>, total_work: f64) -> (EfficiencyStatus, f64) {
    match (ratio, benchmark) {
        (Some(r), Some(b)) if r > b => (EfficiencyStatus::Wasteful, (r - b) * total_work),
        (Some(_), Some(_)) => (EfficiencyStatus::Efficient, 0.0),
        _ => (EfficiencyStatus::Inactive, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fuelbench_types::EquipmentCategory;

    fn unit(key: &str, category: EquipmentCategory, capacity: u32) -> Unit {
        Unit {
            key: key.to_string(),
            display_name: key.to_string(),
            category,
            brand: "KALMAR".to_string(),
            capacity,
            power_hp: 0.0,
            location: None,
        }
    }

    fn catalog(units: Vec<Unit>) -> BTreeMap<String, Unit> {
        units.into_iter().map(|u| (u.key.clone(), u)).collect()
    }

    fn find<'a>(outcome: &'a BenchmarkOutcome, key: &str) -> &'a UnitAggregate {
        outcome.aggregates.iter().find(|a| a.unit == key).unwrap()
    }

    #[test]
    fn test_two_unit_group_median_scenario() {
        let units = catalog(vec![
            unit("RSA", EquipmentCategory::ReachStacker, 45),
            unit("RSB", EquipmentCategory::ReachStacker, 45),
        ]);
        let mut totals = BTreeMap::new();
        totals.insert("RSA".to_string(), UnitTotals::new(500.0, 100.0));
        totals.insert("RSB".to_string(), UnitTotals::new(400.0, 40.0));

        let outcome = BenchmarkEngine::new(GroupingStrategy::CategoryBracket).compute(&totals, &units);

        let group = outcome.group("Reach Stacker").unwrap();
        assert_eq!(group.benchmark(), 7.5);

        let a = find(&outcome, "RSA");
        assert_eq!(a.status, EfficiencyStatus::Efficient);
        assert_eq!(a.potential_waste, 0.0);

        let b = find(&outcome, "RSB");
        assert_eq!(b.status, EfficiencyStatus::Wasteful);
        assert!((b.potential_waste - (10.0 - 7.5) * 40.0).abs() < 1e-9);
        assert!((b.estimated_loss(6800.0) - 100.0 * 6800.0).abs() < 1e-6);
    }

    #[test]
    fn test_singleton_group_is_efficient() {
        let units = catalog(vec![unit("CR01", EquipmentCategory::Crane, 80)]);
        let mut totals = BTreeMap::new();
        totals.insert("CR01".to_string(), UnitTotals::new(900.0, 30.0));

        let outcome = BenchmarkEngine::new(GroupingStrategy::CategoryBracket).compute(&totals, &units);
        let only = find(&outcome, "CR01");
        assert_eq!(only.benchmark, only.fuel_ratio);
        assert_eq!(only.status, EfficiencyStatus::Efficient);
        assert_eq!(only.potential_waste, 0.0);
    }

    #[test]
    fn test_even_group_uses_mean_of_middle_pair() {
        let units = catalog(vec![
            unit("A", EquipmentCategory::Forklift, 5),
            unit("B", EquipmentCategory::Forklift, 5),
            unit("C", EquipmentCategory::Forklift, 5),
            unit("D", EquipmentCategory::Forklift, 5),
        ]);
        let mut totals = BTreeMap::new();
        totals.insert("A".to_string(), UnitTotals::new(10.0, 10.0));
        totals.insert("B".to_string(), UnitTotals::new(20.0, 10.0));
        totals.insert("C".to_string(), UnitTotals::new(40.0, 10.0));
        totals.insert("D".to_string(), UnitTotals::new(90.0, 10.0));

        let outcome = BenchmarkEngine::new(GroupingStrategy::CategoryBracket).compute(&totals, &units);
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].benchmark(), 3.0);
        assert_eq!(outcome.wasteful().count(), 2);
    }

    #[test]
    fn test_inactive_units_are_excluded_from_median() {
        let units = catalog(vec![
            unit("A", EquipmentCategory::Forklift, 5),
            unit("B", EquipmentCategory::Forklift, 5),
            unit("IDLE", EquipmentCategory::Forklift, 5),
            unit("DRY", EquipmentCategory::Forklift, 5),
            unit("NEVER", EquipmentCategory::Forklift, 5),
        ]);
        let mut totals = BTreeMap::new();
        totals.insert("A".to_string(), UnitTotals::new(20.0, 10.0));
        totals.insert("B".to_string(), UnitTotals::new(40.0, 10.0));
        totals.insert("IDLE".to_string(), UnitTotals::new(300.0, 0.0));
        totals.insert("DRY".to_string(), UnitTotals::new(0.0, 12.0));

        let outcome = BenchmarkEngine::new(GroupingStrategy::CategoryBracket).compute(&totals, &units);
        assert_eq!(outcome.groups[0].len(), 2);
        assert_eq!(outcome.groups[0].benchmark(), 3.0);

        for agg in &outcome.aggregates {
            let inactive = agg.total_work <= 0.0 || agg.total_fuel <= 0.0;
            assert_eq!(agg.status == EfficiencyStatus::Inactive, inactive);
            if agg.status != EfficiencyStatus::Wasteful {
                assert_eq!(agg.potential_waste, 0.0);
            }
        }

        assert_eq!(find(&outcome, "IDLE").inactive_reason, Some(InactiveReason::NoWork));
        assert_eq!(find(&outcome, "DRY").inactive_reason, Some(InactiveReason::NoFuel));
        assert_eq!(find(&outcome, "NEVER").inactive_reason, Some(InactiveReason::Unused));
        assert_eq!(find(&outcome, "NEVER").fuel_ratio, None);

        // active rows come first
        assert!(outcome.aggregates[0].is_active());
        assert!(!outcome.aggregates.last().unwrap().is_active());
    }

    #[test]
    fn test_units_outside_catalog_get_placeholder() {
        let units = BTreeMap::new();
        let mut totals = BTreeMap::new();
        totals.insert("FL99".to_string(), UnitTotals::new(50.0, 10.0));

        let outcome = BenchmarkEngine::new(GroupingStrategy::Fleet).compute(&totals, &units);
        let agg = find(&outcome, "FL99");
        assert_eq!(agg.brand, "-");
        assert_eq!(agg.status, EfficiencyStatus::Efficient);
    }

    #[test]
    fn test_aggregate_deltas_sums_per_unit() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let deltas = vec![
            PeriodDelta { unit: "A".to_string(), date, work: 5.0, fuel: 20.0 },
            PeriodDelta { unit: "A".to_string(), date, work: 3.0, fuel: 10.0 },
            PeriodDelta { unit: "B".to_string(), date, work: 1.0, fuel: 0.0 },
        ];
        let totals = aggregate_deltas(&deltas, &[]);
        assert_eq!(totals["A"], UnitTotals::new(30.0, 8.0));
        assert!(!totals["B"].is_active());
    }

    #[test]
    fn test_aggregate_counts_unpaired_fuel() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let deltas = vec![PeriodDelta { unit: "A".to_string(), date, work: 5.0, fuel: 20.0 }];
        let unpaired = vec![
            FuelIntake { unit: "A".to_string(), date, litres: 15.0 },
            FuelIntake { unit: "C".to_string(), date, litres: 60.0 },
        ];
        let totals = aggregate_deltas(&deltas, &unpaired);
        assert_eq!(totals["A"], UnitTotals::new(35.0, 5.0));
        // fuel-only unit is present with no work
        assert_eq!(totals["C"], UnitTotals::new(60.0, 0.0));
        assert!(!totals["C"].is_active());
    }
}
