//! Monthly efficiency series per unit

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{FuelIntake, PeriodDelta};
use crate::service::name_resolver::NameResolver;
use fuelbench_types::month_name;

/// Calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of<D: Datelike>(date: &D) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn next(&self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Month name and year, e.g. "Oktober 2025"
    pub fn long_label(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: YearMonth,
    pub fuel: f64,
    pub work: f64,
    /// Fuel per unit of work; 0 for a month without work
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTrend {
    pub unit: String,
    pub points: Vec<TrendPoint>,
}

pub struct TrendProjector<'a> {
    resolver: &'a NameResolver,
}

impl<'a> TrendProjector<'a> {
    pub fn new(resolver: &'a NameResolver) -> Self {
        Self { resolver }
    }

    /// Monthly series of one canonical unit, covering its active month range.
    ///
    /// Months between the first and last record that have no data appear with zeros.
    pub fn project(&self, unit: &str, deltas: &[PeriodDelta], unpaired_fuel: &[FuelIntake]) -> UnitTrend {
        let mut months: BTreeMap<YearMonth, (f64, f64)> = BTreeMap::new();
        for delta in deltas.iter().filter(|d| d.unit == unit) {
            let entry = months.entry(YearMonth::of(&delta.date)).or_default();
            entry.0 += delta.fuel;
            entry.1 += delta.work;
        }
        for intake in unpaired_fuel.iter().filter(|f| f.unit == unit) {
            months.entry(YearMonth::of(&intake.date)).or_default().0 += intake.litres;
        }

        let mut points = Vec::new();
        if let (Some(first), Some(last)) = (
            months.keys().next().copied(),
            months.keys().next_back().copied(),
        ) {
            let mut period = first;
            while period <= last {
                let (fuel, work) = months.get(&period).copied().unwrap_or_default();
                let ratio = if work > 0.0 { fuel / work } else { 0.0 };
                points.push(TrendPoint { period, fuel, work, ratio });
                period = period.next();
            }
        }

        UnitTrend {
            unit: unit.to_string(),
            points,
        }
    }

    /// Series for a free-text unit name, matched against the units present.
    ///
    /// Returns None when the name does not resolve to any unit present.
    pub fn project_unit(
        &self,
        raw_name: &str,
        deltas: &[PeriodDelta],
        unpaired_fuel: &[FuelIntake],
    ) -> Option<UnitTrend> {
        let keys: BTreeSet<String> = unit_keys(deltas, unpaired_fuel)
            .into_iter()
            .map(str::to_string)
            .collect();
        let resolution = self.resolver.resolve_against(raw_name, &keys);
        let key = resolution.key()?;
        if !keys.contains(key) {
            return None;
        }
        Some(self.project(key, deltas, unpaired_fuel))
    }

    pub fn project_all(&self, deltas: &[PeriodDelta], unpaired_fuel: &[FuelIntake]) -> Vec<UnitTrend> {
        unit_keys(deltas, unpaired_fuel)
            .into_iter()
            .map(|k| self.project(k, deltas, unpaired_fuel))
            .collect()
    }
}

fn unit_keys<'d>(deltas: &'d [PeriodDelta], unpaired_fuel: &'d [FuelIntake]) -> BTreeSet<&'d str> {
    deltas
        .iter()
        .map(|d| d.unit.as_str())
        .chain(unpaired_fuel.iter().map(|f| f.unit.as_str()))
        .collect()
}
