//! Hour-meter reconciliation
//!
//! Turns a unit's cumulative hour-meter readings into per-date deltas paired
//! with that date's fuel intake. Zero or missing meter readings are treated as
//! "not reported" and forward-filled. Deltas that are negative or above the
//! plausibility ceiling are discarded, never clamped.
//!
//! Fuel is never discarded with a delta: litres on a date without a retained
//! delta come back as [`FuelIntake`] so unit totals count every litre.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{FuelIntake, MeterReading, PeriodDelta, WorkRecord};
use fuelbench_types::MetricKind;

/// Ceiling for day-over-day deltas on a daily log (hours in a day)
pub const DAILY_HOURS_CEILING: f64 = 24.0;

/// Ceiling used when readings may span several unreported days
pub const ACCUMULATED_HOURS_CEILING: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    Negative,
    AboveCeiling,
}

/// A delta that failed validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedDelta {
    pub unit: String,
    pub date: NaiveDate,
    pub delta: f64,
    pub reason: RejectionReason,
}

/// Retained and rejected deltas of one unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub deltas: Vec<PeriodDelta>,
    pub rejected: Vec<RejectedDelta>,
    /// Fuel on dates that have no retained delta
    pub unpaired_fuel: Vec<FuelIntake>,
}

impl Reconciliation {
    fn unpaired(&mut self, unit: &str, date: NaiveDate, litres: f64) {
        if litres != 0.0 {
            self.unpaired_fuel.push(FuelIntake {
                unit: unit.to_string(),
                date,
                litres,
            });
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Day {
    meter: Option<f64>,
    fuel: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReconciler {
    ceiling: f64,
}

impl Default for MeterReconciler {
    fn default() -> Self {
        Self::new(ACCUMULATED_HOURS_CEILING)
    }
}

impl MeterReconciler {
    pub fn new(ceiling: f64) -> Self {
        Self { ceiling }
    }

    /// Validated deltas for one unit's readings, in date order
    pub fn reconcile(&self, readings: &[MeterReading]) -> Vec<PeriodDelta> {
        self.reconcile_detailed(readings).deltas
    }

    /// Like [`reconcile`](Self::reconcile) but also returns what was discarded
    pub fn reconcile_detailed(&self, readings: &[MeterReading]) -> Reconciliation {
        let Some(unit) = readings.first().map(|r| r.unit.clone()) else {
            return Reconciliation::default();
        };
        let days = collect_days(readings);

        let mut out = Reconciliation::default();
        let mut previous: Option<f64> = None;
        for (date, day) in days {
            // zero = not reported
            let filled = day.meter.filter(|v| *v > 0.0).or(previous);
            let mut paired = false;
            if let (Some(prev), Some(current)) = (previous, filled) {
                let delta = current - prev;
                match self.check(delta) {
                    Ok(()) => {
                        out.deltas.push(PeriodDelta {
                            unit: unit.clone(),
                            date,
                            work: delta,
                            fuel: day.fuel,
                        });
                        paired = true;
                    }
                    Err(reason) => out.rejected.push(RejectedDelta {
                        unit: unit.clone(),
                        date,
                        delta,
                        reason,
                    }),
                }
            }
            if !paired {
                out.unpaired(&unit, date, day.fuel);
            }
            previous = filled;
        }
        out
    }

    /// Pair per-period work amounts (tonnage, ton-km) with fuel intake.
    ///
    /// Work is not cumulative here: a date without a work record has zero work.
    /// Negative daily totals are discarded; that date's fuel stays unpaired.
    pub fn reconcile_direct(
        &self,
        unit: &str,
        work: &[WorkRecord],
        readings: &[MeterReading],
    ) -> Reconciliation {
        let mut days: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
        for record in work.iter().filter(|w| w.unit == unit) {
            days.entry(record.date).or_default().0 += record.amount;
        }
        for reading in readings
            .iter()
            .filter(|r| r.unit == unit && r.metric.is_fuel())
        {
            days.entry(reading.date).or_default().1 += reading.value;
        }

        let mut out = Reconciliation::default();
        for (date, (amount, fuel)) in days {
            if amount < 0.0 || amount.is_nan() {
                out.rejected.push(RejectedDelta {
                    unit: unit.to_string(),
                    date,
                    delta: amount,
                    reason: RejectionReason::Negative,
                });
                out.unpaired(unit, date, fuel);
                continue;
            }
            out.deltas.push(PeriodDelta {
                unit: unit.to_string(),
                date,
                work: amount,
                fuel,
            });
        }
        out
    }

    /// Drop deltas outside `[0, ceiling]`. Idempotent.
    pub fn validate(&self, deltas: &[PeriodDelta]) -> Vec<PeriodDelta> {
        deltas
            .iter()
            .filter(|d| self.check(d.work).is_ok())
            .cloned()
            .collect()
    }

    fn check(&self, delta: f64) -> Result<(), RejectionReason> {
        if delta < 0.0 || delta.is_nan() {
            Err(RejectionReason::Negative)
        } else if delta > self.ceiling {
            Err(RejectionReason::AboveCeiling)
        } else {
            Ok(())
        }
    }
}

/// One row per date: max hour-meter, summed fuel of every fuel column
fn collect_days(readings: &[MeterReading]) -> BTreeMap<NaiveDate, Day> {
    let mut days: BTreeMap<NaiveDate, Day> = BTreeMap::new();
    for reading in readings {
        let day = days.entry(reading.date).or_default();
        match reading.metric {
            MetricKind::HourMeter => {
                day.meter = Some(day.meter.map_or(reading.value, |m| m.max(reading.value)));
            }
            metric if metric.is_fuel() => day.fuel += reading.value,
            _ => {}
        }
    }
    days
}

/// Group readings by canonical unit key
pub fn readings_by_unit(readings: &[MeterReading]) -> BTreeMap<String, Vec<MeterReading>> {
    let mut by_unit: BTreeMap<String, Vec<MeterReading>> = BTreeMap::new();
    for reading in readings {
        by_unit.entry(reading.unit.clone()).or_default().push(reading.clone());
    }
    by_unit
}
