use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Validated work and fuel for one unit on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodDelta {
    pub unit: String,
    pub date: NaiveDate,
    /// Hours worked, tons moved or ton-km, depending on the work basis
    pub work: f64,
    /// Litres of fuel taken on the same date
    pub fuel: f64,
}

/// Fuel taken on a date with no retained work delta (first reading, rejected
/// delta, or a unit without a meter). Still counts toward the unit's total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelIntake {
    pub unit: String,
    pub date: NaiveDate,
    pub litres: f64,
}
