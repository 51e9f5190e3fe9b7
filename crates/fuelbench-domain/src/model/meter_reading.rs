use chrono::NaiveDate;
use fuelbench_types::MetricKind;
use serde::{Deserialize, Serialize};

/// One observed spreadsheet cell in long form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    /// Canonical unit key
    pub unit: String,
    /// Unit name as written in the sheet header
    pub raw_name: String,
    pub date: NaiveDate,
    pub metric: MetricKind,
    pub value: f64,
    /// Sheet the value came from (month tab)
    pub sheet: String,
}

/// Work performed in one period, for segments whose work is not an hour-meter
/// (tonnage moved, ton-km driven)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRecord {
    pub unit: String,
    pub date: NaiveDate,
    pub amount: f64,
}
