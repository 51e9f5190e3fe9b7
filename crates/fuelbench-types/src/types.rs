//! Shared value types for the fuel benchmark pipeline

use serde::{Deserialize, Serialize};

/// Equipment category as recorded in the master sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentCategory {
    Forklift,
    Crane,
    ReachStacker,
    /// Top loader and side loader share one cohort
    TopSideLoader,
    /// Trailer / tronton trucks (ton-km cohort)
    TrailerTronton,
    Other,
}

impl EquipmentCategory {
    /// Map free-text category labels ("Forklift", "REACH STACKER", "Top Loader", ...)
    pub fn from_label(label: &str) -> Self {
        let upper = label.trim().to_uppercase();
        let compact: String = upper.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        let has_word = |w: &str| upper.split(|c: char| !c.is_ascii_alphanumeric()).any(|t| t == w);

        if compact.contains("REACHSTACKER") || has_word("RS") {
            EquipmentCategory::ReachStacker
        } else if compact.contains("LOADER") {
            EquipmentCategory::TopSideLoader
        } else if compact.contains("FORKLIF") || has_word("FL") {
            EquipmentCategory::Forklift
        } else if compact.contains("CRANE") {
            EquipmentCategory::Crane
        } else if compact.contains("TRAILER") || compact.contains("TRONTON") || compact.contains("TRUK") {
            EquipmentCategory::TrailerTronton
        } else {
            EquipmentCategory::Other
        }
    }

    /// Infer a category from a unit name when the master sheet leaves it blank.
    ///
    /// Plate-style names ("L 9025 US", "B 1234 XY") are trucks.
    pub fn infer_from_name(name: &str) -> Self {
        let upper = name.trim().to_uppercase();
        match Self::from_label(&upper) {
            EquipmentCategory::Other if upper.starts_with("L ") || upper.starts_with("B ") => {
                EquipmentCategory::TrailerTronton
            }
            other => other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EquipmentCategory::Forklift => "FORKLIFT",
            EquipmentCategory::Crane => "CRANE",
            EquipmentCategory::ReachStacker => "REACH STACKER",
            EquipmentCategory::TopSideLoader => "TOP/SIDE LOADER",
            EquipmentCategory::TrailerTronton => "TRAILER/TRONTON",
            EquipmentCategory::Other => "LAINNYA",
        }
    }
}

impl std::fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of value carried by a raw spreadsheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    /// Cumulative hour-meter (HM)
    HourMeter,
    /// Odometer reading (KM)
    Distance,
    /// Fuel pumped into the unit (LITER / PEMAKAIAN)
    FuelIn,
    /// Fuel issued to the unit, logged under KELUAR
    FuelOut,
}

impl MetricKind {
    /// Resolve a metric header label against the whitelist
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "HM" => Some(MetricKind::HourMeter),
            "KM" => Some(MetricKind::Distance),
            "LITER" | "PEMAKAIAN" => Some(MetricKind::FuelIn),
            "KELUAR" => Some(MetricKind::FuelOut),
            _ => None,
        }
    }

    /// Litres consumed by the unit, whichever column they were logged under
    pub fn is_fuel(&self) -> bool {
        matches!(self, MetricKind::FuelIn | MetricKind::FuelOut)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::HourMeter => "HM",
            MetricKind::Distance => "KM",
            MetricKind::FuelIn => "LITER",
            MetricKind::FuelOut => "KELUAR",
        }
    }
}

/// What "work performed" means for a fleet segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkBasis {
    /// Operating hours from the reconciled hour-meter
    HourMeter,
    /// Tons moved, taken from a work log
    Tonnage,
    /// Ton-kilometres, taken from a work log produced by distance enrichment
    TonDistance,
}

impl WorkBasis {
    /// Column name used for total work in exported tables
    pub fn work_column(&self) -> &'static str {
        match self {
            WorkBasis::HourMeter => "Total_HM_Work",
            WorkBasis::Tonnage => "Total_Ton",
            WorkBasis::TonDistance => "Total_TonKm",
        }
    }

    /// Unit of the fuel ratio
    pub fn ratio_unit(&self) -> &'static str {
        match self {
            WorkBasis::HourMeter => "L/Jam",
            WorkBasis::Tonnage => "L/Ton",
            WorkBasis::TonDistance => "L/Ton-Km",
        }
    }
}

impl std::fmt::Display for WorkBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkBasis::HourMeter => write!(f, "hour-meter"),
            WorkBasis::Tonnage => write!(f, "tonnage"),
            WorkBasis::TonDistance => write!(f, "ton-distance"),
        }
    }
}

/// Outcome of comparing a unit against its peer benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencyStatus {
    Efficient,
    Wasteful,
    Inactive,
}

impl EfficiencyStatus {
    /// Label used in exported workbooks
    pub fn label(&self) -> &'static str {
        match self {
            EfficiencyStatus::Efficient => "EFISIEN",
            EfficiencyStatus::Wasteful => "BOROS",
            EfficiencyStatus::Inactive => "INAKTIF",
        }
    }
}

/// Why a unit was left out of the benchmark comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InactiveReason {
    /// Fuel was recorded but no work
    NoWork,
    /// Work was recorded but no fuel
    NoFuel,
    /// Neither fuel nor work, or never seen in the transaction log
    Unused,
}

impl InactiveReason {
    pub fn from_totals(total_fuel: f64, total_work: f64) -> Option<Self> {
        match (total_fuel > 0.0, total_work > 0.0) {
            (true, true) => None,
            (true, false) => Some(InactiveReason::NoWork),
            (false, true) => Some(InactiveReason::NoFuel),
            (false, false) => Some(InactiveReason::Unused),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            InactiveReason::NoWork => "Unit tidak melakukan aktivitas kerja",
            InactiveReason::NoFuel => "Unit tidak pernah mengisi BBM",
            InactiveReason::Unused => "Unit tidak digunakan",
        }
    }
}

/// Monthly sheet names used in the fuel workbook, in calendar order
pub const MONTH_SHEETS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MEI", "JUN", "JUL", "AGT", "SEP", "OKT", "NOV", "DES",
];

const MONTH_NAMES: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

/// Calendar month (1-12) of a month sheet name, case-insensitive
pub fn month_of_sheet(sheet: &str) -> Option<u32> {
    let upper = sheet.trim().to_uppercase();
    MONTH_SHEETS
        .iter()
        .position(|m| *m == upper)
        .map(|idx| idx as u32 + 1)
}

/// Indonesian month name for a calendar month (1-12)
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[(month - 1) as usize],
        _ => "-",
    }
}
