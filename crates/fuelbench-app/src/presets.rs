//! Named analysis presets
//!
//! Each preset is one benchmarking convention the organisation uses for a
//! fleet segment: which work basis, which peer grouping, which ceiling.

use fuelbench_domain::service::{GroupingKind, ACCUMULATED_HOURS_CEILING, DAILY_HOURS_CEILING};
use fuelbench_types::{ConfigError, EquipmentCategory, Result, WorkBasis};
use serde::Serialize;

/// Part of the fleet a preset benchmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FleetScope {
    All,
    /// Trailers and trontons
    Trucking,
    /// Everything except trailers and trontons
    NonTrucking,
}

impl FleetScope {
    pub fn includes(&self, category: EquipmentCategory) -> bool {
        match self {
            FleetScope::All => true,
            FleetScope::Trucking => category == EquipmentCategory::TrailerTronton,
            FleetScope::NonTrucking => category != EquipmentCategory::TrailerTronton,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub basis: WorkBasis,
    pub grouping: GroupingKind,
    /// Hour-meter delta ceiling; unused for work-log bases
    pub ceiling: f64,
    pub scope: FleetScope,
}

impl Preset {
    /// Needs a tonnage or ton-km work log
    pub fn needs_work_log(&self) -> bool {
        self.basis != WorkBasis::HourMeter
    }

    /// Needs a unit-to-KPI-group table
    pub fn needs_kpi_groups(&self) -> bool {
        self.grouping == GroupingKind::KpiLabel
    }
}

pub const PRESETS: [Preset; 6] = [
    Preset {
        name: "hm-power",
        description: "Jam kerja HM, grup per horse power",
        basis: WorkBasis::HourMeter,
        grouping: GroupingKind::PowerRating,
        ceiling: ACCUMULATED_HOURS_CEILING,
        scope: FleetScope::All,
    },
    Preset {
        name: "hm-capacity",
        description: "Jam kerja HM, grup per jenis alat x kapasitas",
        basis: WorkBasis::HourMeter,
        grouping: GroupingKind::CategoryCapacity,
        ceiling: ACCUMULATED_HOURS_CEILING,
        scope: FleetScope::All,
    },
    Preset {
        name: "hm-daily",
        description: "Jam kerja HM harian (maks 24 jam), grup kapasitas standar",
        basis: WorkBasis::HourMeter,
        grouping: GroupingKind::CategoryBracket,
        ceiling: DAILY_HOURS_CEILING,
        scope: FleetScope::All,
    },
    Preset {
        name: "tonnage",
        description: "Alat non-trucking, liter per ton",
        basis: WorkBasis::Tonnage,
        grouping: GroupingKind::CategoryBracket,
        ceiling: ACCUMULATED_HOURS_CEILING,
        scope: FleetScope::NonTrucking,
    },
    Preset {
        name: "ton-km",
        description: "Trucking, liter per ton-km, satu grup armada",
        basis: WorkBasis::TonDistance,
        grouping: GroupingKind::Fleet,
        ceiling: ACCUMULATED_HOURS_CEILING,
        scope: FleetScope::Trucking,
    },
    Preset {
        name: "kpi",
        description: "Jam kerja HM, grup KPI dari tabel eksternal",
        basis: WorkBasis::HourMeter,
        grouping: GroupingKind::KpiLabel,
        ceiling: ACCUMULATED_HOURS_CEILING,
        scope: FleetScope::All,
    },
];

/// Look up a preset by name (case-insensitive)
pub fn find_preset(name: &str) -> Result<&'static Preset> {
    let wanted = name.trim();
    PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()).into())
}
