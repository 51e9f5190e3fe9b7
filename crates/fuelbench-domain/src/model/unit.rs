//! Equipment master data

use fuelbench_types::EquipmentCategory;
use serde::{Deserialize, Serialize};

/// One piece of equipment as described by the master catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Canonical key (see `NameResolver::normalize`)
    pub key: String,
    /// Name as written in the master sheet
    pub display_name: String,
    pub category: EquipmentCategory,
    /// Type / brand column after typo repair
    pub brand: String,
    /// Rated capacity, tons or feet depending on category. 0 = unknown
    pub capacity: u32,
    /// Power rating in horsepower. 0 = unknown
    pub power_hp: f64,
    /// Home location, if the master sheet has one
    pub location: Option<String>,
}

impl Unit {
    /// Placeholder for a unit seen in transactions but absent from the catalog
    pub fn unknown(key: &str, display_name: &str) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            category: EquipmentCategory::infer_from_name(display_name),
            brand: "-".to_string(),
            capacity: 0,
            power_hp: 0.0,
            location: None,
        }
    }

    /// Fill the location from another source if this unit has none.
    ///
    /// Returns true when the location was filled.
    pub fn backfill_location(&mut self, location: Option<&str>) -> bool {
        if self.location.is_some() {
            return false;
        }
        match location.map(str::trim).filter(|l| !is_blank_location(l)) {
            Some(loc) => {
                self.location = Some(loc.to_string());
                true
            }
            None => false,
        }
    }

    pub fn location_label(&self) -> &str {
        self.location.as_deref().unwrap_or("-")
    }
}

/// Placeholder values that spreadsheets use for "no location"
pub fn is_blank_location(value: &str) -> bool {
    matches!(value.trim(), "" | "-" | "0" | "nan" | "NaN" | "None" | "NaT")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backfill_location_only_when_missing() {
        let mut unit = Unit::unknown("FL01", "FL 01");
        assert!(unit.backfill_location(Some(" Tanjung Perak ")));
        assert_eq!(unit.location_label(), "Tanjung Perak");
        assert!(!unit.backfill_location(Some("Timika")));
        assert_eq!(unit.location_label(), "Tanjung Perak");
    }

    #[test]
    fn test_backfill_ignores_placeholders() {
        let mut unit = Unit::unknown("FL01", "FL 01");
        assert!(!unit.backfill_location(Some("-")));
        assert!(!unit.backfill_location(Some("nan")));
        assert!(!unit.backfill_location(None));
        assert_eq!(unit.location_label(), "-");
    }
}
