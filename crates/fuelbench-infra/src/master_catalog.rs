//! Equipment master catalog loaded from the master workbook

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::column_discovery::{ColumnDiscovery, MasterField};
use crate::grid::{GridSource, SheetGrid};
use fuelbench_domain::model::{DataQuality, SkippedSheet, Unit};
use fuelbench_domain::repository::UnitCatalogRepository;
use fuelbench_domain::service::{apply_typos, CapacityOverride, NameResolver, TypoRule};
use fuelbench_types::{EquipmentCategory, Error, WorkbookError};

/// Column index used for the location when no header matches
const FALLBACK_LOCATION_COLUMN: usize = 2;

pub const DEFAULT_MASTER_EXCLUSIONS: [&str; 2] = ["DUMMY", "FALCON"];

/// Layout of the master workbook
#[derive(Debug, Clone)]
pub struct MasterOptions {
    pub sheet: String,
    /// Zero-based row holding the column headers
    pub header_row: usize,
    pub location_header: String,
    /// Rows whose unit name contains any of these are dropped
    pub exclusions: Vec<String>,
    pub capacity_overrides: Vec<CapacityOverride>,
    /// Typo fixes for the brand/type column
    pub brand_typos: Vec<TypoRule>,
    pub discovery: ColumnDiscovery,
}

impl Default for MasterOptions {
    fn default() -> Self {
        Self {
            sheet: "Sheet2".to_string(),
            header_row: 1,
            location_header: "DES 2025".to_string(),
            exclusions: DEFAULT_MASTER_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            capacity_overrides: Vec::new(),
            brand_typos: Vec::new(),
            discovery: ColumnDiscovery::default(),
        }
    }
}

/// Units keyed by canonical key
#[derive(Debug, Clone, Default)]
pub struct MasterCatalog {
    units: BTreeMap<String, Unit>,
    quality: DataQuality,
}

impl MasterCatalog {
    /// Load the configured sheet, falling back to the first sheet when it is absent.
    ///
    /// A sheet without a usable name column yields an empty catalog and a
    /// skipped-sheet entry rather than an error.
    pub fn load<S: GridSource>(
        source: &mut S,
        resolver: &NameResolver,
        options: &MasterOptions,
    ) -> Result<Self, Error> {
        let names = source.sheet_names();
        let sheet = if names.iter().any(|n| n == &options.sheet) {
            options.sheet.clone()
        } else {
            let first = names
                .first()
                .cloned()
                .ok_or_else(|| WorkbookError::SheetNotFound(options.sheet.clone()))?;
            warn!(wanted = %options.sheet, using = %first, "master sheet not found, using first sheet");
            first
        };

        let grid = source.read_sheet(&sheet)?;
        match Self::from_grid(&grid, resolver, options) {
            Ok(catalog) => Ok(catalog),
            Err(e) => {
                warn!(sheet = %sheet, error = %e, "master sheet unusable");
                let mut catalog = Self::default();
                catalog.quality.skipped_sheets.push(SkippedSheet {
                    sheet,
                    reason: e.to_string(),
                });
                Ok(catalog)
            }
        }
    }

    pub fn from_grid(
        grid: &SheetGrid,
        resolver: &NameResolver,
        options: &MasterOptions,
    ) -> Result<Self, WorkbookError> {
        let headers = grid.row_text(options.header_row);
        let mut columns = options.discovery.discover(&headers);
        if !columns.contains_key(&MasterField::Name) {
            return Err(WorkbookError::MissingColumn {
                sheet: grid.name().to_string(),
                column: "unit name".to_string(),
            });
        }

        let location_header = options.location_header.trim().to_uppercase();
        if let Some(idx) = headers
            .iter()
            .position(|h| !location_header.is_empty() && h.trim().to_uppercase() == location_header)
        {
            columns.insert(MasterField::Location, idx);
        } else if !columns.contains_key(&MasterField::Location)
            && !columns.values().any(|c| *c == FALLBACK_LOCATION_COLUMN)
            && headers.len() > FALLBACK_LOCATION_COLUMN
        {
            columns.insert(MasterField::Location, FALLBACK_LOCATION_COLUMN);
        }

        let exclusions: Vec<String> = options.exclusions.iter().map(|e| e.to_uppercase()).collect();
        let overrides: BTreeMap<String, u32> = options
            .capacity_overrides
            .iter()
            .map(|o| (resolver.normalize(&o.unit), o.capacity))
            .collect();
        let text_at = |row: usize, field: MasterField| {
            columns
                .get(&field)
                .and_then(|col| grid.get(row, *col).as_text())
        };

        let mut catalog = Self::default();
        for row in (options.header_row + 1)..grid.height() {
            let Some(name) = text_at(row, MasterField::Name) else {
                if !grid.row_text(row).iter().all(|c| c.is_empty()) {
                    catalog.quality.dropped_master_rows += 1;
                }
                continue;
            };
            let upper = name.to_uppercase();
            if exclusions.iter().any(|e| upper.contains(e.as_str())) {
                debug!(unit = %name, "excluded master row");
                catalog.quality.dropped_master_rows += 1;
                continue;
            }
            let key = resolver.normalize(&name);
            if key.is_empty() || catalog.units.contains_key(&key) {
                debug!(unit = %name, "dropping unnamed or duplicate master row");
                catalog.quality.dropped_master_rows += 1;
                continue;
            }

            let category = text_at(row, MasterField::Category)
                .map(|c| EquipmentCategory::from_label(&c))
                .filter(|c| *c != EquipmentCategory::Other)
                .unwrap_or_else(|| EquipmentCategory::infer_from_name(&name));
            let brand = text_at(row, MasterField::Brand)
                .map(|b| apply_typos(&options.brand_typos, &b))
                .unwrap_or_else(|| "-".to_string());
            let capacity = match overrides.get(&key) {
                Some(c) => *c,
                None => parse_capacity(text_at(row, MasterField::Capacity).as_deref(), &upper),
            };
            let power_hp = columns
                .get(&MasterField::Power)
                .and_then(|col| grid.get(row, *col).as_number())
                .unwrap_or(0.0);
            let mut unit = Unit {
                key: key.clone(),
                display_name: name.clone(),
                category,
                brand,
                capacity,
                power_hp,
                location: None,
            };
            unit.backfill_location(text_at(row, MasterField::Location).as_deref());
            catalog.units.insert(key, unit);
        }
        Ok(catalog)
    }

    /// Fill missing locations from a secondary catalog. Returns how many were filled.
    pub fn backfill_locations(&mut self, secondary: &MasterCatalog) -> usize {
        let mut filled = 0;
        for (key, unit) in self.units.iter_mut() {
            let other = secondary.units.get(key).and_then(|u| u.location.as_deref());
            if unit.backfill_location(other) {
                filled += 1;
            }
        }
        filled
    }

    pub fn get(&self, key: &str) -> Option<&Unit> {
        self.units.get(key)
    }

    pub fn units(&self) -> &BTreeMap<String, Unit> {
        &self.units
    }

    pub fn key_set(&self) -> BTreeSet<String> {
        self.units.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn quality(&self) -> &DataQuality {
        &self.quality
    }
}

impl UnitCatalogRepository for MasterCatalog {
    fn find_all(&self) -> Result<Vec<Unit>, Error> {
        Ok(self.units.values().cloned().collect())
    }

    fn find_by_key(&self, key: &str) -> Result<Option<Unit>, Error> {
        Ok(self.units.get(key).cloned())
    }

    fn keys(&self) -> Result<BTreeSet<String>, Error> {
        Ok(self.key_set())
    }
}

fn number_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)").ok()).as_ref()
}

fn suffixed_number_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(?:TON|FEET|FT|T|K)\b").ok())
        .as_ref()
}

/// Rated capacity from the capacity cell, falling back to a "45T" / "20 FT"
/// token in the unit name. Rounded half-up; 0 when nothing parses.
pub fn parse_capacity(raw: Option<&str>, name_upper: &str) -> u32 {
    let from_cell = raw
        .and_then(|r| number_pattern()?.captures(r))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(round_half_up)
        .unwrap_or(0);
    if from_cell > 0 {
        return from_cell;
    }
    suffixed_number_pattern()
        .and_then(|re| re.captures(name_upper))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(round_half_up)
        .unwrap_or(0)
}

fn round_half_up(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        (v + 0.5).floor() as u32
    } else {
        0
    }
}
