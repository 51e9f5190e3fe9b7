//! Fuel-log ingestion
//!
//! Each month sheet has a three-row header block:
//! - row 0: unit names, set only on the first column of a merged block
//! - row 2: metric label per column (HM, KM, LITER, PEMAKAIAN, KELUAR)
//! - rows 3..: one row per day, date in column 0
//!
//! Every recognised (unit, metric) column becomes a run of long-form
//! [`MeterReading`]s. Problems are counted in [`DataQuality`] instead of
//! failing the whole ingest.

use tracing::{debug, warn};

use crate::grid::{GridSource, SheetGrid};
use fuelbench_domain::model::{DataQuality, MeterReading, SkippedSheet};
use fuelbench_domain::service::{NameResolver, Resolution};
use fuelbench_types::{month_of_sheet, MetricKind, WorkbookError};

const NAME_ROW: usize = 0;
const METRIC_ROW: usize = 2;
const FIRST_DATA_ROW: usize = 3;

/// Support assets logged in the same layout (tanks, pumps, generators, vehicles)
pub const DEFAULT_EXCLUSIONS: [&str; 6] = ["GENSET", "KOMPRESSOR", "MESIN", "TANGKI", "SPBU", "MOBIL"];

pub fn default_exclusions() -> Vec<String> {
    DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestOutcome {
    pub readings: Vec<MeterReading>,
    pub quality: DataQuality,
}

pub struct SheetIngestor<'a> {
    resolver: &'a NameResolver,
    exclusions: Vec<String>,
}

impl<'a> SheetIngestor<'a> {
    pub fn new(resolver: &'a NameResolver, exclusions: Vec<String>) -> Self {
        Self {
            resolver,
            exclusions: exclusions.into_iter().map(|e| e.trim().to_uppercase()).collect(),
        }
    }

    /// Ingest the given sheets, or every month sheet present when `sheets` is None.
    ///
    /// Explicitly requested sheets that are missing are reported as skipped.
    pub fn ingest<S: GridSource>(&self, source: &mut S, sheets: Option<&[String]>) -> IngestOutcome {
        let available = source.sheet_names();
        let targets: Vec<String> = match sheets {
            Some(list) => list.to_vec(),
            None => month_sheets(&available),
        };

        let mut outcome = IngestOutcome::default();
        for name in targets {
            let grid = match source.read_sheet(&name) {
                Ok(grid) => grid,
                Err(e) => {
                    warn!(sheet = %name, error = %e, "skipping sheet");
                    outcome.quality.skipped_sheets.push(SkippedSheet {
                        sheet: name,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            match self.ingest_grid(&grid, &mut outcome.quality) {
                Ok(readings) => {
                    debug!(sheet = %name, readings = readings.len(), "sheet ingested");
                    outcome.readings.extend(readings);
                }
                Err(e) => {
                    warn!(sheet = %name, error = %e, "skipping malformed sheet");
                    outcome.quality.skipped_sheets.push(SkippedSheet {
                        sheet: name,
                        reason: e.to_string(),
                    });
                }
            }
        }
        outcome
    }

    /// Readings of one sheet. Fails only when the header block is unusable.
    pub fn ingest_grid(
        &self,
        grid: &SheetGrid,
        quality: &mut DataQuality,
    ) -> Result<Vec<MeterReading>, WorkbookError> {
        if grid.height() <= FIRST_DATA_ROW {
            return Err(WorkbookError::Sheet {
                sheet: grid.name().to_string(),
                reason: "header block incomplete".to_string(),
            });
        }

        let names = forward_filled_names(grid);
        let columns: Vec<(usize, MetricKind)> = (1..grid.width())
            .filter_map(|col| {
                let label = grid.get(METRIC_ROW, col).as_text()?;
                MetricKind::from_label(&label).map(|m| (col, m))
            })
            .collect();
        if columns.is_empty() {
            return Err(WorkbookError::MissingColumn {
                sheet: grid.name().to_string(),
                column: "metric label (row 3)".to_string(),
            });
        }

        let dates: Vec<_> = (FIRST_DATA_ROW..grid.height())
            .map(|row| grid.get(row, 0).as_date())
            .collect();
        quality.undated_rows += dates
            .iter()
            .enumerate()
            .filter(|(i, d)| d.is_none() && !row_is_blank(grid, FIRST_DATA_ROW + i))
            .count();

        let mut readings = Vec::new();
        for (col, metric) in columns {
            let raw_name = names.get(col).cloned().flatten().unwrap_or_default();
            if is_junk_header(&raw_name) {
                continue;
            }
            if self.is_excluded(&raw_name) {
                quality.excluded_columns += 1;
                continue;
            }
            let unit = match self.resolver.resolve(&raw_name) {
                Resolution::Resolved { key, .. } => key,
                Resolution::Unresolved => {
                    debug!(sheet = grid.name(), name = %raw_name, "unmatched unit name");
                    quality.unmatched_names.insert(raw_name);
                    continue;
                }
            };

            for (i, date) in dates.iter().enumerate() {
                let Some(date) = date else { continue };
                let cell = grid.get(FIRST_DATA_ROW + i, col);
                if cell.is_empty() {
                    continue;
                }
                match cell.as_number() {
                    Some(value) => readings.push(MeterReading {
                        unit: unit.clone(),
                        raw_name: raw_name.clone(),
                        date: *date,
                        metric,
                        value,
                        sheet: grid.name().to_string(),
                    }),
                    None => quality.non_numeric_cells += 1,
                }
            }
        }
        Ok(readings)
    }

    fn is_excluded(&self, raw_upper: &str) -> bool {
        self.exclusions
            .iter()
            .any(|prefix| !prefix.is_empty() && raw_upper.starts_with(prefix.as_str()))
    }
}

/// Month sheets present in the workbook, in calendar order
pub fn month_sheets(available: &[String]) -> Vec<String> {
    let mut months: Vec<(u32, String)> = available
        .iter()
        .filter_map(|name| month_of_sheet(name).map(|m| (m, name.clone())))
        .collect();
    months.sort();
    months.into_iter().map(|(_, name)| name).collect()
}

/// Row-0 unit names, uppercased and carried right across merged blocks
fn forward_filled_names(grid: &SheetGrid) -> Vec<Option<String>> {
    let mut current: Option<String> = None;
    (0..grid.width())
        .map(|col| {
            if let Some(text) = grid.get(NAME_ROW, col).as_text() {
                current = Some(text.to_uppercase());
            }
            current.clone()
        })
        .collect()
}

fn is_junk_header(raw_upper: &str) -> bool {
    raw_upper.is_empty() || raw_upper.contains("TOTAL") || raw_upper.contains("UNNAMED")
}

fn row_is_blank(grid: &SheetGrid, row: usize) -> bool {
    (0..grid.width()).all(|col| grid.get(row, col).is_empty())
}
