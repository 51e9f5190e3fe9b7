//! Work logs (tonnage, ton-km) and KPI group assignments
//!
//! Both come as flat tables with a header row, either `.xlsx` (first sheet)
//! or `.csv`. Unit names go through the same resolver as the fuel log.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::grid::{Cell, GridSource, SheetGrid, XlsxWorkbook};
use fuelbench_domain::model::{DataQuality, WorkRecord};
use fuelbench_domain::service::NameResolver;
use fuelbench_types::{Error, Result, WorkBasis, WorkbookError};

const UNIT_HEADERS: [&str; 4] = ["UNIT", "NAMA", "NOPOL", "ALAT"];
const DATE_HEADERS: [&str; 3] = ["TANGGAL", "TGL", "DATE"];
const KPI_HEADERS: [&str; 3] = ["KPI", "GROUP", "KELOMPOK"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkLog {
    pub records: Vec<WorkRecord>,
    pub quality: DataQuality,
}

/// Read a flat table from `.csv` or the first sheet of an `.xlsx`
pub fn read_table(path: &Path) -> Result<SheetGrid> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        return read_csv_table(path);
    }
    let mut book = XlsxWorkbook::open(path)?;
    let first = book
        .sheet_names()
        .into_iter()
        .next()
        .ok_or_else(|| WorkbookError::SheetNotFound("(first sheet)".to_string()))?;
    Ok(book.read_sheet(&first)?)
}

fn read_csv_table(path: &Path) -> Result<SheetGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::Csv(e.to_string()))?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Csv(e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("csv")
        .to_string();
    Ok(SheetGrid::new(name, rows))
}

/// Work amounts per unit and date from a table with unit, date and amount columns
pub fn parse_work_log(grid: &SheetGrid, basis: WorkBasis, resolver: &NameResolver) -> Result<WorkLog> {
    let headers: Vec<String> = grid.row_text(0).iter().map(|h| h.to_uppercase()).collect();
    let unit_col = require(grid, &headers, "unit", |h| contains_any(h, &UNIT_HEADERS))?;
    let date_col = require(grid, &headers, "date", |h| contains_any(h, &DATE_HEADERS))?;
    let amount_col = require(grid, &headers, "work amount", |h| is_amount_header(h, basis))?;

    let mut log = WorkLog::default();
    for row in 1..grid.height() {
        let Some(raw) = grid.get(row, unit_col).as_text() else {
            continue;
        };
        let Some(date) = grid.get(row, date_col).as_date() else {
            log.quality.undated_rows += 1;
            continue;
        };
        let amount_cell = grid.get(row, amount_col);
        if amount_cell.is_empty() {
            continue;
        }
        let Some(amount) = amount_cell.as_number() else {
            log.quality.non_numeric_cells += 1;
            continue;
        };
        match resolver.resolve(&raw).key() {
            Some(key) => log.records.push(WorkRecord {
                unit: key.to_string(),
                date,
                amount,
            }),
            None => {
                debug!(name = %raw, "unmatched unit in work log");
                log.quality.unmatched_names.insert(raw.to_uppercase());
            }
        }
    }
    Ok(log)
}

/// Unit key to KPI group label. Later rows override earlier ones.
pub fn parse_kpi_groups(
    grid: &SheetGrid,
    resolver: &NameResolver,
    quality: &mut DataQuality,
) -> Result<BTreeMap<String, String>> {
    let headers: Vec<String> = grid.row_text(0).iter().map(|h| h.to_uppercase()).collect();
    let group_col = require(grid, &headers, "KPI group", |h| contains_any(h, &KPI_HEADERS))?;
    let unit_col = headers
        .iter()
        .enumerate()
        .position(|(i, h)| i != group_col && contains_any(h, &UNIT_HEADERS))
        .ok_or_else(|| missing(grid, "unit"))?;

    let mut labels = BTreeMap::new();
    for row in 1..grid.height() {
        let (Some(raw), Some(label)) = (
            grid.get(row, unit_col).as_text(),
            grid.get(row, group_col).as_text(),
        ) else {
            continue;
        };
        match resolver.resolve(&raw).key() {
            Some(key) => {
                labels.insert(key.to_string(), label);
            }
            None => {
                quality.unmatched_names.insert(raw.to_uppercase());
            }
        }
    }
    Ok(labels)
}

fn is_amount_header(header: &str, basis: WorkBasis) -> bool {
    let compact: String = header.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    match basis {
        WorkBasis::TonDistance => compact.contains("TONKM"),
        WorkBasis::Tonnage => compact.contains("TON") && !compact.contains("KM"),
        WorkBasis::HourMeter => compact == "HM" || compact.contains("JAM"),
    }
}

fn contains_any(header: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| header.contains(k))
}

fn require(
    grid: &SheetGrid,
    headers: &[String],
    what: &str,
    pred: impl Fn(&str) -> bool,
) -> Result<usize> {
    headers
        .iter()
        .position(|h| pred(h))
        .ok_or_else(|| missing(grid, what))
}

fn missing(grid: &SheetGrid, what: &str) -> Error {
    WorkbookError::MissingColumn {
        sheet: grid.name().to_string(),
        column: what.to_string(),
    }
    .into()
}
