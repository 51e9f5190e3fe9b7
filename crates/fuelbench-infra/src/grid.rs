//! In-memory sheet grids read from xlsx workbooks
//!
//! Readers work on a [`SheetGrid`] with absolute row/column coordinates so the
//! header conventions ("row 0 = unit names, row 2 = metric") hold no matter
//! where calamine's used range starts.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate};

use fuelbench_types::WorkbookError;

/// Normalized cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    /// Text content, with numbers rendered without a trailing `.0`
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Lenient numeric coercion: anything that is not a number is missing, never zero
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Date from a date cell, an Excel serial, or day-first text
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Number(n) => excel_serial_to_date(*n),
            Cell::Text(s) => parse_date_text(s),
            Cell::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::String(s) => Cell::Text(s.clone()),
            Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
                .map(Cell::Date)
                .unwrap_or(Cell::Empty),
            Data::DateTimeIso(s) => parse_date_text(s)
                .map(Cell::Date)
                .unwrap_or_else(|| Cell::Text(s.clone())),
            Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// Rectangular view of one sheet. Out-of-range reads return [`Cell::Empty`].
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    name: String,
    rows: Vec<Vec<Cell>>,
}

static EMPTY: Cell = Cell::Empty;

impl SheetGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Row as text, one entry per column up to the grid width
    pub fn row_text(&self, row: usize) -> Vec<String> {
        (0..self.width())
            .map(|c| self.get(row, c).as_text().unwrap_or_default())
            .collect()
    }
}

/// Source of sheet grids, so readers can run on files or on fixtures
pub trait GridSource {
    fn sheet_names(&self) -> Vec<String>;

    fn read_sheet(&mut self, name: &str) -> Result<SheetGrid, WorkbookError>;
}

/// An `.xlsx` workbook opened with calamine
pub struct XlsxWorkbook {
    inner: Xlsx<BufReader<File>>,
}

impl XlsxWorkbook {
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        let inner: Xlsx<BufReader<File>> = open_workbook(path).map_err(|e: calamine::XlsxError| WorkbookError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { inner })
    }
}

impl GridSource for XlsxWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names().to_vec()
    }

    fn read_sheet(&mut self, name: &str) -> Result<SheetGrid, WorkbookError> {
        if !self.inner.sheet_names().iter().any(|s| s == name) {
            return Err(WorkbookError::SheetNotFound(name.to_string()));
        }
        let range = self
            .inner
            .worksheet_range(name)
            .map_err(|e| WorkbookError::Sheet {
                sheet: name.to_string(),
                reason: e.to_string(),
            })?;

        let (row0, col0) = match range.start() {
            Some((r, c)) => (r as usize, c as usize),
            None => return Ok(SheetGrid::new(name, Vec::new())),
        };
        let (height, width) = range.get_size();

        let mut rows = vec![vec![Cell::Empty; col0 + width]; row0 + height];
        for (r, c, data) in range.cells() {
            rows[row0 + r][col0 + c] = Cell::from(data);
        }
        Ok(SheetGrid::new(name, rows))
    }
}

/// Grids held in memory. Sheets that failed to read keep their error message.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<SheetGrid>,
    failed: Vec<(String, String)>,
}

impl MemoryWorkbook {
    pub fn new(sheets: Vec<SheetGrid>) -> Self {
        Self {
            sheets,
            failed: Vec::new(),
        }
    }

    /// Read every sheet of `source` into memory
    pub fn snapshot<S: GridSource>(source: &mut S) -> Self {
        let mut book = Self::default();
        for name in source.sheet_names() {
            match source.read_sheet(&name) {
                Ok(grid) => book.sheets.push(grid),
                Err(e) => book.failed.push((name, e.to_string())),
            }
        }
        book
    }
}

impl GridSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets
            .iter()
            .map(|s| s.name().to_string())
            .chain(self.failed.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<SheetGrid, WorkbookError> {
        if let Some((sheet, reason)) = self.failed.iter().find(|(n, _)| n == name) {
            return Err(WorkbookError::Sheet {
                sheet: sheet.clone(),
                reason: reason.clone(),
            });
        }
        self.sheets
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| WorkbookError::SheetNotFound(name.to_string()))
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    // "1,234.5" thousands separators
    let without_commas: String = trimmed.chars().filter(|c| *c != ',').collect();
    without_commas.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Excel serial day number (1900 system) to a date
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Day-first text dates, optionally followed by a time part
pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    let date_part = trimmed
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);
    const FORMATS: [&str; 5] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d", "%d.%m.%Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}
