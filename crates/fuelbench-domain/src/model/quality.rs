//! Data-quality bookkeeping for a processing run

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A sheet that was skipped instead of aborting the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSheet {
    pub sheet: String,
    pub reason: String,
}

/// Counts of everything recovered locally during a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    /// Raw names that could not be resolved to a catalog unit
    pub unmatched_names: BTreeSet<String>,
    pub skipped_sheets: Vec<SkippedSheet>,
    /// Columns dropped by the non-equipment exclusion filter
    pub excluded_columns: usize,
    /// Data cells that were not numeric
    pub non_numeric_cells: usize,
    /// Data rows without a parsable date
    pub undated_rows: usize,
    /// Master rows dropped (no name, excluded, duplicate)
    pub dropped_master_rows: usize,
    /// Deltas discarded as negative or implausible
    pub rejected_deltas: usize,
}

impl DataQuality {
    pub fn merge(&mut self, other: DataQuality) {
        self.unmatched_names.extend(other.unmatched_names);
        self.skipped_sheets.extend(other.skipped_sheets);
        self.excluded_columns += other.excluded_columns;
        self.non_numeric_cells += other.non_numeric_cells;
        self.undated_rows += other.undated_rows;
        self.dropped_master_rows += other.dropped_master_rows;
        self.rejected_deltas += other.rejected_deltas;
    }
}
