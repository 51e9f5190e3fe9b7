//! Infrastructure layer - workbook readers, loaders, parse cache

pub mod alias_table_loader;
pub mod cache;
pub mod column_discovery;
pub mod grid;
pub mod master_catalog;
pub mod sheet_ingestor;
pub mod work_log;

pub use alias_table_loader::AliasTableLoader;
pub use cache::{CacheStats, FileCache};
pub use column_discovery::{ColumnDiscovery, ColumnRule, MasterField};
pub use grid::{Cell, GridSource, MemoryWorkbook, SheetGrid, XlsxWorkbook};
pub use master_catalog::{MasterCatalog, MasterOptions, DEFAULT_MASTER_EXCLUSIONS};
pub use sheet_ingestor::{default_exclusions, IngestOutcome, SheetIngestor, DEFAULT_EXCLUSIONS};
pub use work_log::{parse_kpi_groups, parse_work_log, read_table, WorkLog};
