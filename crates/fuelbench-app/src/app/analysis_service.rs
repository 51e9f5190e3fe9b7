//! Analysis Service - the fuel benchmark pipeline
//!
//! One run goes:
//! 1. Load the master catalog (plus optional secondary master for locations)
//! 2. Ingest the month sheets of the fuel log
//! 3. Reconcile meters (or pair work-log amounts) into period deltas
//! 4. Benchmark every unit in scope against its peer group
//! 5. Project monthly trends
//!
//! Parsed workbooks are cached by file content, so several presets over the
//! same inputs parse each file once. Everything after parsing is recomputed
//! per run on owned copies.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::presets::{find_preset, Preset};
use fuelbench_domain::model::{DataQuality, FuelIntake, PeriodDelta, Unit};
use fuelbench_domain::repository::UnitCatalogRepository;
use fuelbench_domain::service::{
    aggregate_deltas, generate_benchmark_report, readings_by_unit, AliasTable, BenchmarkEngine,
    BenchmarkOutcome, GroupingKind, GroupingStrategy, MeterReconciler, NameResolver,
    TrendProjector, UnitTrend,
};
use fuelbench_infra::{
    parse_kpi_groups, parse_work_log, read_table, AliasTableLoader, CacheStats, FileCache,
    MasterCatalog, MemoryWorkbook, SheetGrid, SheetIngestor, XlsxWorkbook,
};
use fuelbench_types::{Error, Result, WorkBasis};

/// Inputs and per-run overrides of one analysis
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Fuel log workbook (month sheets)
    pub fuel_path: PathBuf,

    /// Equipment master workbook
    pub master_path: PathBuf,

    /// Second master used only to fill missing locations
    pub secondary_master: Option<PathBuf>,

    /// Tonnage / ton-km work log (xlsx or csv)
    pub work_log: Option<PathBuf>,

    /// Unit-to-KPI-group table (xlsx or csv)
    pub kpi_groups: Option<PathBuf>,

    /// Preset name; the configured default when None
    pub preset: Option<String>,

    /// Fuel price override (Rp/L)
    pub fuel_price: Option<f64>,

    /// Hour-meter ceiling override
    pub ceiling: Option<f64>,

    /// Explicit sheets to ingest; every month sheet when None
    pub sheets: Option<Vec<String>>,
}

impl AnalysisRequest {
    pub fn new(fuel_path: impl Into<PathBuf>, master_path: impl Into<PathBuf>) -> Self {
        Self {
            fuel_path: fuel_path.into(),
            master_path: master_path.into(),
            ..Default::default()
        }
    }

    pub fn with_secondary_master(mut self, path: PathBuf) -> Self {
        self.secondary_master = Some(path);
        self
    }

    pub fn with_work_log(mut self, path: PathBuf) -> Self {
        self.work_log = Some(path);
        self
    }

    pub fn with_kpi_groups(mut self, path: PathBuf) -> Self {
        self.kpi_groups = Some(path);
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn with_fuel_price(mut self, price: f64) -> Self {
        self.fuel_price = Some(price);
        self
    }

    pub fn with_ceiling(mut self, ceiling: f64) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    pub fn with_sheets(mut self, sheets: Vec<String>) -> Self {
        if !sheets.is_empty() {
            self.sheets = Some(sheets);
        }
        self
    }
}

/// Result of one preset run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub preset: Preset,
    pub fuel_price: f64,
    /// Ceiling applied to hour-meter deltas
    pub ceiling: f64,
    pub outcome: BenchmarkOutcome,
    pub trends: Vec<UnitTrend>,
    pub quality: DataQuality,
    /// Validated deltas the benchmark was computed from
    #[serde(skip)]
    pub deltas: Vec<PeriodDelta>,
    /// Fuel logged on dates without a validated delta
    #[serde(skip)]
    pub unpaired_fuel: Vec<FuelIntake>,
}

impl AnalysisReport {
    pub fn basis(&self) -> WorkBasis {
        self.preset.basis
    }

    /// Console report
    pub fn render_text(&self) -> String {
        format!(
            "Preset: {} ({})\n\n{}",
            self.preset.name,
            self.preset.description,
            generate_benchmark_report(&self.outcome, &self.quality, self.basis(), self.fuel_price)
        )
    }
}

/// Runs analyses, keeping parsed inputs between runs
pub struct AnalysisService {
    config: Config,
    aliases: AliasTable,
    workbooks: FileCache<MemoryWorkbook>,
    tables: FileCache<SheetGrid>,
}

impl AnalysisService {
    /// Service with the alias table named in the config, or the built-in seed table
    pub fn new(config: Config) -> Result<Self> {
        let aliases = AliasTableLoader::load_or_seed(config.alias_table.as_deref())?;
        Ok(Self::with_aliases(config, aliases))
    }

    pub fn with_aliases(config: Config, aliases: AliasTable) -> Self {
        Self {
            config,
            aliases,
            workbooks: FileCache::new(),
            tables: FileCache::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Combined statistics of the workbook and side-table caches
    pub fn cache_stats(&self) -> CacheStats {
        let books = self.workbooks.stats();
        let tables = self.tables.stats();
        CacheStats {
            entries: books.entries + tables.entries,
            hits: books.hits + tables.hits,
            misses: books.misses + tables.misses,
        }
    }

    /// Run the full pipeline for one preset.
    ///
    /// Only a missing input file is fatal. Sheet, row, name and delta problems
    /// end up in the report's data quality record.
    pub fn analyze(&mut self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let preset_name = request.preset.as_deref().unwrap_or(&self.config.preset);
        let preset = find_preset(preset_name)?.clone();
        check_side_inputs(&preset, request)?;

        let fuel_price = request.fuel_price.unwrap_or(self.config.fuel_price);
        let ceiling = request
            .ceiling
            .or(self.config.delta_ceiling)
            .unwrap_or(preset.ceiling);
        if ceiling.is_nan() || ceiling <= 0.0 {
            return Err(Error::InvalidInput(format!("delta ceiling must be positive, got {}", ceiling)));
        }

        info!(preset = preset.name, basis = %preset.basis, ceiling, "starting analysis");
        let mut quality = DataQuality::default();

        // Step 1: master catalog
        let base_resolver = NameResolver::new(&self.aliases);
        let options = self.config.master_options(&self.aliases);
        let mut master_book = self.workbook(&request.master_path)?;
        let mut catalog = MasterCatalog::load(&mut master_book, &base_resolver, &options)?;
        quality.merge(catalog.quality().clone());

        if let Some(path) = &request.secondary_master {
            let mut secondary_book = self.workbook(path)?;
            let secondary = MasterCatalog::load(&mut secondary_book, &base_resolver, &options)?;
            quality.skipped_sheets.extend(secondary.quality().skipped_sheets.iter().cloned());
            let filled = catalog.backfill_locations(&secondary);
            info!(filled, "locations filled from secondary master");
        }
        info!(units = catalog.len(), "master catalog loaded");

        let resolver = base_resolver.with_catalog(catalog.keys()?);
        let scope = preset.scope;
        let in_scope = |key: &str| catalog.get(key).map_or(true, |u| scope.includes(u.category));

        // Step 2: fuel log
        let mut fuel_book = self.workbook(&request.fuel_path)?;
        let ingest = SheetIngestor::new(&resolver, self.config.exclusion_keywords.clone())
            .ingest(&mut fuel_book, request.sheets.as_deref());
        quality.merge(ingest.quality);
        let readings: Vec<_> = ingest
            .readings
            .into_iter()
            .filter(|r| in_scope(&r.unit))
            .collect();
        info!(readings = readings.len(), "fuel log ingested");

        // Step 3: deltas
        let reconciler = MeterReconciler::new(ceiling);
        let mut deltas: Vec<PeriodDelta> = Vec::new();
        let mut unpaired_fuel: Vec<FuelIntake> = Vec::new();
        match preset.basis {
            WorkBasis::HourMeter => {
                for (unit, unit_readings) in readings_by_unit(&readings) {
                    let result = reconciler.reconcile_detailed(&unit_readings);
                    if !result.rejected.is_empty() {
                        debug!(unit = %unit, rejected = result.rejected.len(), "deltas rejected");
                    }
                    quality.rejected_deltas += result.rejected.len();
                    deltas.extend(result.deltas);
                    unpaired_fuel.extend(result.unpaired_fuel);
                }
            }
            WorkBasis::Tonnage | WorkBasis::TonDistance => {
                let path = required(&request.work_log, "work log")?;
                let grid = self.table(path)?;
                let log = parse_work_log(&grid, preset.basis, &resolver)?;
                quality.merge(log.quality);
                let records: Vec<_> = log.records.into_iter().filter(|w| in_scope(&w.unit)).collect();

                let units: BTreeSet<&str> = records
                    .iter()
                    .map(|w| w.unit.as_str())
                    .chain(readings.iter().map(|r| r.unit.as_str()))
                    .collect();
                for unit in units {
                    let result = reconciler.reconcile_direct(unit, &records, &readings);
                    quality.rejected_deltas += result.rejected.len();
                    deltas.extend(result.deltas);
                    unpaired_fuel.extend(result.unpaired_fuel);
                }
            }
        }
        info!(deltas = deltas.len(), rejected = quality.rejected_deltas, "deltas reconciled");

        // Step 4: benchmark
        let strategy = match preset.grouping {
            GroupingKind::CategoryBracket => GroupingStrategy::CategoryBracket,
            GroupingKind::CategoryCapacity => GroupingStrategy::CategoryCapacity,
            GroupingKind::PowerRating => GroupingStrategy::PowerRating,
            GroupingKind::Fleet => GroupingStrategy::Fleet,
            GroupingKind::KpiLabel => {
                let path = required(&request.kpi_groups, "KPI group table")?;
                let grid = self.table(path)?;
                GroupingStrategy::KpiLabel(parse_kpi_groups(&grid, &resolver, &mut quality)?)
            }
        };
        let units: BTreeMap<String, Unit> = catalog
            .units()
            .iter()
            .filter(|(_, u)| scope.includes(u.category))
            .map(|(k, u)| (k.clone(), u.clone()))
            .collect();
        let totals = aggregate_deltas(&deltas, &unpaired_fuel);
        let outcome = BenchmarkEngine::new(strategy).compute(&totals, &units);

        // Step 5: trends
        let trends = TrendProjector::new(&resolver).project_all(&deltas, &unpaired_fuel);

        info!(
            units = outcome.aggregates.len(),
            active = outcome.active().count(),
            wasteful = outcome.wasteful().count(),
            unmatched = quality.unmatched_names.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            preset,
            fuel_price,
            ceiling,
            outcome,
            trends,
            quality,
            deltas,
            unpaired_fuel,
        })
    }

    /// Monthly series of one unit, named as in any source.
    ///
    /// Returns None when the name matches no unit with data.
    pub fn trend(&mut self, request: &AnalysisRequest, unit: &str) -> Result<Option<UnitTrend>> {
        let report = self.analyze(request)?;
        let resolver = NameResolver::new(&self.aliases);
        Ok(TrendProjector::new(&resolver).project_unit(unit, &report.deltas, &report.unpaired_fuel))
    }

    fn workbook(&mut self, path: &Path) -> Result<MemoryWorkbook> {
        if !self.config.cache_enabled {
            return load_workbook(path);
        }
        self.workbooks.get_or_load(path, "", load_workbook)
    }

    fn table(&mut self, path: &Path) -> Result<SheetGrid> {
        if !self.config.cache_enabled {
            return read_table(path);
        }
        self.tables.get_or_load(path, "", read_table)
    }
}

fn load_workbook(path: &Path) -> Result<MemoryWorkbook> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let mut book = XlsxWorkbook::open(path)?;
    Ok(MemoryWorkbook::snapshot(&mut book))
}

fn check_side_inputs(preset: &Preset, request: &AnalysisRequest) -> Result<()> {
    if preset.needs_work_log() && request.work_log.is_none() {
        return Err(Error::InvalidInput(format!(
            "preset '{}' needs a work log (--work-log)",
            preset.name
        )));
    }
    if preset.needs_kpi_groups() && request.kpi_groups.is_none() {
        return Err(Error::InvalidInput(format!(
            "preset '{}' needs a KPI group table (--kpi-groups)",
            preset.name
        )));
    }
    Ok(())
}

fn required<'a>(path: &'a Option<PathBuf>, what: &str) -> Result<&'a Path> {
    path.as_deref()
        .ok_or_else(|| Error::InvalidInput(format!("missing {}", what)))
}
