//! Domain services

pub mod benchmark_engine;
pub mod grouping;
pub mod meter_reconciler;
pub mod name_resolver;
pub mod report;
pub mod trend_projector;

pub use benchmark_engine::{aggregate_deltas, BenchmarkEngine, BenchmarkOutcome, UnitTotals};
pub use grouping::{capacity_bracket, GroupingKind, GroupingStrategy, FLEET_GROUP, OTHER_GROUP};
pub use meter_reconciler::{
    readings_by_unit, MeterReconciler, Reconciliation, RejectedDelta, RejectionReason,
    ACCUMULATED_HOURS_CEILING, DAILY_HOURS_CEILING,
};
pub use name_resolver::{
    apply_typos, AliasRule, AliasTable, CapacityOverride, MatchStrategy, NameResolver, Resolution,
    TypoRule,
};
pub use report::{format_rupiah, generate_benchmark_report};
pub use trend_projector::{TrendPoint, TrendProjector, UnitTrend, YearMonth};
