//! Domain model types

pub mod aggregate;
pub mod meter_reading;
pub mod period_delta;
pub mod quality;
pub mod unit;

pub use aggregate::{PeerGroup, UnitAggregate};
pub use meter_reading::{MeterReading, WorkRecord};
pub use period_delta::{FuelIntake, PeriodDelta};
pub use quality::{DataQuality, SkippedSheet};
pub use unit::Unit;
