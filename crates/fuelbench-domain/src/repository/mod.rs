//! Repository trait definitions for master data access

use std::collections::BTreeSet;

use crate::model::Unit;
use fuelbench_types::Error;

/// Read access to the equipment master catalog
pub trait UnitCatalogRepository {
    /// All units in the catalog
    fn find_all(&self) -> Result<Vec<Unit>, Error>;

    /// Find a unit by canonical key
    fn find_by_key(&self, key: &str) -> Result<Option<Unit>, Error>;

    /// Canonical keys known to the catalog
    fn keys(&self) -> Result<BTreeSet<String>, Error>;
}
