//! Header-based column discovery
//!
//! Master sheets drift in column order and spelling between revisions, so
//! columns are located by matching header text against a declarative rule list
//! instead of fixed positions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target field of a master-sheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasterField {
    Name,
    Category,
    Brand,
    Capacity,
    Power,
    Location,
}

/// One field and the header spellings that identify it.
///
/// A header matches when it equals one of `exact`, or contains every word of
/// one `keywords` entry, and contains none of `excludes`. Comparison is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub field: MasterField,
    #[serde(default)]
    pub exact: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl ColumnRule {
    fn new(field: MasterField, exact: &[&str], keywords: &[&str], excludes: &[&str]) -> Self {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        Self {
            field,
            exact: owned(exact),
            keywords: owned(keywords),
            excludes: owned(excludes),
        }
    }

    pub fn matches(&self, header: &str) -> bool {
        let upper = header.trim().to_uppercase();
        if upper.is_empty() {
            return false;
        }
        if self.excludes.iter().any(|e| upper.contains(&e.to_uppercase())) {
            return false;
        }
        self.exact.iter().any(|e| upper == e.to_uppercase())
            || self.keywords.iter().any(|k| {
                k.to_uppercase()
                    .split_whitespace()
                    .all(|word| upper.contains(word))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDiscovery {
    #[serde(rename = "column")]
    pub rules: Vec<ColumnRule>,
}

impl Default for ColumnDiscovery {
    fn default() -> Self {
        Self {
            rules: vec![
                ColumnRule::new(MasterField::Name, &[], &["NAMA"], &[]),
                ColumnRule::new(MasterField::Category, &[], &["ALAT BERAT", "JENIS"], &["NAMA"]),
                ColumnRule::new(MasterField::Brand, &[], &["TYPE", "MERK"], &[]),
                ColumnRule::new(MasterField::Capacity, &[], &["CAP", "KAPASITAS"], &[]),
                ColumnRule::new(MasterField::Power, &["HP", "HORSE POWER"], &[], &[]),
                ColumnRule::new(MasterField::Location, &["DES 2025"], &["LOKASI"], &[]),
            ],
        }
    }
}

impl ColumnDiscovery {
    /// Column index per field; the first matching header wins and each column
    /// is assigned to at most one field
    pub fn discover(&self, headers: &[String]) -> BTreeMap<MasterField, usize> {
        let mut found: BTreeMap<MasterField, usize> = BTreeMap::new();
        for rule in &self.rules {
            if found.contains_key(&rule.field) {
                continue;
            }
            let taken: Vec<usize> = found.values().copied().collect();
            if let Some(idx) = headers
                .iter()
                .enumerate()
                .find(|(idx, h)| !taken.contains(idx) && rule.matches(h))
                .map(|(idx, _)| idx)
            {
                found.insert(rule.field, idx);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_discovers_master_columns() {
        let cols = ColumnDiscovery::default().discover(&headers(&[
            "NO",
            "NAMA ALAT BERAT",
            "DES 2025",
            "JENIS ALAT BERAT",
            "TYPE / MERK",
            "KAPASITAS",
            "HP",
        ]));
        assert_eq!(cols[&MasterField::Name], 1);
        assert_eq!(cols[&MasterField::Location], 2);
        assert_eq!(cols[&MasterField::Category], 3);
        assert_eq!(cols[&MasterField::Brand], 4);
        assert_eq!(cols[&MasterField::Capacity], 5);
        assert_eq!(cols[&MasterField::Power], 6);
    }

    #[test]
    fn test_power_requires_exact_header() {
        let cols = ColumnDiscovery::default().discover(&headers(&["NAMA", "CHP NOTE"]));
        assert!(!cols.contains_key(&MasterField::Power));
    }

    #[test]
    fn test_reordered_headers() {
        let cols = ColumnDiscovery::default().discover(&headers(&["Capacity", "Merk", "Nama Unit"]));
        assert_eq!(cols[&MasterField::Capacity], 0);
        assert_eq!(cols[&MasterField::Brand], 1);
        assert_eq!(cols[&MasterField::Name], 2);
    }

    #[test]
    fn test_rules_deserialize_from_toml() {
        let discovery: ColumnDiscovery = toml::from_str(
            r#"
            [[column]]
            field = "name"
            keywords = ["UNIT"]

            [[column]]
            field = "power"
            exact = ["DAYA"]
            "#,
        )
        .unwrap();
        let cols = discovery.discover(&headers(&["DAYA", "UNIT ID"]));
        assert_eq!(cols[&MasterField::Name], 1);
        assert_eq!(cols[&MasterField::Power], 0);
    }
}
