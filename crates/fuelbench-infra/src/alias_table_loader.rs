//! Alias / typo / capacity-override table loader (TOML)

use std::path::Path;

use fuelbench_domain::service::AliasTable;
use fuelbench_types::{ConfigError, Error, Result};

/// Identity fixes known from the organisation's data; used when no table file is given
pub const SEED_TABLE: &str = r#"
# Renamed or mis-entered units in the fuel log
[[alias]]
contains = ["FL RENTAL 01"]
excludes = ["TIMIKA"]
target = "FL RENTAL 01 TIMIKA"

[[alias]]
contains = ["TOBATI", "KALMAR 32T"]
target = "TOP LOADER KALMAR 35T/TOBATI"

[[alias]]
contains = ["L 8477 UUC"]
target = "L 9902 UR / S75"

[[alias]]
contains = ["L 9054 UT"]
target = "L 9054 UT"

[[typo]]
from = "FORKLIFT"
to = "FORKLIF"

[[typo]]
from = "MITSUBHISI"
to = "MITSUBISHI"

[[typo]]
from = "ITSUBISHI"
to = "MITSUBISHI"
whole_word = true

# Brand/type column of the master
[[brand_typo]]
from = "MITSUBHISI"
to = "MITSUBISHI"

[[brand_typo]]
from = "ITSUBISHI"
to = "MITSUBISHI"
whole_word = true

[[capacity_override]]
unit = "L 9025 US"
capacity = 40
"#;

pub struct AliasTableLoader;

impl AliasTableLoader {
    pub fn seed() -> Result<AliasTable> {
        Self::parse(SEED_TABLE)
    }

    pub fn parse(content: &str) -> Result<AliasTable> {
        toml::from_str(content).map_err(|e| Error::Config(ConfigError::ParseError(e.to_string())))
    }

    pub fn load_from_file(path: &Path) -> Result<AliasTable> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// The table at `path`, or the seed table when no path is given
    pub fn load_or_seed(path: Option<&Path>) -> Result<AliasTable> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Self::seed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelbench_domain::service::NameResolver;

    #[test]
    fn test_seed_table_parses() {
        let table = AliasTableLoader::seed().unwrap();
        assert_eq!(table.aliases.len(), 4);
        assert_eq!(table.capacity_overrides[0].capacity, 40);
        assert!(table.typos.iter().any(|t| t.whole_word));
        assert_eq!(table.brand_typos.len(), 2);
        assert!(table.brand_typos.iter().all(|t| t.to == "MITSUBISHI"));
    }

    #[test]
    fn test_seed_resolves_renamed_units() {
        let table = AliasTableLoader::seed().unwrap();
        let resolver = NameResolver::new(&table);
        assert!(resolver.resolves_to("L 8477 UUC", &resolver.normalize("L 9902 UR / S75")));
        assert!(resolver.resolves_to(
            "TOBATI KALMAR 32T",
            &resolver.normalize("TOP LOADER KALMAR 35T/TOBATI")
        ));
        assert_eq!(resolver.normalize("Forklift Mitsubhisi 5T"), "FORKLIFMITSUBISHI5T");
    }

    #[test]
    fn test_load_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.toml");
        std::fs::write(
            &path,
            "[[alias]]\ncontains = [\"RS BARU\"]\ntarget = \"RS 07\"\n",
        )
        .unwrap();
        let table = AliasTableLoader::load_or_seed(Some(&path)).unwrap();
        assert_eq!(table.aliases.len(), 1);
        assert!(table.typos.is_empty());
    }

    #[test]
    fn test_missing_file_and_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AliasTableLoader::load_from_file(&dir.path().join("none.toml")),
            Err(Error::FileNotFound(_))
        ));
        assert!(matches!(
            AliasTableLoader::parse("[[alias]]\ntarget = 3"),
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }
}
