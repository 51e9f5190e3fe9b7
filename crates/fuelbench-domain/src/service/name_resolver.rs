//! Equipment identity resolution
//!
//! Free-text unit names from the fuel log ("L.9025/US", "FORKLIFT 5T (EX. FL 05)")
//! are normalized into a canonical key and matched against the master catalog
//! through an ordered cascade of strategies. Manual fixes live in an
//! [`AliasTable`] loaded from configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Manual alias: a raw name containing every `contains` fragment and none of
/// the `excludes` fragments belongs to `target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasRule {
    pub contains: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    pub target: String,
}

impl AliasRule {
    /// `raw_upper` must already be uppercased and trimmed
    pub fn matches(&self, raw_upper: &str) -> bool {
        !self.contains.is_empty()
            && self.contains.iter().all(|c| raw_upper.contains(&c.to_uppercase()))
            && !self.excludes.iter().any(|e| raw_upper.contains(&e.to_uppercase()))
    }
}

/// Known misspelling in source data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypoRule {
    pub from: String,
    pub to: String,
    /// Only replace whole whitespace-separated words
    #[serde(default)]
    pub whole_word: bool,
}

impl TypoRule {
    fn apply(&self, text: &str) -> String {
        let from = self.from.to_uppercase();
        let to = self.to.to_uppercase();
        if self.whole_word {
            text.split_whitespace()
                .map(|w| if w == from { to.as_str() } else { w })
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            text.replace(&from, &to)
        }
    }
}

/// Hardcoded capacity for a unit whose name defeats the generic parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityOverride {
    pub unit: String,
    pub capacity: u32,
}

/// Externally configured identity fixes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AliasTable {
    #[serde(default, rename = "alias")]
    pub aliases: Vec<AliasRule>,
    /// Applied to unit names
    #[serde(default, rename = "typo")]
    pub typos: Vec<TypoRule>,
    /// Applied to the master's brand/type column only
    #[serde(default, rename = "brand_typo")]
    pub brand_typos: Vec<TypoRule>,
    #[serde(default, rename = "capacity_override")]
    pub capacity_overrides: Vec<CapacityOverride>,
}

/// Strategy that produced a match, in cascade order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// Manual alias table hit
    Alias,
    /// Cleaned key equals a catalog key
    Exact,
    /// Text before " (" matches
    BeforeParenthesis,
    /// Text after the "EX." (formerly) marker matches
    AfterExMarker,
    /// Text after "EX." is contained in a catalog key (first in key order wins)
    ExMarkerSubstring,
}

/// Cascade order used by [`NameResolver::resolve`]
pub const CASCADE: [MatchStrategy; 5] = [
    MatchStrategy::Alias,
    MatchStrategy::Exact,
    MatchStrategy::BeforeParenthesis,
    MatchStrategy::AfterExMarker,
    MatchStrategy::ExMarkerSubstring,
];

/// Result of resolving one raw name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { key: String, strategy: MatchStrategy },
    Unresolved,
}

impl Resolution {
    pub fn key(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { key, .. } => Some(key),
            Resolution::Unresolved => None,
        }
    }
}

/// Pure name resolver over a static alias table and a set of known keys.
///
/// Without a catalog the resolver is open: every non-empty cleaned name
/// resolves to itself. Once a catalog is attached only its keys resolve, so an
/// empty catalog resolves nothing.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    aliases: Vec<AliasRule>,
    typos: Vec<TypoRule>,
    catalog: Option<BTreeSet<String>>,
}

impl NameResolver {
    pub fn new(table: &AliasTable) -> Self {
        Self {
            aliases: table.aliases.clone(),
            typos: table.typos.clone(),
            catalog: None,
        }
    }

    pub fn with_catalog<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.catalog = Some(keys.into_iter().collect());
        self
    }

    pub fn catalog(&self) -> Option<&BTreeSet<String>> {
        self.catalog.as_ref()
    }

    /// Uppercase, trim and repair known typos, keeping punctuation
    pub fn fix_typos(&self, text: &str) -> String {
        apply_typos(&self.typos, text)
    }

    /// Canonical key: typo-repaired, letters and digits only
    pub fn normalize(&self, raw: &str) -> String {
        self.fix_typos(raw)
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect()
    }

    /// Resolve a raw name against the resolver's catalog, if one is attached
    pub fn resolve(&self, raw: &str) -> Resolution {
        match &self.catalog {
            Some(catalog) => self.resolve_against(raw, catalog),
            None => self.resolve_open(raw),
        }
    }

    /// Manual alias target or the cleaned name itself
    fn resolve_open(&self, raw: &str) -> Resolution {
        let upper = raw.trim().to_uppercase();
        let (key, strategy) = match self.aliases.iter().find(|rule| rule.matches(&upper)) {
            Some(rule) => (self.normalize(&rule.target), MatchStrategy::Alias),
            None => (self.normalize(&upper), MatchStrategy::Exact),
        };
        if key.is_empty() {
            Resolution::Unresolved
        } else {
            Resolution::Resolved { key, strategy }
        }
    }

    /// Resolve a raw name against an arbitrary set of canonical keys
    pub fn resolve_against(&self, raw: &str, catalog: &BTreeSet<String>) -> Resolution {
        let upper = raw.trim().to_uppercase();
        if upper.is_empty() {
            return Resolution::Unresolved;
        }
        for strategy in CASCADE {
            if let Some(key) = self.apply_strategy(strategy, &upper, catalog) {
                return Resolution::Resolved { key, strategy };
            }
        }
        Resolution::Unresolved
    }

    /// Whether `raw` resolves to `target_key` when that key is the only candidate
    pub fn resolves_to(&self, raw: &str, target_key: &str) -> bool {
        let single: BTreeSet<String> = std::iter::once(target_key.to_string()).collect();
        self.resolve_against(raw, &single).key() == Some(target_key)
    }

    /// Run a single strategy. Exposed so each step can be tested on its own.
    pub fn apply_strategy(
        &self,
        strategy: MatchStrategy,
        upper: &str,
        catalog: &BTreeSet<String>,
    ) -> Option<String> {
        let known = |key: &str| !key.is_empty() && catalog.contains(key);
        match strategy {
            MatchStrategy::Alias => self
                .aliases
                .iter()
                .find(|rule| rule.matches(upper))
                .map(|rule| self.normalize(&rule.target))
                .filter(|key| known(key)),
            MatchStrategy::Exact => Some(self.normalize(upper)).filter(|key| known(key)),
            MatchStrategy::BeforeParenthesis => upper
                .split_once(" (")
                .map(|(before, _)| self.normalize(before))
                .filter(|key| known(key)),
            MatchStrategy::AfterExMarker => {
                after_ex_marker(upper).map(|after| self.normalize(&after)).filter(|key| known(key))
            }
            MatchStrategy::ExMarkerSubstring => {
                let fragment = self.normalize(&after_ex_marker(upper)?);
                if fragment.is_empty() {
                    return None;
                }
                catalog.iter().find(|key| key.contains(&fragment)).cloned()
            }
        }
    }
}

/// Uppercase, trim and apply `rules` in order
pub fn apply_typos(rules: &[TypoRule], text: &str) -> String {
    let mut out = text.trim().to_uppercase();
    for rule in rules {
        out = rule.apply(&out);
    }
    out
}

/// Text after the last "EX." marker with closing parentheses removed
fn after_ex_marker(upper: &str) -> Option<String> {
    let (_, after) = upper.rsplit_once("EX.")?;
    let cleaned = after.replace(')', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AliasTable {
        AliasTable {
            aliases: vec![
                AliasRule {
                    contains: vec!["FL RENTAL 01".to_string()],
                    excludes: vec!["TIMIKA".to_string()],
                    target: "FL RENTAL 01 TIMIKA".to_string(),
                },
                AliasRule {
                    contains: vec!["L 8477 UUC".to_string()],
                    excludes: Vec::new(),
                    target: "L 9902 UR / S75".to_string(),
                },
                AliasRule {
                    contains: vec!["EX. RS 07".to_string()],
                    excludes: Vec::new(),
                    target: "REACH STACKER KALMAR 45T".to_string(),
                },
            ],
            typos: vec![
                TypoRule {
                    from: "FORKLIFT".to_string(),
                    to: "FORKLIF".to_string(),
                    whole_word: false,
                },
                TypoRule {
                    from: "ITSUBISHI".to_string(),
                    to: "MITSUBISHI".to_string(),
                    whole_word: true,
                },
            ],
            brand_typos: Vec::new(),
            capacity_overrides: Vec::new(),
        }
    }

    fn resolver() -> NameResolver {
        let r = NameResolver::new(&table());
        let keys: Vec<String> = [
            "L 9025 US",
            "FL RENTAL 01 TIMIKA",
            "L 9902 UR / S75",
            "FORKLIFT 5T",
            "FL 05 MITSUBISHI",
            "REACH STACKER KALMAR 45T",
            "RS 07 KONECRANES",
        ]
        .iter()
        .map(|n| r.normalize(n))
        .collect();
        r.with_catalog(keys)
    }

    #[test]
    fn test_punctuation_variants_share_a_key() {
        let r = resolver();
        assert_eq!(r.normalize("L.9025/US"), r.normalize("L 9025 US"));
        assert_eq!(r.resolve("L.9025/US").key(), Some("L9025US"));
        assert_eq!(r.resolve(" l 9025 us ").key(), Some("L9025US"));
    }

    #[test]
    fn test_typo_substitution() {
        let r = resolver();
        assert_eq!(r.normalize("Forklift 5T"), r.normalize("FORKLIF 5 T"));
        assert_eq!(r.fix_typos("itsubishi fd30"), "MITSUBISHI FD30");
        // whole-word rule leaves the correct spelling alone
        assert_eq!(r.fix_typos("MITSUBISHI"), "MITSUBISHI");
    }

    #[test]
    fn test_alias_wins_over_cascade() {
        let r = resolver();
        let res = r.resolve("FL RENTAL 01");
        assert_eq!(
            res,
            Resolution::Resolved {
                key: "FLRENTAL01TIMIKA".to_string(),
                strategy: MatchStrategy::Alias
            }
        );
        assert_eq!(r.resolve("L 8477 UUC").key(), Some("L9902URS75"));
    }

    #[test]
    fn test_alias_with_ex_marker_goes_to_documented_target() {
        let r = resolver();
        // The generic EX. substring match would pick RS07KONECRANES.
        let res = r.resolve("RS BARU (EX. RS 07)");
        assert_eq!(res.key(), Some("REACHSTACKERKALMAR45T"));
        assert_eq!(
            r.apply_strategy(MatchStrategy::ExMarkerSubstring, "RS BARU (EX. RS 07)", r.catalog().unwrap()),
            Some("RS07KONECRANES".to_string())
        );
    }

    #[test]
    fn test_alias_excludes() {
        let r = resolver();
        let res = r.resolve("FL RENTAL 01 TIMIKA");
        assert_eq!(
            res,
            Resolution::Resolved {
                key: "FLRENTAL01TIMIKA".to_string(),
                strategy: MatchStrategy::Exact
            }
        );
    }

    #[test]
    fn test_before_parenthesis() {
        let r = resolver();
        let res = r.resolve("FORKLIFT 5T (RUSAK)");
        assert_eq!(
            res,
            Resolution::Resolved {
                key: "FORKLIF5T".to_string(),
                strategy: MatchStrategy::BeforeParenthesis
            }
        );
    }

    #[test]
    fn test_after_ex_marker() {
        let r = resolver();
        let res = r.resolve("FL BARU (EX. FL 05 MITSUBISHI)");
        assert_eq!(
            res,
            Resolution::Resolved {
                key: "FL05MITSUBISHI".to_string(),
                strategy: MatchStrategy::AfterExMarker
            }
        );
    }

    #[test]
    fn test_ex_marker_substring() {
        let r = resolver();
        let res = r.resolve("FL 99 (EX. FL 05)");
        assert_eq!(
            res,
            Resolution::Resolved {
                key: "FL05MITSUBISHI".to_string(),
                strategy: MatchStrategy::ExMarkerSubstring
            }
        );
    }

    #[test]
    fn test_unresolved() {
        let r = resolver();
        assert_eq!(r.resolve("CRANE 99"), Resolution::Unresolved);
        assert_eq!(r.resolve("   "), Resolution::Unresolved);
    }

    #[test]
    fn test_open_catalog_accepts_cleaned_name() {
        let r = NameResolver::new(&table());
        assert_eq!(r.resolve("Crane 99").key(), Some("CRANE99"));
        assert_eq!(r.resolve("FL RENTAL 01").key(), Some("FLRENTAL01TIMIKA"));
        assert_eq!(r.resolve("-").key(), None);
    }

    #[test]
    fn test_empty_catalog_resolves_nothing() {
        let r = NameResolver::new(&table()).with_catalog(Vec::new());
        assert_eq!(r.catalog().map(|c| c.len()), Some(0));
        assert_eq!(r.resolve("RS 01"), Resolution::Unresolved);
        assert_eq!(r.resolve("FL RENTAL 01"), Resolution::Unresolved);
        assert_eq!(r.resolve("FL 99 (EX. FL 05)"), Resolution::Unresolved);
    }

    #[test]
    fn test_apply_typos_in_order() {
        let rules = table().typos;
        assert_eq!(apply_typos(&rules, " forklift itsubishi "), "FORKLIF MITSUBISHI");
        assert_eq!(apply_typos(&[], " Kalmar "), "KALMAR");
    }

    #[test]
    fn test_resolves_to_single_target() {
        let r = resolver();
        assert!(r.resolves_to("FORKLIFT 5T (RUSAK)", "FORKLIF5T"));
        assert!(r.resolves_to("FL RENTAL 01", "FLRENTAL01TIMIKA"));
        assert!(!r.resolves_to("L 9025 US", "FORKLIF5T"));
    }
}
