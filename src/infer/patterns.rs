//! Pattern catalog: which relation pairs compose into which relation.
//!
//! The catalog maps a relation name to the `(r1, r2)` pairs whose chain
//! `A -r1-> X -r2-> B` is evidence about `A R B`. Two extra groups apply to
//! every query: the wildcard group (keyed by the wildcard token, `R` by
//! default) and the `default` group. In any pair, a second element equal to
//! the wildcard token stands for the queried relation itself.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::CatalogError;

/// Catalog shipped with the crate, used when no file is configured.
const BUILTIN_CATALOG: &str = include_str!("../../data/inference_patterns.json");

/// Key of the group applied unconditionally.
pub const DEFAULT_GROUP: &str = "default";

/// Parsed pattern catalog.
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    groups: HashMap<String, Vec<(String, String)>>,
}

impl PatternCatalog {
    /// Parse a catalog from JSON text.
    ///
    /// The top level must be an object. Within it, groups that are not arrays
    /// and entries that are not exactly two strings are dropped silently.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse {
                message: e.to_string(),
            })?;
        let serde_json::Value::Object(map) = value else {
            return Err(CatalogError::Parse {
                message: "top level is not a JSON object".into(),
            });
        };

        let groups = map
            .into_iter()
            .filter_map(|(key, entries)| {
                let entries = entries.as_array()?;
                let pairs = entries.iter().filter_map(parse_pair).collect();
                Some((key, pairs))
            })
            .collect();
        Ok(Self { groups })
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_CATALOG).unwrap_or_default()
    }

    /// Build a catalog from in-memory groups.
    pub fn from_groups<I, K, P>(groups: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: IntoIterator<Item = (&'static str, &'static str)>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|(k, pairs)| {
                    let pairs = pairs
                        .into_iter()
                        .map(|(a, b)| (a.to_string(), b.to_string()))
                        .collect();
                    (k.into(), pairs)
                })
                .collect(),
        }
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Patterns applicable to `target`: its own group, then the wildcard
    /// group, then the default group, with wildcard second elements resolved
    /// to `target` and duplicates removed (first occurrence wins).
    pub fn patterns_for(&self, target: &str, wildcard: &str) -> PatternSet {
        let mut set = PatternSet::default();
        for key in [target, wildcard, DEFAULT_GROUP] {
            let Some(pairs) = self.groups.get(key) else {
                continue;
            };
            for (r1, r2) in pairs {
                let r2 = if r2 == wildcard { target } else { r2.as_str() };
                set.insert(r1, r2);
            }
        }
        set
    }
}

fn parse_pair(entry: &serde_json::Value) -> Option<(String, String)> {
    match entry.as_array()?.as_slice() {
        [a, b] => Some((a.as_str()?.to_string(), b.as_str()?.to_string())),
        _ => None,
    }
}

/// The resolved `(r1, r2)` pairs for one query.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    pairs: Vec<(String, String)>,
    index: HashMap<String, HashSet<String>>,
}

impl PatternSet {
    /// Add a pair unless already present. Returns whether it was added.
    pub fn insert(&mut self, r1: &str, r2: &str) -> bool {
        let seconds = self.index.entry(r1.to_string()).or_default();
        if !seconds.insert(r2.to_string()) {
            return false;
        }
        self.pairs.push((r1.to_string(), r2.to_string()));
        true
    }

    pub fn contains(&self, r1: &str, r2: &str) -> bool {
        self.index.get(r1).is_some_and(|seconds| seconds.contains(r2))
    }

    /// Pairs in first-seen order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Distinct first elements, first-seen order: the relation types
    /// allowed on edges leaving the first word.
    pub fn first_types(&self) -> Vec<String> {
        distinct(self.pairs.iter().map(|(r1, _)| r1.as_str()))
    }

    /// Distinct second elements, first-seen order: the relation types
    /// allowed on edges entering the second word.
    pub fn second_types(&self) -> Vec<String> {
        distinct(self.pairs.iter().map(|(_, r2)| r2.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn distinct<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .filter(|item| seen.insert(*item))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_parses() {
        let catalog = PatternCatalog::builtin();
        assert!(!catalog.is_empty());
        let set = catalog.patterns_for("r_isa", "R");
        assert!(set.contains("r_isa", "r_isa"));
    }

    #[test]
    fn groups_combine_in_order_and_wildcard_resolves() {
        let catalog = PatternCatalog::from_json_str(
            r#"{
                "r_has_part": [["r_isa", "r_has_part"]],
                "R": [["r_syn", "R"]],
                "default": [["r_isa", "R"], ["r_syn", "R"]]
            }"#,
        )
        .unwrap();

        let set = catalog.patterns_for("r_has_part", "R");
        let pairs: Vec<(&str, &str)> = set
            .pairs()
            .iter()
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect();
        // ("r_isa", "R") resolves to a duplicate of the first pair; ("r_syn", "R")
        // appears in both the wildcard and default groups.
        assert_eq!(
            pairs,
            vec![("r_isa", "r_has_part"), ("r_syn", "r_has_part")]
        );
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let catalog = PatternCatalog::from_json_str(
            r#"{
                "default": [["r_isa"], ["r_isa", "R", "extra"], ["r_syn", "R"], "oops", [1, 2]],
                "broken": 42
            }"#,
        )
        .unwrap();
        let set = catalog.patterns_for("r_lieu", "R");
        assert_eq!(set.len(), 1);
        assert!(set.contains("r_syn", "r_lieu"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn non_object_catalog_is_rejected() {
        let err = PatternCatalog::from_json_str("[]").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
        let err = PatternCatalog::from_json_str("{").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn allowed_type_lists_are_distinct_in_first_seen_order() {
        let catalog = PatternCatalog::from_groups([(
            "default",
            vec![
                ("r_isa", "R"),
                ("r_syn", "R"),
                ("r_isa", "r_carac"),
                ("r_hypo", "r_carac"),
            ],
        )]);
        let set = catalog.patterns_for("r_lieu", "R");
        assert_eq!(set.first_types(), vec!["r_isa", "r_syn", "r_hypo"]);
        assert_eq!(set.second_types(), vec!["r_lieu", "r_carac"]);
    }

    #[test]
    fn unknown_target_still_gets_wildcard_and_default_groups() {
        let catalog = PatternCatalog::from_groups([
            ("R", vec![("r_syn", "R")]),
            ("default", vec![("r_isa", "R")]),
        ]);
        let set = catalog.patterns_for("r_agent", "R");
        assert!(set.contains("r_syn", "r_agent"));
        assert!(set.contains("r_isa", "r_agent"));
        assert!(!set.contains("r_isa", "R"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = PatternCatalog::load(Path::new("/nonexistent/patterns.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }
}
