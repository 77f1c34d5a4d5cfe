use crate::toolref::ToolRef;
use crate::unit::{SourceUnit, UnitId, UnitKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration of one source tree at one commit.
///
/// Read from a `Srcfile` in the tree root, or assembled from cached unit
/// files in the build store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tree {
    /// Units declared manually or discovered by scanners.
    #[serde(
        rename = "SourceUnits",
        alias = "Units",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub units: Vec<SourceUnit>,

    /// Scanners to run when configuring the tree.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scanners: Vec<ToolRef>,

    /// Directory trees whose scanned units are dropped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_dirs: Vec<String>,

    /// Scanned units dropped by exact name and type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_units: Vec<UnitKey>,

    /// Properties copied to every scanned unit's `Config`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, serde_json::Value>,
}

impl Tree {
    pub fn with_units(units: Vec<SourceUnit>) -> Self {
        Self {
            units,
            ..Self::default()
        }
    }

    pub fn find_unit(&self, id: &UnitId) -> Option<&SourceUnit> {
        self.units.iter().find(|u| &u.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_units_alias() {
        let tree: Tree =
            serde_json::from_str(r#"{"Units":[{"Name":"n","Type":"t","Files":["f"]}]}"#)
                .expect("parse");
        assert_eq!(tree.units.len(), 1);
        assert_eq!(tree.units[0].files, vec!["f".to_string()]);
    }

    #[test]
    fn find_unit_matches_by_id() {
        let tree = Tree::with_units(vec![SourceUnit::new("a", "t"), SourceUnit::new("b", "t")]);
        let found = tree.find_unit(&UnitId::new("b", "t")).expect("found");
        assert_eq!(found.name, "b");
        assert!(tree.find_unit(&UnitId::new("b", "x")).is_none());
    }
}
