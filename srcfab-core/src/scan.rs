//! Running scanners and merging their units into the tree configuration.

use crate::ports::Scanner;
use crate::tree_config::{TreeConfigError, expand_paths, validate_unit};
use anyhow::Context;
use camino::Utf8Path;
use rayon::prelude::*;
use serde_json::Value;
use srcfab_types::{SourceUnit, ToolRef, Tree, UnitId};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Runs every scanner concurrently and concatenates their units in scanner
/// order.
///
/// Fails only when no scanner produced a unit and at least one failed;
/// other failures are logged.
pub fn scan_multi(
    scanner: &dyn Scanner,
    scanners: &[ToolRef],
    config: &BTreeMap<String, Value>,
) -> anyhow::Result<Vec<SourceUnit>> {
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.min(scanners.len().max(1)))
        .build()
        .context("build scanner pool")?;

    let results: Vec<anyhow::Result<Vec<SourceUnit>>> = pool.install(|| {
        scanners
            .par_iter()
            .map(|tool| {
                scanner
                    .scan(tool, config)
                    .with_context(|| format!("scanner {tool}"))
            })
            .collect()
    });

    let mut units = Vec::new();
    let mut first_err = None;
    for result in results {
        match result {
            Ok(found) => units.extend(found),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "scanner failed");
                first_err.get_or_insert(e);
            }
        }
    }

    match first_err {
        Some(e) if units.is_empty() => Err(e),
        _ => Ok(units),
    }
}

/// Combines the Srcfile's manual units with scanned ones.
///
/// Tree `Config` entries are copied into each scanned unit unless the unit
/// sets the key itself. Manual units come first and shadow scanned units
/// with the same ID; scanned units under `SkipDirs` or named in
/// `SkipUnits` are dropped.
///
/// Every unit is validated first, so one scanned unit with an escaping
/// name or file fails the merge.
pub fn merge_units(
    tree: &Tree,
    scanned: Vec<SourceUnit>,
    root: &Utf8Path,
) -> Result<Vec<SourceUnit>, TreeConfigError> {
    let mut units = Vec::with_capacity(tree.units.len() + scanned.len());
    let mut manual: HashSet<UnitId> = HashSet::with_capacity(tree.units.len());
    for unit in &tree.units {
        validate_unit(unit)?;
        let mut unit = unit.clone();
        unit.files = expand_paths(root, &unit.files)?;
        manual.insert(unit.id());
        units.push(unit);
    }

    for mut unit in scanned {
        validate_unit(&unit)?;
        let id = unit.id();
        if manual.contains(&id) {
            info!(unit = %id, "manually specified unit shadows scanned unit");
            continue;
        }

        let dir = unit.effective_dir().unwrap_or_default();
        if path_has_any_prefix(&dir, &tree.skip_dirs) {
            debug!(unit = %id, dir = %dir, "skipping unit in skipped dir");
            continue;
        }
        if tree.skip_units.contains(&unit.key()) {
            debug!(unit = %id, "skipping unit listed in SkipUnits");
            continue;
        }

        for (k, v) in &tree.config {
            if let Some(existing) = unit.config.get(k) {
                info!(
                    unit = %id,
                    key = %k,
                    value = %existing,
                    "unit and Srcfile both set config key, keeping the unit's value"
                );
            } else {
                unit.config.insert(k.clone(), v.clone());
            }
        }
        units.push(unit);
    }
    Ok(units)
}

fn path_has_any_prefix(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| path_has_prefix(path, p))
}

fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let path = clean(path);
    let prefix = clean(prefix);
    prefix == "." || path == prefix || path.starts_with(&format!("{prefix}/"))
}

fn clean(path: &str) -> String {
    let parts: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_match_whole_components() {
        assert!(path_has_prefix("vendor/x", "vendor"));
        assert!(path_has_prefix("vendor", "./vendor/"));
        assert!(!path_has_prefix("vendored/x", "vendor"));
        assert!(path_has_prefix("anything", "."));
        assert!(path_has_prefix(".", ""));
    }

    fn scanned(name: &str, files: &[&str]) -> SourceUnit {
        let mut u = SourceUnit::new(name, "GoPackage");
        u.files = files.iter().map(|f| f.to_string()).collect();
        u
    }

    #[test]
    fn scanned_unit_with_escaping_file_fails_merge() {
        let units = vec![
            scanned("ok", &["main.go"]),
            scanned("p", &["../../etc/passwd"]),
        ];
        let err = merge_units(&Tree::default(), units, Utf8Path::new("/tmp")).unwrap_err();
        assert!(matches!(
            err,
            TreeConfigError::InvalidFilePath { ref path, .. } if path == "../../etc/passwd"
        ));
    }

    #[test]
    fn scanned_unit_is_checked_even_when_skipped() {
        let tree = Tree {
            skip_dirs: vec!["vendor".to_string()],
            ..Tree::default()
        };
        let mut unit = scanned("../../evil", &[]);
        unit.dir = "vendor/x".to_string();
        let err = merge_units(&tree, vec![unit], Utf8Path::new("/tmp")).unwrap_err();
        assert!(matches!(
            err,
            TreeConfigError::InvalidUnitName { field: "name", .. }
        ));
    }

    #[test]
    fn scanned_unit_with_nested_name_is_kept() {
        let units = vec![scanned("github.com/acme/pkg", &["pkg/a.go", "pkg/../b.go"])];
        let merged = merge_units(&Tree::default(), units, Utf8Path::new("/tmp")).expect("merge");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "github.com/acme/pkg");
    }
}
