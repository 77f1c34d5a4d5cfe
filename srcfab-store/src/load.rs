use crate::error::StoreError;
use crate::store::{CommitStore, unit_data_file};
use glob::glob;
use srcfab_types::{SourceUnit, Tree, data_type};
use tracing::debug;

const UNIT_SUFFIX: &str = ".unit.json";

/// Loads every `*.unit.json` written for this commit, ordered by path.
pub fn load_units(commit: &CommitStore) -> Result<Vec<SourceUnit>, StoreError> {
    commit.require_exists()?;

    let pattern = commit.root().join(format!("**/*{UNIT_SUFFIX}"));
    let pattern_str = pattern.as_str();
    debug!(pattern = %pattern_str, "scanning build store for source units");

    let mut paths = Vec::new();
    for entry in glob(pattern_str).map_err(|e| StoreError::BadDataFilePath {
        path: format!("{pattern_str}: {e}"),
    })? {
        let path = entry.map_err(|e| {
            let path = e.path().display().to_string();
            StoreError::io(path, e.into_error())
        })?;
        paths.push(path);
    }

    // Deterministic order matters.
    paths.sort();

    let mut units = Vec::with_capacity(paths.len());
    for path in paths {
        let display = path.display().to_string();
        let bytes = fs_err::read(&path).map_err(|e| StoreError::io(display.clone(), e))?;
        let unit: SourceUnit =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
                name: display,
                source,
            })?;
        units.push(unit);
    }
    Ok(units)
}

/// Tree configuration assembled from the cached unit files.
///
/// The Srcfile is not consulted: its directives were applied when the units
/// were written.
pub fn read_cached_tree(commit: &CommitStore) -> Result<Tree, StoreError> {
    Ok(Tree::with_units(load_units(commit)?))
}

/// Writes `unit` to `<name>/<type>.unit.json`, returning the relative path.
pub fn write_unit(commit: &CommitStore, unit: &SourceUnit) -> Result<String, StoreError> {
    let rel = unit_data_file(unit, data_type::UNIT);
    commit.write_json(&rel, unit)?;
    debug!(unit = %unit.id(), path = %rel, "wrote source unit");
    Ok(rel)
}
