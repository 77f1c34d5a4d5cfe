//! Reading and validating a tree's `Srcfile`.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use fs_err as fs;
use srcfab_types::{SourceUnit, Tree, UnitId};
use std::collections::BTreeSet;
use std::io::ErrorKind;
use thiserror::Error;
use tracing::debug;

/// Tree configuration file name, looked up in the tree root.
pub const SRCFILE: &str = "Srcfile";

#[derive(Debug, Error)]
pub enum TreeConfigError {
    /// A unit file is absolute or escapes the tree.
    #[error("invalid file path {path:?} in source unit {unit}")]
    InvalidFilePath { unit: UnitId, path: String },

    /// A unit name or type would place build data outside the store.
    #[error("invalid unit {field} {value:?} in source unit {unit}")]
    InvalidUnitName {
        unit: UnitId,
        field: &'static str,
        value: String,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("bad file pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads `<dir>/Srcfile`, or the default configuration when there is none.
pub fn read_tree_config(dir: &Utf8Path) -> Result<Tree, TreeConfigError> {
    let path = dir.join(SRCFILE);
    let tree = match fs::read(&path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| TreeConfigError::Parse {
            path: path.clone(),
            source,
        })?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path, "no Srcfile, using defaults");
            Tree::default()
        }
        Err(source) => return Err(TreeConfigError::Io { path, source }),
    };
    validate_tree(&tree)?;
    Ok(tree)
}

/// Rejects units whose files, names or types are absolute or lead outside
/// the tree.
pub fn validate_tree(tree: &Tree) -> Result<(), TreeConfigError> {
    tree.units.iter().try_for_each(validate_unit)
}

/// Checks one unit, whether it came from a Srcfile or a scanner.
///
/// Names may nest (`github.com/acme/pkg`) but must stay inside the tree.
/// Types become file name prefixes, so they may not contain separators.
pub fn validate_unit(unit: &SourceUnit) -> Result<(), TreeConfigError> {
    if !is_tree_relative(&unit.name) {
        return Err(TreeConfigError::InvalidUnitName {
            unit: unit.id(),
            field: "name",
            value: unit.name.clone(),
        });
    }
    if !is_plain_type(&unit.unit_type) {
        return Err(TreeConfigError::InvalidUnitName {
            unit: unit.id(),
            field: "type",
            value: unit.unit_type.clone(),
        });
    }
    if !is_tree_relative(&unit.dir) {
        return Err(TreeConfigError::InvalidFilePath {
            unit: unit.id(),
            path: unit.dir.clone(),
        });
    }
    for file in &unit.files {
        if !is_tree_relative(file) {
            return Err(TreeConfigError::InvalidFilePath {
                unit: unit.id(),
                path: file.clone(),
            });
        }
    }
    Ok(())
}

fn is_plain_type(ty: &str) -> bool {
    !ty.is_empty() && ty != "." && ty != ".." && !ty.contains(['/', '\\'])
}

fn is_tree_relative(path: &str) -> bool {
    let mut depth: i32 = 0;
    for component in Utf8Path::new(path).components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir => return false,
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            Utf8Component::Normal(_) => depth += 1,
        }
    }
    true
}

/// Expands glob `patterns` relative to `base`.
///
/// Results are relative to `base`, de-duplicated and sorted. Patterns that
/// match nothing contribute nothing.
pub fn expand_paths(base: &Utf8Path, patterns: &[String]) -> Result<Vec<String>, TreeConfigError> {
    let mut expanded = BTreeSet::new();
    for pattern in patterns {
        let full = base.join(pattern);
        let hits = glob::glob(full.as_str()).map_err(|source| TreeConfigError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for hit in hits {
            let hit = hit.map_err(|e| TreeConfigError::Io {
                path: Utf8PathBuf::from(e.path().to_string_lossy().into_owned()),
                source: e.into_error(),
            })?;
            let hit = hit.to_string_lossy().replace('\\', "/");
            let rel = Utf8Path::new(&hit)
                .strip_prefix(base)
                .map(|p| p.to_string())
                .unwrap_or(hit.clone());
            expanded.insert(rel);
        }
    }
    Ok(expanded.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use srcfab_types::SourceUnit;

    #[test]
    fn relative_paths_are_accepted() {
        for ok in ["a.go", "./a/b.go", "a/../b.go", "a/b/../../c"] {
            assert!(is_tree_relative(ok), "{ok}");
        }
        for bad in ["/etc/passwd", "..", "../x", "a/../../x"] {
            assert!(!is_tree_relative(bad), "{bad}");
        }
    }

    #[test]
    fn validate_names_the_unit() {
        let mut unit = SourceUnit::new("pkg", "GoPackage");
        unit.files = vec!["ok.go".into(), "../evil.go".into()];
        let err = validate_tree(&Tree::with_units(vec![unit])).unwrap_err();
        assert!(matches!(
            err,
            TreeConfigError::InvalidFilePath { ref path, .. } if path == "../evil.go"
        ));
        assert!(err.to_string().contains("pkg@GoPackage"));
    }

    #[test]
    fn escaping_unit_names_are_rejected() {
        for bad in ["../../evil", "/abs/pkg", "a/../../b", ".."] {
            let err = validate_tree(&Tree::with_units(vec![SourceUnit::new(bad, "GoPackage")]))
                .unwrap_err();
            assert!(
                matches!(err, TreeConfigError::InvalidUnitName { field: "name", ref value, .. } if value == bad),
                "{bad}"
            );
        }
    }

    #[test]
    fn unit_types_may_not_hold_separators() {
        for bad in ["../x", "a/b", "..", ".", "a\\b", ""] {
            let err = validate_unit(&SourceUnit::new("pkg", bad)).unwrap_err();
            assert!(
                matches!(err, TreeConfigError::InvalidUnitName { field: "type", .. }),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn nested_unit_names_are_accepted() {
        for ok in ["github.com/acme/pkg", "./pkg", "a/../b", "."] {
            validate_unit(&SourceUnit::new(ok, "GoPackage")).expect(ok);
        }
    }

    #[test]
    fn escaping_unit_dir_is_rejected() {
        let mut unit = SourceUnit::new("pkg", "GoPackage");
        unit.dir = "../elsewhere".to_string();
        assert!(matches!(
            validate_unit(&unit),
            Err(TreeConfigError::InvalidFilePath { ref path, .. }) if path == "../elsewhere"
        ));
    }

    #[test]
    fn srcfile_with_escaping_unit_name_fails_to_read() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = Utf8Path::from_path(temp.path()).expect("utf8");
        fs::write(
            dir.join(SRCFILE),
            r#"{"SourceUnits": [{"Name": "../../evil", "Type": "GoPackage"}]}"#,
        )
        .expect("write");
        let err = read_tree_config(dir).unwrap_err();
        assert!(err.to_string().contains("invalid unit name"), "{err}");
    }
}
