use crate::error::ToolchainError;
use crate::info::{DESCRIPTOR_FILE, Info};
use crate::search_path::{SearchPath, clean_toolchain_path};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use tracing::debug;
use walkdir::WalkDir;

/// Finds the toolchain at `path` on the search path.
///
/// Exactly one root may contain it: two or more is a shadowing error, not a
/// first-match win.
pub fn lookup(search: &SearchPath, path: &str) -> Result<Info, ToolchainError> {
    let path = clean_toolchain_path(path)?;
    let matches = find_descriptors(search, &path)?;

    match matches.len() {
        0 => Err(ToolchainError::NotFound { path }),
        1 => {
            let (root, dir) = matches.into_iter().next().ok_or_else(|| {
                ToolchainError::NotFound { path: path.clone() }
            })?;
            let rel = dir
                .strip_prefix(&root)
                .map(|p| p.as_str().to_string())
                .unwrap_or(path);
            debug!(toolchain = %rel, dir = %dir, "found toolchain");
            Info::from_dir(rel, dir)
        }
        _ => Err(ToolchainError::Shadowed {
            path,
            found: matches.into_iter().map(|(_, dir)| dir).collect(),
        }),
    }
}

/// Directory of the toolchain at `path`, or where it would be created in the
/// first search root when it does not exist yet.
pub fn dir(search: &SearchPath, path: &str) -> Result<Utf8PathBuf, ToolchainError> {
    match lookup(search, path) {
        Ok(info) => Ok(info.dir),
        Err(ToolchainError::NotFound { path }) => Ok(search.first()?.join(path)),
        Err(e) => Err(e),
    }
}

fn find_descriptors(
    search: &SearchPath,
    path: &str,
) -> Result<Vec<(Utf8PathBuf, Utf8PathBuf)>, ToolchainError> {
    let mut seen = BTreeSet::new();
    let mut found = Vec::new();
    for root in search.roots() {
        let pattern = if root.as_str() == "." {
            format!("{path}/{DESCRIPTOR_FILE}")
        } else {
            format!("{}/{path}/{DESCRIPTOR_FILE}", glob::Pattern::escape(root.as_str()))
        };
        let entries = glob::glob(&pattern).map_err(|e| ToolchainError::InvalidPath {
            path: format!("{path}: {e}"),
        })?;
        for entry in entries {
            let file = entry.map_err(|e| {
                let p = e.path().display().to_string();
                ToolchainError::io(p, e.into_error())
            })?;
            let Ok(file) = Utf8PathBuf::from_path_buf(file) else {
                continue;
            };
            let Some(dir) = file.parent().map(Utf8Path::to_path_buf) else {
                continue;
            };
            if seen.insert(dir.clone()) {
                found.push((root.clone(), dir));
            }
        }
    }
    // Deterministic order matters.
    found.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(found)
}

/// Lists every toolchain reachable from the search path, sorted by path.
///
/// Directories starting with `.` or `_` are skipped and toolchains are not
/// searched for inside other toolchains. Symlinked directories are followed
/// and their toolchains are named relative to the root that holds the link.
/// A toolchain directory reached by more than one route is listed once.
pub fn list(search: &SearchPath) -> Result<Vec<Info>, ToolchainError> {
    let mut found: BTreeMap<String, Info> = BTreeMap::new();
    let mut by_canonical: HashMap<PathBuf, String> = HashMap::new();
    let mut followed: HashSet<PathBuf> = HashSet::new();
    let mut pending: VecDeque<(Utf8PathBuf, String)> = search
        .roots()
        .iter()
        .map(|r| (r.clone(), String::new()))
        .collect();

    while let Some((base, prefix)) = pending.pop_front() {
        if !base.is_dir() {
            debug!(dir = %base, "skipping missing toolchain root");
            continue;
        }

        let mut walker = WalkDir::new(&base).sort_by_file_name().into_iter();
        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|e| {
                let p = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| base.to_string());
                ToolchainError::io(p, std::io::Error::other(e.to_string()))
            })?;
            let Some(path) = Utf8Path::from_path(entry.path()) else {
                continue;
            };

            if entry.depth() > 0 {
                let name = entry.file_name().to_string_lossy();
                if name.starts_with('.') || name.starts_with('_') {
                    if entry.file_type().is_dir() {
                        walker.skip_current_dir();
                    }
                    continue;
                }
            }

            let rel = join_rel(&prefix, path.strip_prefix(&base).unwrap_or(path));

            if entry.depth() > 0 && entry.path_is_symlink() {
                match fs_err::metadata(path) {
                    Ok(meta) if meta.is_dir() => {
                        let canonical = canonicalize(path)?;
                        if followed.insert(canonical) {
                            debug!(link = %path, as_path = %rel, "following symlinked toolchain dir");
                            pending.push_back((path.to_owned(), rel));
                        }
                    }
                    Ok(_) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(ToolchainError::io(path, e)),
                }
                continue;
            }

            if !entry.file_type().is_dir() || !path.join(DESCRIPTOR_FILE).is_file() {
                continue;
            }
            // No nested toolchains.
            walker.skip_current_dir();
            if rel.is_empty() {
                continue;
            }

            let canonical = canonicalize(path)?;
            if let Some(existing) = by_canonical.get(&canonical) {
                debug!(toolchain = %existing, also = %rel, "toolchain already listed");
                continue;
            }
            if let Some(other) = found.get(&rel) {
                return Err(ToolchainError::DuplicatePath {
                    path: rel,
                    first: other.dir.clone(),
                    second: path.to_owned(),
                });
            }
            by_canonical.insert(canonical, rel.clone());
            let info = Info::from_dir(rel.clone(), path.to_owned())?;
            found.insert(rel, info);
        }
    }

    Ok(found.into_values().collect())
}

fn join_rel(prefix: &str, rel: &Utf8Path) -> String {
    let rel = rel.as_str().trim_matches('/');
    match (prefix.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{rel}"),
    }
}

fn canonicalize(path: &Utf8Path) -> Result<PathBuf, ToolchainError> {
    fs_err::canonicalize(path).map_err(|e| ToolchainError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_rel_handles_empty_parts() {
        assert_eq!(join_rel("", Utf8Path::new("a/b")), "a/b");
        assert_eq!(join_rel("link", Utf8Path::new("")), "link");
        assert_eq!(join_rel("link", Utf8Path::new("tc")), "link/tc");
    }
}
