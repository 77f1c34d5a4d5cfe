use crate::error::StoreError;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Serialize;
use srcfab_types::SourceUnit;
use std::io::ErrorKind;
use tracing::debug;
use walkdir::WalkDir;

/// Directory name of the repository-local build store.
pub const BUILD_DATA_DIR_NAME: &str = ".srcfab-cache";

/// Files at a commit root that are not build data.
const IGNORED_FILES: &[&str] = &["config.json"];

/// Store holding build data for many repositories, laid out as
/// `<root>/<repo URI>/<commit>/...`.
#[derive(Debug, Clone)]
pub struct BuildStore {
    root: Utf8PathBuf,
}

impl BuildStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Namespace scoped to one repository.
    pub fn repo(&self, repo_uri: &str) -> Result<RepoStore, StoreError> {
        let rel = checked_rel(repo_uri)?;
        Ok(RepoStore::new(self.root.join(rel)))
    }
}

/// Build data of a single repository, keyed by commit.
#[derive(Debug, Clone)]
pub struct RepoStore {
    root: Utf8PathBuf,
}

impl RepoStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store kept inside a working tree at `<repo_root>/.srcfab-cache`.
    pub fn local(repo_root: &Utf8Path) -> Self {
        Self::new(repo_root.join(BUILD_DATA_DIR_NAME))
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Sub-store for one commit. Nothing is created until the first write.
    pub fn commit(&self, commit_id: &str) -> CommitStore {
        CommitStore {
            root: self.root.join(commit_id),
            commit_id: commit_id.to_string(),
        }
    }

    /// Path of `rel` at `commit_id`. Pure composition, no I/O.
    pub fn file_path(&self, commit_id: &str, rel: &str) -> Utf8PathBuf {
        self.root.join(commit_id).join(rel)
    }

    pub fn build_data_exists_for_commit(&self, commit_id: &str) -> bool {
        self.root.join(commit_id).is_dir()
    }

    /// Deletes everything stored for `commit_id`, files before directories.
    ///
    /// Safe to call again after a partial or complete removal.
    pub fn remove_all_data_for_commit(&self, commit_id: &str) -> Result<(), StoreError> {
        let dir = self.root.join(commit_id);
        if !dir.exists() {
            debug!(dir = %dir, "no build data to remove");
            return Ok(());
        }

        for entry in WalkDir::new(&dir).contents_first(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) if is_not_found(&e) => continue,
                Err(e) => {
                    return Err(StoreError::io(
                        dir.clone(),
                        std::io::Error::other(e.to_string()),
                    ));
                }
            };
            let path = entry.path();
            let res = if entry.file_type().is_dir() {
                fs::remove_dir(path)
            } else {
                fs::remove_file(path)
            };
            match res {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io(dir.clone(), e)),
            }
        }
        debug!(dir = %dir, "removed build data");
        Ok(())
    }

    /// Commits with any stored data, sorted.
    pub fn commits(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.exists() {
            return Ok(vec![]);
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|e| StoreError::io(self.root.clone(), e))? {
            let entry = entry.map_err(|e| StoreError::io(self.root.clone(), e))?;
            if entry.path().is_dir() {
                out.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        out.sort();
        Ok(out)
    }
}

fn is_not_found(e: &walkdir::Error) -> bool {
    e.io_error().map(|io| io.kind()) == Some(ErrorKind::NotFound)
}

/// Writable, walkable view of one commit's build data.
#[derive(Debug, Clone)]
pub struct CommitStore {
    root: Utf8PathBuf,
    commit_id: String,
}

impl CommitStore {
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Errors with [`StoreError::NotConfigured`] if nothing was ever written.
    pub fn require_exists(&self) -> Result<(), StoreError> {
        if self.exists() {
            Ok(())
        } else {
            Err(StoreError::NotConfigured {
                dir: self.root.clone(),
            })
        }
    }

    pub fn path(&self, rel: &str) -> Result<Utf8PathBuf, StoreError> {
        Ok(self.root.join(checked_rel(rel)?))
    }

    /// Creates (or truncates) `rel`, making parent directories as needed.
    pub fn create(&self, rel: &str) -> Result<fs::File, StoreError> {
        let path = self.path(rel)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        fs::File::create(&path).map_err(|e| StoreError::io(path, e))
    }

    pub fn open(&self, rel: &str) -> Result<fs::File, StoreError> {
        let path = self.path(rel)?;
        fs::File::open(&path).map_err(|e| StoreError::io(path, e))
    }

    pub fn write(&self, rel: &str, contents: &[u8]) -> Result<(), StoreError> {
        use std::io::Write;
        let mut f = self.create(rel)?;
        f.write_all(contents)
            .map_err(|e| StoreError::io(self.root.join(rel), e))
    }

    pub fn write_json<T: Serialize>(&self, rel: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value).map_err(|source| StoreError::Decode {
            name: rel.to_string(),
            source,
        })?;
        self.write(rel, &bytes)
    }

    pub fn read(&self, rel: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path(rel)?;
        fs::read(&path).map_err(|e| StoreError::io(path, e))
    }

    pub fn contains(&self, rel: &str) -> bool {
        self.path(rel).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Every file below the commit root, relative and sorted.
    pub fn walk(&self) -> Result<Vec<Utf8PathBuf>, StoreError> {
        self.require_exists()?;
        let mut out = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry.map_err(|e| {
                StoreError::io(self.root.clone(), std::io::Error::other(e.to_string()))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .ok()
                .and_then(|p| Utf8Path::from_path(p))
                .ok_or_else(|| StoreError::BadDataFilePath {
                    path: entry.path().display().to_string(),
                })?;
            out.push(rel.to_path_buf());
        }
        out.sort();
        Ok(out)
    }
}

/// `<unit name>/<unit type>.<data type>.json`, cleaned.
pub fn unit_data_file(unit: &SourceUnit, data_type_name: &str) -> String {
    clean(&format!(
        "{}/{}.{}.json",
        unit.name, unit.unit_type, data_type_name
    ))
}

fn clean(path: &str) -> String {
    let parts: Vec<&str> = path
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    parts.join("/")
}

fn checked_rel(rel: &str) -> Result<&Utf8Path, StoreError> {
    let p = Utf8Path::new(rel);
    let escapes = p
        .components()
        .any(|c| matches!(c, Utf8Component::ParentDir | Utf8Component::RootDir | Utf8Component::Prefix(_)));
    if escapes {
        return Err(StoreError::InvalidPath {
            path: rel.to_string(),
        });
    }
    Ok(p)
}

/// Unit type and data type recovered from an artifact file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataFileName {
    pub unit_type: String,
    pub data_type: String,
}

impl DataFileName {
    /// Splits `GoPackage.graph.json` into `("GoPackage", "graph")`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(".json")?;
        let (unit_type, data_type) = stem.rsplit_once('.')?;
        if unit_type.is_empty() || data_type.is_empty() {
            return None;
        }
        Some(Self {
            unit_type: unit_type.to_string(),
            data_type: data_type.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildDataFileInfo {
    pub repo_uri: String,
    pub commit_id: String,

    /// Path within the commit.
    pub path: String,

    /// Unit name, when the path names a unit artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<DataFileName>,

    pub size: u64,
    pub mod_time: DateTime<Utc>,
}

/// Lists build data files under `path` (relative to the repo store root).
///
/// The first component of each file's store-relative path is its commit.
/// Any I/O error aborts the listing.
pub fn list_data_files(
    store: &RepoStore,
    repo_uri: &str,
    path: &Utf8Path,
) -> Result<Vec<BuildDataFileInfo>, StoreError> {
    let rel = checked_rel(path.as_str())?;
    let start = if rel.as_str().is_empty() || rel.as_str() == "." {
        store.root().to_path_buf()
    } else {
        store.root().join(rel)
    };
    if !start.exists() {
        return Err(StoreError::NotConfigured { dir: start });
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(&start).follow_links(true) {
        let entry = entry
            .map_err(|e| StoreError::io(start.clone(), std::io::Error::other(e.to_string())))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let abs = Utf8Path::from_path(entry.path()).ok_or_else(|| StoreError::BadDataFilePath {
            path: entry.path().display().to_string(),
        })?;
        let rel = abs
            .strip_prefix(store.root())
            .map_err(|_| StoreError::BadDataFilePath {
                path: abs.to_string(),
            })?;
        let rel_str = rel.as_str().replace('\\', "/");
        if IGNORED_FILES.contains(&rel_str.as_str()) {
            continue;
        }

        let (commit_id, file) = rel_str
            .split_once('/')
            .filter(|(c, f)| !c.is_empty() && !f.is_empty())
            .ok_or_else(|| StoreError::BadDataFilePath {
                path: rel_str.clone(),
            })?;

        let meta = entry
            .metadata()
            .map_err(|e| StoreError::io(abs, std::io::Error::other(e.to_string())))?;
        let mod_time = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .map_err(|e| StoreError::io(abs, e))?;

        let (unit, base) = match file.rsplit_once('/') {
            Some((dir, base)) => (Some(dir.to_string()), base),
            None => (None, file),
        };

        out.push(BuildDataFileInfo {
            repo_uri: repo_uri.to_string(),
            commit_id: commit_id.to_string(),
            path: file.to_string(),
            unit,
            name: DataFileName::parse(base),
            size: meta.len(),
            mod_time,
        });
    }

    // Deterministic order matters.
    out.sort_by(|a, b| (&a.commit_id, &a.path).cmp(&(&b.commit_id, &b.path)));
    Ok(out)
}
