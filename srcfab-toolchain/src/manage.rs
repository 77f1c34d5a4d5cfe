//! Installing, fetching and building toolchains under the first search root.

use crate::error::ToolchainError;
use crate::find::{dir, lookup};
use crate::info::Info;
use crate::process::run_checked;
use crate::search_path::{SearchPath, clean_toolchain_path};
use crate::toolchain::Toolchain;
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use std::process::Command;
use tracing::{debug, info};

/// Upper bound on concurrent toolchain builds.
pub const MAX_PARALLEL_BUILDS: usize = 8;

const TEMP_DIR_NAME: &str = ".tmp";

/// Scratch directory for a toolchain: `<first root>/.tmp/<path>`, created on
/// demand.
pub fn temp_dir(search: &SearchPath, path: &str) -> Result<Utf8PathBuf, ToolchainError> {
    let path = clean_toolchain_path(path)?;
    let dir = search.first()?.join(TEMP_DIR_NAME).join(path);
    fs_err::create_dir_all(&dir).map_err(|e| ToolchainError::io(dir.clone(), e))?;
    Ok(dir)
}

/// Symlinks the local directory `src` into the first search root as the
/// toolchain `path`.
pub fn add(
    search: &SearchPath,
    src: &Utf8Path,
    path: &str,
    force: bool,
) -> Result<Utf8PathBuf, ToolchainError> {
    let path = clean_toolchain_path(path)?;
    let dst = search.first()?.join(&path);

    match fs_err::symlink_metadata(&dst) {
        Ok(meta) => {
            if !force {
                return Err(anyhow::anyhow!(
                    "toolchain path {dst} already exists (use --force to replace it)"
                )
                .into());
            }
            debug!(path = %dst, "removing existing toolchain");
            let removed = if meta.is_dir() {
                fs_err::remove_dir_all(&dst)
            } else {
                fs_err::remove_file(&dst)
            };
            removed.map_err(|e| ToolchainError::io(dst.clone(), e))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(ToolchainError::io(dst, e)),
    }

    if let Some(parent) = dst.parent() {
        fs_err::create_dir_all(parent).map_err(|e| ToolchainError::io(parent, e))?;
    }
    let target = fs_err::canonicalize(src).map_err(|e| ToolchainError::io(src, e))?;
    symlink_dir(&target, dst.as_std_path()).map_err(|e| ToolchainError::io(dst.clone(), e))?;
    info!(toolchain = %path, src = %src, "added toolchain");
    Ok(dst)
}

#[cfg(unix)]
fn symlink_dir(target: &std::path::Path, link: &std::path::Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &std::path::Path, link: &std::path::Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

/// Clone URL for a toolchain path.
pub fn clone_url(path: &str) -> String {
    format!("https://{path}.git")
}

/// Clones the toolchain's repository into the first search root, or pulls it
/// when `update` is set and it is already present.
pub fn get(search: &SearchPath, path: &str, update: bool) -> Result<Info, ToolchainError> {
    let path = clean_toolchain_path(path)?;
    let dir = dir(search, &path)?;

    if dir.exists() {
        if update {
            info!(toolchain = %path, dir = %dir, "updating toolchain");
            let mut cmd = Command::new("git");
            cmd.args(["pull"]).current_dir(&dir);
            run_checked(&mut cmd)?;
        } else {
            debug!(toolchain = %path, dir = %dir, "toolchain already present");
        }
    } else {
        if let Some(parent) = dir.parent() {
            fs_err::create_dir_all(parent).map_err(|e| ToolchainError::io(parent, e))?;
        }
        info!(toolchain = %path, dir = %dir, "fetching toolchain");
        let mut cmd = Command::new("git");
        cmd.arg("clone").arg(clone_url(&path)).arg(dir.as_str());
        run_checked(&mut cmd)?;
    }

    lookup(search, &path)
}

/// Outcome of building one toolchain.
#[derive(Debug)]
pub struct BuildResult {
    pub path: String,
    pub result: Result<(), ToolchainError>,
}

/// Builds toolchains concurrently. Each toolchain path is built once; results
/// come back in path order.
pub fn build_all(toolchains: Vec<Box<dyn Toolchain>>) -> Result<Vec<BuildResult>, ToolchainError> {
    let mut toolchains = toolchains;
    // Deterministic order matters.
    toolchains.sort_by(|a, b| a.path().cmp(b.path()));
    toolchains.dedup_by(|a, b| a.path() == b.path());

    if toolchains.is_empty() {
        return Ok(Vec::new());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(toolchains.len().min(MAX_PARALLEL_BUILDS))
        .build()
        .map_err(|e| anyhow::anyhow!("build thread pool: {e}"))?;

    Ok(pool.install(|| {
        toolchains
            .par_iter()
            .map(|tc| BuildResult {
                path: tc.path().to_string(),
                result: tc.build(),
            })
            .collect()
    }))
}
