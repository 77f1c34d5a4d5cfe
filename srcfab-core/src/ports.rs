//! Port traits abstracting all I/O away from the pipelines.

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use srcfab_toolchain::ToolchainConfig;
use srcfab_types::{SourceUnit, ToolRef};
use std::collections::BTreeMap;

/// Git queries (HEAD commit, origin remote).
pub trait GitPort {
    fn head_sha(&self, repo_root: &Utf8Path) -> anyhow::Result<Option<String>>;
    fn origin_url(&self, repo_root: &Utf8Path) -> anyhow::Result<Option<String>>;
}

/// A toolchain and the tools its descriptor declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub path: String,
    pub config: ToolchainConfig,
}

/// Toolchains available for tool choice.
pub trait ToolchainCatalog {
    fn toolchains(&self) -> anyhow::Result<Vec<CatalogEntry>>;
}

/// Runs one scanner tool against the tree.
pub trait Scanner: Sync {
    /// `config` is the tree's `Config` map, sent to the scanner on stdin.
    fn scan(
        &self,
        scanner: &ToolRef,
        config: &BTreeMap<String, Value>,
    ) -> anyhow::Result<Vec<SourceUnit>>;
}

/// How a rendered Makefile should be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeInvocation {
    pub dir: Utf8PathBuf,
    pub goals: Vec<String>,
    pub dry_run: bool,
    pub quiet: bool,
    pub jobs: Option<usize>,
}

/// A make-compatible executor.
pub trait MakeExecutor {
    fn execute(&self, makefile: &str, invocation: &MakeInvocation) -> anyhow::Result<()>;
}
