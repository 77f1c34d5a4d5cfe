//! Default filesystem- and process-backed port implementations.

use crate::ports::{
    CatalogEntry, GitPort, MakeExecutor, MakeInvocation, Scanner, ToolchainCatalog,
};
use anyhow::Context;
use camino::Utf8Path;
use serde_json::Value;
use srcfab_plan::ToolChooser;
use srcfab_toolchain::{Mode, SearchPath, Tool, ToolchainConfig};
use srcfab_types::{SourceUnit, ToolRef};
use std::collections::BTreeMap;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Git operations via the `git` executable.
#[derive(Debug, Clone, Default)]
pub struct ShellGitPort;

impl ShellGitPort {
    fn query(repo_root: &Utf8Path, args: &[&str]) -> anyhow::Result<Option<String>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(repo_root)
            .stderr(Stdio::null())
            .output()
            .with_context(|| format!("run git {}", args.join(" ")))?;
        if !output.status.success() {
            return Ok(None);
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!value.is_empty()).then_some(value))
    }
}

impl GitPort for ShellGitPort {
    fn head_sha(&self, repo_root: &Utf8Path) -> anyhow::Result<Option<String>> {
        Self::query(repo_root, &["rev-parse", "HEAD"])
    }

    fn origin_url(&self, repo_root: &Utf8Path) -> anyhow::Result<Option<String>> {
        Self::query(repo_root, &["config", "--get", "remote.origin.url"])
    }
}

/// Fixed git answers for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct StaticGitPort {
    pub head_sha: Option<String>,
    pub origin_url: Option<String>,
}

impl GitPort for StaticGitPort {
    fn head_sha(&self, _repo_root: &Utf8Path) -> anyhow::Result<Option<String>> {
        Ok(self.head_sha.clone())
    }

    fn origin_url(&self, _repo_root: &Utf8Path) -> anyhow::Result<Option<String>> {
        Ok(self.origin_url.clone())
    }
}

/// Toolchains found on a search path.
#[derive(Debug, Clone)]
pub struct FsToolchainCatalog {
    pub search: SearchPath,
}

impl FsToolchainCatalog {
    pub fn new(search: SearchPath) -> Self {
        Self { search }
    }
}

impl ToolchainCatalog for FsToolchainCatalog {
    fn toolchains(&self) -> anyhow::Result<Vec<CatalogEntry>> {
        let infos = srcfab_toolchain::list(&self.search)
            .with_context(|| format!("list toolchains in {}", self.search))?;
        let mut entries = Vec::with_capacity(infos.len());
        for info in infos {
            let config = info
                .read_config()
                .with_context(|| format!("read descriptor of toolchain {}", info.path))?;
            entries.push(CatalogEntry {
                path: info.path,
                config,
            });
        }
        Ok(entries)
    }
}

/// In-memory catalog for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToolchainCatalog {
    entries: Vec<CatalogEntry>,
}

impl InMemoryToolchainCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn with(mut self, path: &str, config: ToolchainConfig) -> Self {
        self.entries.push(CatalogEntry {
            path: path.to_string(),
            config,
        });
        self
    }
}

impl ToolchainCatalog for InMemoryToolchainCatalog {
    fn toolchains(&self) -> anyhow::Result<Vec<CatalogEntry>> {
        Ok(self.entries.clone())
    }
}

/// Chooses tools from a catalog snapshot.
///
/// Candidates are ordered by toolchain path, then subcommand; the first
/// one that handles the op and unit type wins.
#[derive(Debug, Clone, Default)]
pub struct CatalogToolChooser {
    tools: Vec<(String, srcfab_toolchain::ToolInfo)>,
}

impl CatalogToolChooser {
    pub fn load(catalog: &dyn ToolchainCatalog) -> anyhow::Result<Self> {
        let mut tools: Vec<(String, srcfab_toolchain::ToolInfo)> = catalog
            .toolchains()?
            .into_iter()
            .flat_map(|e| {
                let path = e.path;
                e.config
                    .tools
                    .into_iter()
                    .map(move |t| (path.clone(), t))
            })
            .collect();
        // Deterministic order matters.
        tools.sort_by(|a, b| (&a.0, &a.1.subcmd).cmp(&(&b.0, &b.1.subcmd)));
        Ok(Self { tools })
    }

    /// Every known tool with its toolchain path, in choice order.
    pub fn tools(&self) -> &[(String, srcfab_toolchain::ToolInfo)] {
        &self.tools
    }
}

impl ToolChooser for CatalogToolChooser {
    fn choose(&self, op: &str, unit: &SourceUnit) -> anyhow::Result<ToolRef> {
        self.tools
            .iter()
            .find(|(_, t)| t.handles(op, &unit.unit_type))
            .map(|(path, t)| ToolRef::new(path, &t.subcmd))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no tool found for op {:?} and unit type {:?}",
                    op,
                    unit.unit_type
                )
            })
    }
}

/// Runs scanners as toolchain tools.
#[derive(Debug, Clone)]
pub struct ToolScanner {
    pub search: SearchPath,
    pub mode: Mode,
    pub quiet: bool,
}

impl Scanner for ToolScanner {
    fn scan(
        &self,
        scanner: &ToolRef,
        config: &BTreeMap<String, Value>,
    ) -> anyhow::Result<Vec<SourceUnit>> {
        let tool = Tool::open(&self.search, scanner, self.mode)?;
        let units = if self.quiet {
            tool.run_quiet(&[], Some(config))?
        } else {
            tool.run(&[], Some(config))?
        };
        Ok(units)
    }
}

/// Runs `make` on a Makefile written to a temporary file.
#[derive(Debug, Clone)]
pub struct ShellMakeExecutor {
    pub program: String,
}

impl Default for ShellMakeExecutor {
    fn default() -> Self {
        Self {
            program: "make".to_string(),
        }
    }
}

impl ShellMakeExecutor {
    pub(crate) fn args(&self, makefile: &Utf8Path, invocation: &MakeInvocation) -> Vec<String> {
        let mut args = Vec::new();
        if invocation.dry_run {
            args.push("-n".to_string());
        }
        if invocation.quiet {
            args.push("-s".to_string());
        }
        if let Some(jobs) = invocation.jobs {
            args.push(format!("-j{jobs}"));
        }
        args.extend([
            "-f".to_string(),
            makefile.to_string(),
            "-C".to_string(),
            invocation.dir.to_string(),
        ]);
        args.extend(invocation.goals.iter().cloned());
        args
    }
}

impl MakeExecutor for ShellMakeExecutor {
    fn execute(&self, makefile: &str, invocation: &MakeInvocation) -> anyhow::Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix("srcfab-")
            .suffix(".mk")
            .tempfile()
            .context("create temporary Makefile")?;
        tmp.write_all(makefile.as_bytes())
            .context("write temporary Makefile")?;
        tmp.flush().context("flush temporary Makefile")?;

        let path = Utf8Path::from_path(tmp.path())
            .with_context(|| format!("non-UTF-8 temp path {}", tmp.path().display()))?;
        let args = self.args(path, invocation);
        debug!(program = %self.program, args = ?args, "running make");

        let mut cmd = Command::new(&self.program);
        cmd.args(&args);
        if invocation.quiet {
            cmd.stdout(Stdio::null());
        }
        let status = cmd
            .status()
            .with_context(|| format!("run {}", self.program))?;
        if !status.success() {
            anyhow::bail!("{} exited with {}", self.program, status);
        }
        Ok(())
    }
}
