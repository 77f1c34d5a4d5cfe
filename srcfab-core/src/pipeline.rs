//! Core configure, plan and make pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: git, scanners, tool choice and make
//! execution all go through the port traits.

use crate::ports::{GitPort, MakeExecutor, MakeInvocation, Scanner};
use crate::scan::{merge_units, scan_multi};
use crate::settings::{ConfigureSettings, MakeSettings, PlanSettings};
use crate::tree_config::{read_tree_config, validate_tree};
use anyhow::Context;
use camino::Utf8Path;
use srcfab_plan::{BuildDataDir, PlanOptions, ToolChooser};
use srcfab_render::render_makefile;
use srcfab_store::{RepoStore, StoreError, read_cached_tree, write_unit};
use srcfab_types::plan::{ALL_TARGET, Makefile};
use srcfab_types::Tree;
use tracing::{debug, info, warn};

/// Error type for pipeline results.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No build data for the commit; `srcfab config` has not run.
    #[error(transparent)]
    NotConfigured(StoreError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, ToolError::NotConfigured(_))
    }
}

/// Outcome of `run_configure`.
#[derive(Debug)]
pub struct ConfigureOutcome {
    /// The tree with its final unit list.
    pub tree: Tree,
    pub commit_id: Option<String>,
    /// Store-relative unit files written, in unit order.
    pub written: Vec<String>,
}

/// Scan the tree, merge units with the Srcfile and (optionally) write them
/// to the build store.
pub fn run_configure(
    settings: &ConfigureSettings,
    git: &dyn GitPort,
    scanner: &dyn Scanner,
) -> Result<ConfigureOutcome, ToolError> {
    let root = settings.repo_root.as_path();
    let mut tree = read_tree_config(root).context("read tree config")?;

    if tree.scanners.is_empty() {
        tree.scanners = settings.default_scanners.clone();
    }
    let scanned = if tree.scanners.is_empty() {
        warn!("no scanners configured; only Srcfile units will be used");
        Vec::new()
    } else {
        scan_multi(scanner, &tree.scanners, &tree.config)?
    };
    debug!(count = scanned.len(), "scanned source units");

    let mut units = merge_units(&tree, scanned, root).context("merge source units")?;

    let commit_id = resolve_commit(settings.commit_id.as_deref(), git, root)?;
    let repo_uri = resolve_repo_uri(settings.repo_uri.as_deref(), git, root)?;
    for unit in &mut units {
        if unit.repo.is_empty()
            && let Some(uri) = &repo_uri
        {
            unit.repo = uri.clone();
        }
        if unit.commit_id.is_empty()
            && let Some(c) = &commit_id
        {
            unit.commit_id = c.clone();
        }
    }
    tree.units = units;

    let mut written = Vec::new();
    if settings.write {
        let commit_id = commit_id
            .as_deref()
            .context("no commit ID to write source units under (not a git repository?)")?;
        let commit = RepoStore::local(root).commit(commit_id);
        for unit in &tree.units {
            let rel = write_unit(&commit, unit)
                .with_context(|| format!("write source unit {}", unit.id()))?;
            written.push(rel);
        }
        info!(commit = %commit_id, units = written.len(), "wrote source units");
    }

    Ok(ConfigureOutcome {
        tree,
        commit_id,
        written,
    })
}

/// Outcome of `run_plan`.
#[derive(Debug)]
pub struct PlanOutcome {
    pub makefile: Makefile,
    pub commit_id: String,
}

/// Build the Makefile for the configured units of the current commit.
pub fn run_plan(
    settings: &PlanSettings,
    git: &dyn GitPort,
    chooser: &dyn ToolChooser,
) -> Result<PlanOutcome, ToolError> {
    let root = settings.repo_root.as_path();
    let commit_id = resolve_commit(settings.commit_id.as_deref(), git, root)?
        .context("no commit ID to plan for (not a git repository?)")?;

    let store = RepoStore::new(root.join(&settings.data_dir));
    let tree = read_cached_tree(&store.commit(&commit_id)).map_err(|e| {
        if e.is_not_configured() {
            ToolError::NotConfigured(e)
        } else {
            ToolError::Internal(anyhow::Error::new(e).context("read configured source units"))
        }
    })?;
    validate_tree(&tree).context("validate configured source units")?;

    let data_dir = BuildDataDir::new(settings.data_dir.clone(), Some(commit_id.clone()));
    let options = PlanOptions {
        no_cache: settings.no_cache,
        command: settings.command.clone(),
        exec_flags: settings.exec_flags.clone(),
    };
    let makefile = srcfab_plan::create_makefile(&data_dir, &tree, &options, chooser)
        .context("create Makefile")?;
    debug!(rules = makefile.rules.len(), commit = %commit_id, "planned build");

    Ok(PlanOutcome {
        makefile,
        commit_id,
    })
}

/// Outcome of `run_make`.
#[derive(Debug)]
pub struct MakeOutcome {
    pub makefile: String,
    pub goals: Vec<String>,
}

/// Plan, then hand the rendered Makefile to `executor`.
pub fn run_make(
    settings: &MakeSettings,
    git: &dyn GitPort,
    chooser: &dyn ToolChooser,
    executor: &dyn MakeExecutor,
) -> Result<MakeOutcome, ToolError> {
    let plan = run_plan(&settings.plan, git, chooser)?;
    let makefile = render_makefile(&plan.makefile);

    let goals = if settings.goals.is_empty() {
        vec![ALL_TARGET.to_string()]
    } else {
        settings.goals.clone()
    };
    let invocation = MakeInvocation {
        dir: settings
            .dir
            .clone()
            .unwrap_or_else(|| settings.plan.repo_root.clone()),
        goals: goals.clone(),
        dry_run: settings.dry_run,
        quiet: settings.quiet,
        jobs: settings.jobs,
    };
    executor
        .execute(&makefile, &invocation)
        .context("execute Makefile")?;

    Ok(MakeOutcome { makefile, goals })
}

fn resolve_commit(
    explicit: Option<&str>,
    git: &dyn GitPort,
    root: &Utf8Path,
) -> anyhow::Result<Option<String>> {
    if let Some(c) = explicit {
        return Ok(Some(c.to_string()));
    }
    git.head_sha(root)
        .with_context(|| format!("resolve HEAD of {root}"))
}

fn resolve_repo_uri(
    explicit: Option<&str>,
    git: &dyn GitPort,
    root: &Utf8Path,
) -> anyhow::Result<Option<String>> {
    if let Some(uri) = explicit {
        return Ok(Some(uri.to_string()));
    }
    let Some(url) = git
        .origin_url(root)
        .with_context(|| format!("read origin remote of {root}"))?
    else {
        return Ok(None);
    };
    match srcfab_analysis::try_make_uri(&url) {
        Ok(uri) => Ok(Some(uri)),
        Err(e) => {
            warn!(url = %url, error = %e, "cannot derive repo URI from origin remote");
            Ok(None)
        }
    }
}
