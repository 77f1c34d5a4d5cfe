//! `srcfab toolchain` subcommands.

use crate::config::MergedConfig;
use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Subcommand;
use srcfab_core::adapters::{CatalogToolChooser, FsToolchainCatalog};
use srcfab_render::{render_toolchains, render_tools};
use srcfab_toolchain::{Info, Mode, Toolchain, build_all, lookup, open_info};
use tracing::{error, info};

#[derive(Debug, Subcommand)]
pub enum ToolchainCommand {
    /// List installed toolchains and their execution methods.
    List,
    /// List tools offered by installed toolchains.
    ListTools {
        /// Only tools performing this operation.
        #[arg(long)]
        op: Option<String>,

        /// Only tools handling this source unit type.
        #[arg(long)]
        unit_type: Option<String>,
    },
    /// Clone a toolchain into the first search root (or update it).
    Get {
        /// Toolchain path, e.g. github.com/acme/srcfab-go.
        path: String,

        /// Pull if already present.
        #[arg(short, long, default_value_t = false)]
        update: bool,
    },
    /// Build container toolchains (default: all that have a Dockerfile).
    Build {
        paths: Vec<String>,
    },
    /// Symlink a local directory into the first search root as a toolchain.
    Add {
        /// Local toolchain directory.
        dir: Utf8PathBuf,

        /// Toolchain path to install it as.
        path: String,

        /// Replace an existing toolchain at the path.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

pub fn run(merged: &MergedConfig, cmd: ToolchainCommand) -> anyhow::Result<()> {
    let search = &merged.search_path;
    match cmd {
        ToolchainCommand::List => {
            let infos = srcfab_toolchain::list(search)
                .with_context(|| format!("list toolchains in {search}"))?;
            print!("{}", render_toolchains(&infos));
        }
        ToolchainCommand::ListTools { op, unit_type } => {
            let chooser = CatalogToolChooser::load(&FsToolchainCatalog::new(search.clone()))?;
            let tools: Vec<_> = chooser
                .tools()
                .iter()
                .filter(|(_, t)| op.as_deref().is_none_or(|op| t.op == op))
                .filter(|(_, t)| {
                    unit_type
                        .as_deref()
                        .is_none_or(|ty| t.source_unit_types.iter().any(|u| u == ty))
                })
                .cloned()
                .collect();
            print!("{}", render_tools(&tools));
        }
        ToolchainCommand::Get { path, update } => {
            let info = srcfab_toolchain::get(search, &path, update)
                .with_context(|| format!("get toolchain {path}"))?;
            println!("{}\t{}", info.path, info.dir);
        }
        ToolchainCommand::Build { paths } => {
            let toolchains = build_targets(merged, &paths)?;
            let results = build_all(toolchains)?;
            let mut failed = 0;
            for r in &results {
                match &r.result {
                    Ok(()) => info!(toolchain = %r.path, "built toolchain"),
                    Err(e) => {
                        failed += 1;
                        error!(toolchain = %r.path, error = %e, "toolchain build failed");
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{} of {} toolchain builds failed", failed, results.len());
            }
            println!("built {} toolchain(s)", results.len());
        }
        ToolchainCommand::Add { dir, path, force } => {
            let dst = srcfab_toolchain::add(search, &dir, &path, force)
                .with_context(|| format!("add toolchain {path} from {dir}"))?;
            println!("{dst}");
        }
    }
    Ok(())
}

fn build_targets(
    merged: &MergedConfig,
    paths: &[String],
) -> anyhow::Result<Vec<Box<dyn Toolchain>>> {
    let search = &merged.search_path;
    let infos: Vec<Info> = if paths.is_empty() {
        srcfab_toolchain::list(search)
            .with_context(|| format!("list toolchains in {search}"))?
            .into_iter()
            .filter(|i| i.dockerfile.is_some())
            .collect()
    } else {
        paths
            .iter()
            .map(|p| lookup(search, p).with_context(|| format!("find toolchain {p}")))
            .collect::<anyhow::Result<Vec<_>>>()?
    };
    infos
        .iter()
        .map(|i| {
            open_info(i, merged.mode & Mode::CONTAINER)
                .with_context(|| format!("open toolchain {} for building", i.path))
        })
        .collect()
}
