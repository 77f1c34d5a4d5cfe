//! Commands that generated Makefile recipes invoke.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Subcommand;
use fs_err as fs;
use serde::de::DeserializeOwned;
use srcfab_analysis::{compute_unit_authorship, normalize_graph_data};
use srcfab_types::blame::BlameOutput;
use srcfab_types::graph::GraphOutput;
use std::io::Read;
use tracing::debug;

#[derive(Debug, Subcommand)]
pub enum InternalCommand {
    /// Normalize a grapher's raw JSON output (stdin to stdout).
    NormalizeGraphData {
        /// Source unit type the output was produced for.
        #[arg(long)]
        unit_type: String,

        /// Directory that file paths in the output are relative to.
        #[arg(long, default_value = ".")]
        dir: Utf8PathBuf,
    },
    /// Compute per-def authorship from a unit's blame and graph output.
    ComputeAuthorship {
        /// Blame output file.
        blame: Utf8PathBuf,

        /// Graph output file.
        graph: Utf8PathBuf,
    },
}

pub fn run(cmd: InternalCommand) -> anyhow::Result<()> {
    match cmd {
        InternalCommand::NormalizeGraphData { unit_type, dir } => {
            let mut raw = Vec::new();
            std::io::stdin()
                .read_to_end(&mut raw)
                .context("read graph output from stdin")?;
            let mut output: GraphOutput =
                serde_json::from_slice(&raw).context("decode graph output")?;
            normalize_graph_data(&unit_type, &dir, &mut output)
                .with_context(|| format!("normalize graph output for unit type {unit_type}"))?;
            debug!(
                defs = output.defs.len(),
                refs = output.refs.len(),
                docs = output.docs.len(),
                "normalized graph output"
            );
            print_json(&output)
        }
        InternalCommand::ComputeAuthorship { blame, graph } => {
            let blame: BlameOutput = read_json(&blame)?;
            let graph: GraphOutput = read_json(&graph)?;
            let out = compute_unit_authorship(&blame, &graph).context("compute authorship")?;
            print_json(&out)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> anyhow::Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path))?;
    serde_json::from_slice(&bytes).with_context(|| format!("decode {}", path))
}

fn print_json<T: serde::Serialize>(v: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string(v).context("serialize json")?;
    println!("{s}");
    Ok(())
}
