//! `srcfab data` subcommands: inspect and remove stored build data.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Subcommand;
use srcfab_core::adapters::ShellGitPort;
use srcfab_core::ports::GitPort;
use srcfab_render::{render_data_files, render_json};
use srcfab_store::{DataFileName, DataTypeRegistry, RepoStore, list_data_files};
use tracing::{debug, info};

#[derive(Debug, Subcommand)]
pub enum DataCommand {
    /// List build data files.
    Ls {
        /// Only this commit (default: every commit).
        #[arg(long)]
        commit: Option<String>,

        /// Only this data type (e.g. graph).
        #[arg(long = "type")]
        data_type: Option<String>,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Decode a build data file and print it as JSON.
    Cat {
        /// Path within the commit, e.g. `pkg/GoPackage.graph.json`.
        path: Utf8PathBuf,

        /// Commit the file belongs to (default: HEAD).
        #[arg(long)]
        commit: Option<String>,
    },
    /// Remove all build data stored for a commit.
    Rm {
        #[arg(long)]
        commit: String,
    },
}

pub fn run(repo_root: &Utf8Path, cmd: DataCommand) -> anyhow::Result<()> {
    let store = RepoStore::local(repo_root);
    match cmd {
        DataCommand::Ls {
            commit,
            data_type,
            json,
        } => {
            let start = Utf8PathBuf::from(commit.as_deref().unwrap_or("."));
            let mut files = list_data_files(&store, &repo_uri(repo_root), &start)?;
            if let Some(ty) = &data_type {
                files.retain(|f| f.name.as_ref().is_some_and(|n| &n.data_type == ty));
            }
            debug!(count = files.len(), "listed build data files");
            if json {
                let s = serde_json::to_string_pretty(&files).context("serialize json")?;
                println!("{s}");
            } else {
                print!("{}", render_data_files(&files));
            }
        }
        DataCommand::Cat { path, commit } => {
            let commit_id = match commit {
                Some(c) => c,
                None => ShellGitPort
                    .head_sha(repo_root)?
                    .context("no commit ID given and HEAD is unknown (pass --commit)")?,
            };
            let commit = store.commit(&commit_id);
            commit.require_exists()?;

            let file_name = path.file_name().unwrap_or(path.as_str());
            let name = DataFileName::parse(file_name)
                .with_context(|| format!("{path} is not a build data file name"))?;
            let bytes = commit.read(path.as_str())?;
            let registry = DataTypeRegistry::builtin();
            let value = registry
                .decode(&name.data_type, &bytes)?
                .to_json()
                .with_context(|| format!("re-encode {path}"))?;
            print!("{}", render_json(&value));
        }
        DataCommand::Rm { commit } => {
            store.remove_all_data_for_commit(&commit)?;
            info!(commit = %commit, "removed build data");
        }
    }
    Ok(())
}

fn repo_uri(repo_root: &Utf8Path) -> String {
    ShellGitPort
        .origin_url(repo_root)
        .ok()
        .flatten()
        .and_then(|url| srcfab_analysis::try_make_uri(&url).ok())
        .unwrap_or_default()
}
