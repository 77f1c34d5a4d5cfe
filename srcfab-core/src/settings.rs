//! Clap-free settings for the configure, plan and make pipelines.

use camino::Utf8PathBuf;
use srcfab_plan::DEFAULT_COMMAND;
use srcfab_store::BUILD_DATA_DIR_NAME;
use srcfab_types::ToolRef;

/// Settings for the configure pipeline.
#[derive(Debug, Clone)]
pub struct ConfigureSettings {
    pub repo_root: Utf8PathBuf,

    // Identity; detected from git when unset.
    pub repo_uri: Option<String>,
    pub commit_id: Option<String>,

    /// Scanners used when the Srcfile names none.
    pub default_scanners: Vec<ToolRef>,
    /// Discard scanner stderr.
    pub quiet: bool,
    /// Write unit files to the build store. `srcfab units` turns this off.
    pub write: bool,
}

impl Default for ConfigureSettings {
    fn default() -> Self {
        Self {
            repo_root: Utf8PathBuf::from("."),
            repo_uri: None,
            commit_id: None,
            default_scanners: Vec::new(),
            quiet: false,
            write: true,
        }
    }
}

/// Settings for the plan pipeline.
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub repo_root: Utf8PathBuf,
    pub commit_id: Option<String>,

    /// Build data directory, relative to `repo_root`.
    pub data_dir: String,

    pub no_cache: bool,
    /// Executable invoked by recipes.
    pub command: String,
    /// Flags passed through to `<command> tool`.
    pub exec_flags: Vec<String>,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            repo_root: Utf8PathBuf::from("."),
            commit_id: None,
            data_dir: BUILD_DATA_DIR_NAME.to_string(),
            no_cache: false,
            command: DEFAULT_COMMAND.to_string(),
            exec_flags: Vec::new(),
        }
    }
}

/// Settings for the make pipeline.
#[derive(Debug, Clone, Default)]
pub struct MakeSettings {
    pub plan: PlanSettings,

    /// Print recipes without running them (`make -n`).
    pub dry_run: bool,
    /// Silence recipe echo and make's own output.
    pub quiet: bool,
    /// Directory make runs in; the repository root when unset.
    pub dir: Option<Utf8PathBuf>,
    pub jobs: Option<usize>,
    /// Targets to build; the `all` rule when empty.
    pub goals: Vec<String>,
}
