mod config;
mod data;
mod internal;
mod toolchains;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{CliOverrides, ConfigMerger, MergedConfig};
use srcfab_core::adapters::{
    CatalogToolChooser, FsToolchainCatalog, ShellGitPort, ShellMakeExecutor, ToolScanner,
};
use srcfab_core::settings::{ConfigureSettings, MakeSettings, PlanSettings};
use srcfab_core::{run_configure, run_make, run_plan};
use srcfab_render::{render_makefile, render_tree_summary, render_units};
use srcfab_toolchain::{SEARCH_PATH_ENV, Tool};
use srcfab_types::ToolRef;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "srcfab",
    version,
    about = "Scans source trees and builds code-intelligence data with pluggable toolchains."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, clap::Args)]
struct GlobalArgs {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Permitted toolchain execution methods (e.g. "program,docker").
    #[arg(short = 'm', long, global = true)]
    methods: Option<String>,

    /// Colon-separated toolchain search roots.
    #[arg(long, global = true, env = SEARCH_PATH_ENV)]
    srcfabpath: Option<String>,

    /// Repository root (default: current directory).
    #[arg(long, global = true, default_value = ".")]
    repo_root: Utf8PathBuf,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan the tree for source units and write them to the build cache.
    Config(ConfigArgs),
    /// List the tree's source units without writing them.
    Units(UnitsArgs),
    /// Print the build graph for the configured units.
    Plan(PlanArgs),
    /// Plan, then run the build graph with make.
    Make(MakeArgs),
    /// Inspect and manage toolchains.
    #[command(subcommand)]
    Toolchain(toolchains::ToolchainCommand),
    /// Run a toolchain tool with inherited stdio.
    Tool(ToolArgs),
    /// Inspect stored build data.
    #[command(subcommand)]
    Data(data::DataCommand),
    /// Commands invoked by generated recipes.
    #[command(subcommand)]
    Internal(internal::InternalCommand),
}

#[derive(Debug, Parser)]
struct ConfigArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Commit to configure (default: HEAD).
    #[arg(long)]
    commit: Option<String>,

    /// Repository URI (default: derived from the origin remote).
    #[arg(long)]
    repo: Option<String>,

    /// Discard scanner stderr.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

#[derive(Debug, Parser)]
struct UnitsArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Discard scanner stderr.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

#[derive(Debug, Parser)]
struct PlanArgs {
    /// Output format (makefile, json).
    #[arg(long, value_enum, default_value = "makefile")]
    format: PlanFormat,

    /// Never substitute outputs cached for an earlier commit.
    #[arg(long, default_value_t = false)]
    no_cache: bool,

    /// Commit to plan for (default: HEAD).
    #[arg(long)]
    commit: Option<String>,
}

#[derive(Debug, Parser)]
struct MakeArgs {
    /// Print recipes without running them.
    #[arg(short = 'n', long, default_value_t = false)]
    dry_run: bool,

    /// Silence make.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,

    /// Directory to run make in (default: repository root).
    #[arg(short = 'C', long)]
    dir: Option<Utf8PathBuf>,

    /// Parallel make jobs.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Print the generated Makefile before running it.
    #[arg(long, default_value_t = false)]
    print_makefile: bool,

    /// Never substitute outputs cached for an earlier commit.
    #[arg(long, default_value_t = false)]
    no_cache: bool,

    /// Commit to build (default: HEAD).
    #[arg(long)]
    commit: Option<String>,

    /// Targets to build (default: all).
    goals: Vec<String>,
}

#[derive(Debug, Parser)]
struct ToolArgs {
    /// Toolchain path.
    toolchain: String,

    /// Tool subcommand.
    tool: String,

    /// Arguments passed to the tool.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum PlanFormat {
    Makefile,
    Json,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let global = cli.global;
    match cli.cmd {
        Command::Config(args) => cmd_config(&global, args),
        Command::Units(args) => cmd_units(&global, args),
        Command::Plan(args) => cmd_plan(&global, args),
        Command::Make(args) => cmd_make(&global, args),
        Command::Toolchain(cmd) => toolchains::run(&merged_config(&global, |_| {})?, cmd),
        Command::Tool(args) => cmd_tool(&global, args),
        Command::Data(cmd) => data::run(&global.repo_root, cmd),
        Command::Internal(cmd) => internal::run(cmd),
    }
}

/// Loads `srcfab.toml` and applies global flags plus per-command overrides.
fn merged_config(
    global: &GlobalArgs,
    overrides: impl FnOnce(&mut CliOverrides),
) -> anyhow::Result<MergedConfig> {
    let file_config =
        config::load_or_default(&global.repo_root).context("load srcfab.toml config")?;
    let mut cli = CliOverrides {
        search_path: global.srcfabpath.clone(),
        methods: global.methods.clone(),
        ..CliOverrides::default()
    };
    overrides(&mut cli);
    let merged = ConfigMerger::new(file_config).merge(&cli)?;
    debug!(
        "merged config: search_path={}, mode={}, quiet={}, no_cache={}, jobs={:?}",
        merged.search_path, merged.mode, merged.quiet, merged.no_cache, merged.jobs
    );
    Ok(merged)
}

fn scanner(merged: &MergedConfig) -> ToolScanner {
    ToolScanner {
        search: merged.search_path.clone(),
        mode: merged.mode,
        quiet: merged.quiet,
    }
}

fn chooser(merged: &MergedConfig) -> anyhow::Result<CatalogToolChooser> {
    CatalogToolChooser::load(&FsToolchainCatalog::new(merged.search_path.clone()))
        .context("load toolchain catalog")
}

fn plan_settings(
    global: &GlobalArgs,
    merged: &MergedConfig,
    commit: Option<String>,
) -> PlanSettings {
    PlanSettings {
        repo_root: global.repo_root.clone(),
        commit_id: commit,
        no_cache: merged.no_cache,
        command: merged.command.clone(),
        exec_flags: merged.exec_flags(),
        ..PlanSettings::default()
    }
}

fn cmd_config(global: &GlobalArgs, args: ConfigArgs) -> anyhow::Result<()> {
    let merged = merged_config(global, |cli| cli.quiet = args.quiet)?;
    let settings = ConfigureSettings {
        repo_root: global.repo_root.clone(),
        repo_uri: args.repo,
        commit_id: args.commit,
        default_scanners: merged.default_scanners.clone(),
        quiet: merged.quiet,
        write: true,
    };
    let outcome = run_configure(&settings, &ShellGitPort, &scanner(&merged))?;

    match args.output {
        OutputFormat::Text => print!("{}", render_tree_summary(&outcome.tree)),
        OutputFormat::Json => print_json(&outcome.tree)?,
    }
    Ok(())
}

fn cmd_units(global: &GlobalArgs, args: UnitsArgs) -> anyhow::Result<()> {
    let merged = merged_config(global, |cli| cli.quiet = args.quiet)?;
    let settings = ConfigureSettings {
        repo_root: global.repo_root.clone(),
        default_scanners: merged.default_scanners.clone(),
        quiet: merged.quiet,
        write: false,
        ..ConfigureSettings::default()
    };
    let outcome = run_configure(&settings, &ShellGitPort, &scanner(&merged))?;

    match args.output {
        OutputFormat::Text => print!("{}", render_units(&outcome.tree.units)),
        OutputFormat::Json => print_json(&outcome.tree.units)?,
    }
    Ok(())
}

fn cmd_plan(global: &GlobalArgs, args: PlanArgs) -> anyhow::Result<()> {
    let merged = merged_config(global, |cli| cli.no_cache = args.no_cache)?;
    let settings = plan_settings(global, &merged, args.commit);
    let outcome = run_plan(&settings, &ShellGitPort, &chooser(&merged)?)?;

    match args.format {
        PlanFormat::Makefile => print!("{}", render_makefile(&outcome.makefile)),
        PlanFormat::Json => print_json(&outcome.makefile)?,
    }
    Ok(())
}

fn cmd_make(global: &GlobalArgs, args: MakeArgs) -> anyhow::Result<()> {
    let merged = merged_config(global, |cli| {
        cli.no_cache = args.no_cache;
        cli.jobs = args.jobs;
    })?;
    let settings = MakeSettings {
        plan: plan_settings(global, &merged, args.commit),
        dry_run: args.dry_run,
        quiet: args.quiet,
        dir: args.dir,
        jobs: merged.jobs,
        goals: args.goals,
    };
    let outcome = run_make(
        &settings,
        &ShellGitPort,
        &chooser(&merged)?,
        &ShellMakeExecutor::default(),
    )?;
    if args.print_makefile {
        print!("{}", outcome.makefile);
    }
    Ok(())
}

fn cmd_tool(global: &GlobalArgs, args: ToolArgs) -> anyhow::Result<()> {
    let merged = merged_config(global, |_| {})?;
    let tool_ref = ToolRef::new(args.toolchain, args.tool);
    let tool = Tool::open(&merged.search_path, &tool_ref, merged.mode)
        .with_context(|| format!("open tool {tool_ref}"))?;

    let toolchain = tool.toolchain();
    if !toolchain.is_built()? {
        info!(toolchain = %toolchain.path(), "toolchain not built, building it first");
        toolchain
            .build()
            .with_context(|| format!("build toolchain {}", toolchain.path()))?;
    }

    let mut cmd = tool.command()?;
    cmd.args(&args.args);
    debug!(tool = %tool_ref, args = ?args.args, "running tool");
    let status = cmd
        .status()
        .with_context(|| format!("run tool {tool_ref}"))?;
    if !status.success() {
        anyhow::bail!("tool {} exited with {}", tool_ref, status);
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(v: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    println!("{s}");
    Ok(())
}
