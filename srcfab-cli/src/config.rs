//! Configuration file loading for srcfab.
//!
//! Discovers and loads `srcfab.toml` from the repository root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use srcfab_plan::DEFAULT_COMMAND;
use srcfab_toolchain::{Mode, SearchPath};
use srcfab_types::ToolRef;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "srcfab.toml";

/// Top-level configuration from srcfab.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SrcfabConfig {
    pub toolchains: ToolchainsConfig,
    pub scan: ScanConfig,
    pub plan: PlanConfig,
    pub make: MakeConfig,
}

/// Toolchains section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolchainsConfig {
    /// Colon-separated toolchain roots. `SRCFABPATH` wins when set.
    pub search_path: Option<String>,

    /// Permitted execution methods, e.g. `"program,docker"`.
    pub methods: String,
}

impl Default for ToolchainsConfig {
    fn default() -> Self {
        Self {
            search_path: None,
            methods: Mode::default().to_string(),
        }
    }
}

/// Scan section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Scanner tool refs (`toolchain:subcmd`) used when the Srcfile names none.
    pub scanners: Vec<String>,

    /// Discard scanner stderr.
    pub quiet: bool,
}

/// Plan section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Never substitute cached outputs.
    pub no_cache: bool,

    /// Executable name used in recipes.
    pub command: String,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            no_cache: false,
            command: DEFAULT_COMMAND.to_string(),
        }
    }
}

/// Make section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MakeConfig {
    pub jobs: Option<usize>,
}

/// Discover the srcfab.toml config file.
///
/// Returns `None` if no config file is found in the repository root.
pub fn discover_config(repo_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = repo_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a srcfab.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<SrcfabConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<SrcfabConfig> {
    let config: SrcfabConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from repo root, or return default if not found.
pub fn load_or_default(repo_root: &Utf8Path) -> anyhow::Result<SrcfabConfig> {
    match discover_config(repo_root) {
        Some(path) => load_config(&path),
        None => Ok(SrcfabConfig::default()),
    }
}

/// CLI values that may override the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// From `--srcfabpath` / `SRCFABPATH`.
    pub search_path: Option<String>,
    /// From `-m/--methods`.
    pub methods: Option<String>,
    pub no_cache: bool,
    pub quiet: bool,
    pub jobs: Option<usize>,
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub search_path: SearchPath,
    pub mode: Mode,
    /// True when `-m` was given, so recipes pass it on to `srcfab tool`.
    pub explicit_methods: bool,
    /// True when the search path came from `--srcfabpath`, `SRCFABPATH` or
    /// the config file rather than the default root.
    pub explicit_search_path: bool,
    pub default_scanners: Vec<ToolRef>,
    pub quiet: bool,
    pub no_cache: bool,
    pub command: String,
    pub jobs: Option<usize>,
}

impl MergedConfig {
    /// Flags recipes pass to `<command> tool`.
    pub fn exec_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if self.explicit_methods {
            flags.extend(["-m".to_string(), self.mode.to_string()]);
        }
        if self.explicit_search_path {
            flags.extend(["--srcfabpath".to_string(), self.search_path.to_string()]);
        }
        flags
    }
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: SrcfabConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: SrcfabConfig) -> Self {
        Self { config }
    }

    /// CLI values override the file; boolean flags only switch behaviour on.
    pub fn merge(self, cli: &CliOverrides) -> anyhow::Result<MergedConfig> {
        let (search_path, explicit_search_path) = match cli
            .search_path
            .as_deref()
            .or(self.config.toolchains.search_path.as_deref())
        {
            Some(list) if !list.is_empty() => (SearchPath::parse(list), true),
            _ => (
                SearchPath::from_env().context("resolve toolchain search path")?,
                false,
            ),
        };

        let methods = cli
            .methods
            .as_deref()
            .unwrap_or(&self.config.toolchains.methods);
        let mode: Mode = methods
            .parse()
            .with_context(|| format!("parse execution methods {methods:?}"))?;

        let default_scanners = self
            .config
            .scan
            .scanners
            .iter()
            .map(|s| {
                s.parse::<ToolRef>()
                    .with_context(|| format!("parse scanner {s:?} in {CONFIG_FILE_NAME}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(MergedConfig {
            search_path,
            mode,
            explicit_methods: cli.methods.is_some(),
            explicit_search_path,
            default_scanners,
            quiet: cli.quiet || self.config.scan.quiet,
            no_cache: cli.no_cache || self.config.plan.no_cache,
            command: self.config.plan.command,
            jobs: cli.jobs.or(self.config.make.jobs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli_with_path() -> CliOverrides {
        CliOverrides {
            search_path: Some("/tc/a:/tc/b".to_string()),
            ..CliOverrides::default()
        }
    }

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[toolchains]
search_path = "/opt/srcfab"
methods = "program"

[scan]
scanners = ["github.com/acme/srcfab-go:scan"]
quiet = true

[plan]
no_cache = true
command = "/usr/local/bin/srcfab"

[make]
jobs = 4
"#;
        let config = parse_config(contents).unwrap();
        assert_eq!(config.toolchains.search_path.as_deref(), Some("/opt/srcfab"));
        assert_eq!(config.toolchains.methods, "program");
        assert_eq!(config.scan.scanners.len(), 1);
        assert!(config.scan.quiet);
        assert!(config.plan.no_cache);
        assert_eq!(config.plan.command, "/usr/local/bin/srcfab");
        assert_eq!(config.make.jobs, Some(4));
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.toolchains.methods, "program,docker");
        assert_eq!(config.plan.command, "srcfab");
        assert!(config.scan.scanners.is_empty());
        assert_eq!(config.make.jobs, None);
    }

    #[test]
    fn test_cli_search_path_and_methods_win() {
        let config = parse_config(
            r#"
[toolchains]
search_path = "/from/file"
methods = "docker"
"#,
        )
        .unwrap();
        let cli = CliOverrides {
            methods: Some("program".to_string()),
            ..cli_with_path()
        };
        let merged = ConfigMerger::new(config).merge(&cli).unwrap();
        assert_eq!(merged.search_path.to_string(), "/tc/a:/tc/b");
        assert_eq!(merged.mode, Mode::PROGRAM);
        assert_eq!(
            merged.exec_flags(),
            vec!["-m", "program", "--srcfabpath", "/tc/a:/tc/b"]
        );
    }

    #[test]
    fn test_file_values_used_when_cli_silent() {
        let config = parse_config(
            r#"
[toolchains]
search_path = "/from/file"
methods = "docker"

[make]
jobs = 2
"#,
        )
        .unwrap();
        let merged = ConfigMerger::new(config)
            .merge(&CliOverrides::default())
            .unwrap();
        assert_eq!(merged.search_path.to_string(), "/from/file");
        assert_eq!(merged.mode, Mode::CONTAINER);
        assert_eq!(merged.exec_flags(), vec!["--srcfabpath", "/from/file"]);
        assert_eq!(merged.jobs, Some(2));
    }

    #[test]
    fn test_search_path_only_flag_is_passed_to_recipes() {
        let merged = ConfigMerger::new(SrcfabConfig::default())
            .merge(&cli_with_path())
            .unwrap();
        assert!(merged.explicit_search_path);
        assert!(!merged.explicit_methods);
        assert_eq!(merged.exec_flags(), vec!["--srcfabpath", "/tc/a:/tc/b"]);
    }

    #[test]
    fn test_empty_search_path_is_not_passed_to_recipes() {
        let cli = CliOverrides {
            search_path: Some(String::new()),
            methods: Some("docker".to_string()),
            ..CliOverrides::default()
        };
        let Ok(merged) = ConfigMerger::new(SrcfabConfig::default()).merge(&cli) else {
            // No home directory to derive a default root from.
            return;
        };
        assert!(!merged.explicit_search_path);
        assert_eq!(merged.exec_flags(), vec!["-m", "docker"]);
    }

    #[test]
    fn test_scanners_are_parsed_as_tool_refs() {
        let config = parse_config("[scan]\nscanners = [\"tc/go:scan\"]\n").unwrap();
        let merged = ConfigMerger::new(config).merge(&cli_with_path()).unwrap();
        assert_eq!(merged.default_scanners, vec![ToolRef::new("tc/go", "scan")]);

        let bad = parse_config("[scan]\nscanners = [\"no-subcmd\"]\n").unwrap();
        assert!(ConfigMerger::new(bad).merge(&cli_with_path()).is_err());
    }

    #[test]
    fn test_bad_methods_are_rejected() {
        let cli = CliOverrides {
            methods: Some("teleport".to_string()),
            ..cli_with_path()
        };
        let err = ConfigMerger::new(SrcfabConfig::default())
            .merge(&cli)
            .unwrap_err();
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn test_load_or_default_returns_default_when_missing() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());
        let cfg = load_or_default(&root).expect("load default");
        assert_eq!(cfg.plan.command, "srcfab");

        std::fs::write(root.join(CONFIG_FILE_NAME), "[plan]\nno_cache = true\n")
            .expect("write config");
        assert!(discover_config(&root).is_some());
        assert!(load_or_default(&root).expect("load").plan.no_cache);
    }
}
