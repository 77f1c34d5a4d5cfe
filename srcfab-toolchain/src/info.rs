use crate::error::ToolchainError;
use crate::mode::Mode;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Descriptor file that marks a directory as a toolchain.
pub const DESCRIPTOR_FILE: &str = "Srcfabtoolchain";

/// Directory (relative to the toolchain dir) holding the prebuilt program.
pub const PROGRAM_DIR: &str = ".bin";

pub const DOCKERFILE: &str = "Dockerfile";

/// A toolchain found on the search path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Info {
    /// Slash-separated path under a search root, e.g. `github.com/acme/go-tc`.
    pub path: String,
    /// Directory that defines the toolchain.
    pub dir: Utf8PathBuf,
    /// Descriptor file, relative to `dir`.
    pub config_file: String,
    /// Program relative to `dir`, when one is installed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Dockerfile relative to `dir`, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
}

impl Info {
    pub(crate) fn from_dir(path: String, dir: Utf8PathBuf) -> Result<Self, ToolchainError> {
        let dockerfile = dir.join(DOCKERFILE).is_file().then(|| DOCKERFILE.to_string());

        let base = path.rsplit('/').next().unwrap_or(path.as_str());
        let prog = format!("{PROGRAM_DIR}/{base}");
        let program = match fs_err::metadata(dir.join(&prog)) {
            Ok(meta) => {
                if !is_executable(&meta) {
                    return Err(ToolchainError::NotExecutable {
                        program: dir.join(&prog),
                    });
                }
                Some(prog)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(ToolchainError::io(dir.join(&prog), e)),
        };

        Ok(Self {
            path,
            dir,
            config_file: DESCRIPTOR_FILE.to_string(),
            program,
            dockerfile,
        })
    }

    pub fn config_path(&self) -> Utf8PathBuf {
        self.dir.join(&self.config_file)
    }

    pub fn program_path(&self) -> Option<Utf8PathBuf> {
        self.program.as_ref().map(|p| self.dir.join(p))
    }

    /// Execution modes this toolchain can support.
    pub fn available_modes(&self) -> Mode {
        let mut m = Mode::empty();
        if self.program.is_some() {
            m |= Mode::PROGRAM;
        }
        if self.dockerfile.is_some() {
            m |= Mode::CONTAINER;
        }
        m
    }

    /// Reads and decodes the descriptor file.
    pub fn read_config(&self) -> Result<ToolchainConfig, ToolchainError> {
        let path = self.config_path();
        let bytes = fs_err::read(&path).map_err(|e| ToolchainError::io(path.clone(), e))?;
        parse_config(&path, &bytes)
    }
}

/// Decoded descriptor file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ToolchainConfig {
    #[serde(default)]
    pub tools: Vec<ToolInfo>,
}

/// One tool a toolchain offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ToolInfo {
    pub subcmd: String,
    pub op: String,
    #[serde(default)]
    pub source_unit_types: Vec<String>,
}

impl ToolInfo {
    pub fn handles(&self, op: &str, unit_type: &str) -> bool {
        self.op == op && self.source_unit_types.iter().any(|t| t == unit_type)
    }
}

impl ToolchainConfig {
    pub fn tools_for<'a>(
        &'a self,
        op: &'a str,
        unit_type: &'a str,
    ) -> impl Iterator<Item = &'a ToolInfo> + 'a {
        self.tools.iter().filter(move |t| t.handles(op, unit_type))
    }
}

pub(crate) fn parse_config(path: &Utf8Path, bytes: &[u8]) -> Result<ToolchainConfig, ToolchainError> {
    let config: ToolchainConfig =
        serde_json::from_slice(bytes).map_err(|e| ToolchainError::InvalidDescriptor {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
    for tool in &config.tools {
        if tool.subcmd.is_empty() || tool.op.is_empty() {
            return Err(ToolchainError::InvalidDescriptor {
                path: path.to_owned(),
                message: "every tool needs a Subcmd and an Op".to_string(),
            });
        }
    }
    Ok(config)
}

#[cfg(unix)]
fn is_executable(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.is_file() && meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(meta: &std::fs::Metadata) -> bool {
    meta.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config_reads_tools() {
        let cfg = parse_config(
            Utf8Path::new("Srcfabtoolchain"),
            br#"{"Tools":[
                {"Subcmd":"scan","Op":"scan","SourceUnitTypes":["GoPackage"]},
                {"Subcmd":"graph","Op":"graph","SourceUnitTypes":["GoPackage","Dockerfile"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(cfg.tools.len(), 2);
        let hits: Vec<&str> = cfg
            .tools_for("graph", "Dockerfile")
            .map(|t| t.subcmd.as_str())
            .collect();
        assert_eq!(hits, vec!["graph"]);
        assert_eq!(cfg.tools_for("graph", "Python").count(), 0);
    }

    #[test]
    fn parse_config_rejects_missing_subcmd() {
        let err = parse_config(
            Utf8Path::new("x/Srcfabtoolchain"),
            br#"{"Tools":[{"Subcmd":"","Op":"graph"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("x/Srcfabtoolchain"));
    }

    #[test]
    fn parse_config_reports_bad_json() {
        let err = parse_config(Utf8Path::new("d"), b"{").unwrap_err();
        assert!(matches!(err, ToolchainError::InvalidDescriptor { .. }));
    }
}
