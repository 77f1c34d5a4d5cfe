use crate::error::PlanError;
use crate::ports::ToolChooser;
use srcfab_render::quote;
use srcfab_store::DataTypeRegistry;
use srcfab_types::plan::DataTarget;
use srcfab_types::{SourceUnit, ToolRef, Tree};
use std::fmt;

/// Default executable name used in recipes.
pub const DEFAULT_COMMAND: &str = "srcfab";

/// Where a plan's artifacts live: `<data_dir>[/<commit>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDataDir {
    pub data_dir: String,
    pub commit_id: Option<String>,
}

impl BuildDataDir {
    pub fn new(data_dir: impl Into<String>, commit_id: Option<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            commit_id,
        }
    }

    pub fn target(&self, file: String) -> DataTarget {
        DataTarget {
            data_dir: self.data_dir.clone(),
            commit_id: self.commit_id.clone(),
            file,
        }
    }
}

impl fmt::Display for BuildDataDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.commit_id {
            Some(c) => write!(f, "{}/{}", self.data_dir, c),
            None => f.write_str(&self.data_dir),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOptions {
    /// Never substitute cached outputs.
    pub no_cache: bool,
    /// Executable invoked by recipes.
    pub command: String,
    /// Flags passed to `<command> tool` ahead of the tool ref.
    pub exec_flags: Vec<String>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            no_cache: false,
            command: DEFAULT_COMMAND.to_string(),
            exec_flags: Vec::new(),
        }
    }
}

impl PlanOptions {
    /// Exec flags as recipe text, each quoted unless it is a plain word.
    pub fn exec_opt(&self) -> String {
        self.exec_flags
            .iter()
            .map(|f| quote(f))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Everything a rule maker may consult.
pub struct RuleContext<'a> {
    pub tree: &'a Tree,
    pub data_dir: &'a BuildDataDir,
    pub options: &'a PlanOptions,
    pub chooser: &'a dyn ToolChooser,
    pub registry: &'a DataTypeRegistry,
}

impl RuleContext<'_> {
    /// Location of `unit`'s artifact of `data_type`.
    pub fn output(
        &self,
        op: &str,
        unit: &SourceUnit,
        data_type: &str,
    ) -> Result<DataTarget, PlanError> {
        let file = self
            .registry
            .unit_file(unit, data_type)
            .map_err(|source| PlanError::DataType {
                op: op.to_string(),
                source,
            })?;
        Ok(self.data_dir.target(file))
    }

    /// The pinned tool for `op`, else whatever the chooser picks.
    pub fn resolve_tool(&self, op: &str, unit: &SourceUnit) -> Result<ToolRef, PlanError> {
        if let Some(tool) = unit.tool_override(op) {
            return Ok(tool.clone());
        }
        self.chooser
            .choose(op, unit)
            .map_err(|source| PlanError::ToolChoice {
                op: op.to_string(),
                unit: unit.id(),
                source,
            })
    }

    /// `<command> tool <flags> "<toolchain>" "<subcmd>"`.
    pub fn tool_invocation(&self, tool: &ToolRef) -> String {
        format!(
            "{} tool {} {:?} {:?}",
            self.options.command,
            self.options.exec_opt(),
            tool.toolchain,
            tool.subcmd
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exec_opt_quotes_search_paths_with_spaces() {
        let options = PlanOptions {
            exec_flags: vec![
                "-m".to_string(),
                "program".to_string(),
                "--srcfabpath".to_string(),
                "/opt/my tools:/tc".to_string(),
            ],
            ..PlanOptions::default()
        };
        assert_eq!(
            options.exec_opt(),
            "-m program --srcfabpath '/opt/my tools:/tc'"
        );
        assert_eq!(PlanOptions::default().exec_opt(), "");
    }
}
