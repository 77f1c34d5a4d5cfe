use crate::error::ToolchainError;
use crate::mode::Mode;
use crate::process::{describe, output_with_input};
use crate::search_path::SearchPath;
use crate::toolchain::{Toolchain, open};
use serde::Serialize;
use serde::de::DeserializeOwned;
use srcfab_types::ToolRef;
use std::process::{Command, Stdio};
use tracing::debug;

/// A toolchain subcommand ready to run.
#[derive(Debug)]
pub struct Tool {
    toolchain: Box<dyn Toolchain>,
    subcmd: String,
}

/// Opens `subcmd` of the toolchain at `toolchain_path`.
pub fn open_tool(
    search: &SearchPath,
    toolchain_path: &str,
    subcmd: &str,
    mode: Mode,
) -> Result<Tool, ToolchainError> {
    let toolchain = open(search, toolchain_path, mode)?;
    Ok(Tool::new(toolchain, subcmd))
}

impl Tool {
    pub fn new(toolchain: Box<dyn Toolchain>, subcmd: impl Into<String>) -> Self {
        Self {
            toolchain,
            subcmd: subcmd.into(),
        }
    }

    pub fn open(search: &SearchPath, tool: &ToolRef, mode: Mode) -> Result<Self, ToolchainError> {
        open_tool(search, &tool.toolchain, &tool.subcmd, mode)
    }

    pub fn toolchain(&self) -> &dyn Toolchain {
        self.toolchain.as_ref()
    }

    pub fn subcmd(&self) -> &str {
        &self.subcmd
    }

    pub fn tool_ref(&self) -> ToolRef {
        ToolRef::new(self.toolchain.path(), &self.subcmd)
    }

    /// Command that runs this tool; callers append tool arguments.
    pub fn command(&self) -> Result<Command, ToolchainError> {
        let mut cmd = self.toolchain.command()?;
        cmd.arg(&self.subcmd);
        Ok(cmd)
    }

    /// Runs the tool with `input` encoded as JSON on stdin and decodes its
    /// stdout as JSON.
    ///
    /// On a non-zero exit the error still carries whatever JSON the tool
    /// printed before failing.
    pub fn run<I, T>(&self, args: &[String], input: Option<&I>) -> Result<T, ToolchainError>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.run_inner(args, input, false)
    }

    /// Like [`Tool::run`], with the tool's stderr discarded.
    pub fn run_quiet<I, T>(&self, args: &[String], input: Option<&I>) -> Result<T, ToolchainError>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.run_inner(args, input, true)
    }

    fn run_inner<I, T>(&self, args: &[String], input: Option<&I>, quiet: bool) -> Result<T, ToolchainError>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let stdin = input
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| anyhow::anyhow!("encode input for tool {}: {e}", self.tool_ref()))?;

        let mut cmd = self.command()?;
        cmd.args(args);
        if quiet {
            cmd.stderr(Stdio::null());
        }
        debug!(tool = %self.tool_ref(), command = %describe(&cmd), "running tool");
        let output = output_with_input(&mut cmd, stdin.as_deref())?;

        if !output.status.success() {
            return Err(ToolchainError::ToolFailed {
                tool: self.tool_ref().to_string(),
                status: output.status.to_string(),
                output: serde_json::from_slice(&output.stdout).ok(),
            });
        }
        serde_json::from_slice(&output.stdout).map_err(|source| ToolchainError::Decode {
            tool: self.tool_ref().to_string(),
            source,
        })
    }
}
