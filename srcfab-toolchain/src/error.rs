//! Error types for toolchain discovery and execution.

use crate::mode::Mode;
use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolchainError {
    /// No search-path root contains the toolchain.
    #[error("toolchain not found: {path}")]
    NotFound { path: String },

    /// More than one search-path root contains the toolchain.
    #[error("shadowed toolchain path {path:?} (toolchains: {})", join_paths(.found))]
    Shadowed {
        path: String,
        found: Vec<Utf8PathBuf>,
    },

    /// `List` reached two distinct directories under the same toolchain path.
    #[error("saw 2 toolchains at path {path} in dirs {first} and {second}")]
    DuplicatePath {
        path: String,
        first: Utf8PathBuf,
        second: Utf8PathBuf,
    },

    #[error("no usable execution method for toolchain {path} (permitted: {mode})")]
    NoUsableMethod { path: String, mode: Mode },

    #[error("invalid toolchain descriptor {path}: {message}")]
    InvalidDescriptor { path: Utf8PathBuf, message: String },

    #[error("installed toolchain program {program} is not executable (+x)")]
    NotExecutable { program: Utf8PathBuf },

    #[error("toolchain search path is empty (set SRCFABPATH)")]
    EmptySearchPath,

    #[error("invalid toolchain path {path:?}")]
    InvalidPath { path: String },

    #[error("invalid execution mode {value:?} (expected a comma-separated list of program, docker)")]
    InvalidMode { value: String },

    #[error("run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A subprocess exited unsuccessfully.
    #[error("{command} failed with {status}")]
    CommandFailed { command: String, status: String },

    /// A tool exited unsuccessfully; `output` is whatever JSON it printed first.
    #[error("tool {tool} failed with {status}")]
    ToolFailed {
        tool: String,
        status: String,
        output: Option<serde_json::Value>,
    },

    #[error("decode output of tool {tool}: {source}")]
    Decode {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0:#}")]
    Runtime(#[from] anyhow::Error),
}

impl ToolchainError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        ToolchainError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ToolchainError::NotFound { .. })
    }
}

fn join_paths(paths: &[Utf8PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
