use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifies a tool: a toolchain path plus the subcommand inside it.
///
/// Written as `TOOLCHAIN:TOOL` on the command line and in config files.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ToolRef {
    /// Toolchain path, e.g. `github.com/acme/srcfab-go`.
    pub toolchain: String,

    /// Subcommand of the toolchain program that implements the tool.
    pub subcmd: String,
}

impl ToolRef {
    pub fn new(toolchain: impl Into<String>, subcmd: impl Into<String>) -> Self {
        Self {
            toolchain: toolchain.into(),
            subcmd: subcmd.into(),
        }
    }
}

impl fmt::Display for ToolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.toolchain, self.subcmd)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolRefParseError {
    #[error("tool ref {0:?} is not of the form TOOLCHAIN:TOOL")]
    MissingSeparator(String),

    #[error("tool ref {0:?} has an empty toolchain or tool")]
    EmptyPart(String),
}

impl FromStr for ToolRef {
    type Err = ToolRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (toolchain, subcmd) = s
            .split_once(':')
            .ok_or_else(|| ToolRefParseError::MissingSeparator(s.to_string()))?;
        if toolchain.is_empty() || subcmd.is_empty() {
            return Err(ToolRefParseError::EmptyPart(s.to_string()));
        }
        Ok(ToolRef::new(toolchain, subcmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toolchain_and_tool() {
        let r: ToolRef = "github.com/acme/go:graph".parse().expect("parse");
        assert_eq!(r.toolchain, "github.com/acme/go");
        assert_eq!(r.subcmd, "graph");
        assert_eq!(r.to_string(), "github.com/acme/go:graph");
    }

    #[test]
    fn rejects_missing_separator() {
        let err = "github.com/acme/go".parse::<ToolRef>().unwrap_err();
        assert!(matches!(err, ToolRefParseError::MissingSeparator(_)));
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(matches!(
            ":graph".parse::<ToolRef>(),
            Err(ToolRefParseError::EmptyPart(_))
        ));
        assert!(matches!(
            "tc:".parse::<ToolRef>(),
            Err(ToolRefParseError::EmptyPart(_))
        ));
    }

    #[test]
    fn serializes_with_pascal_case_fields() {
        let json = serde_json::to_string(&ToolRef::new("tc", "t")).expect("json");
        assert_eq!(json, r#"{"Toolchain":"tc","Subcmd":"t"}"#);
    }
}
