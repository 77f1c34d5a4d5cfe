use crate::toolref::ToolRef;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Characters escaped in the name part of a [`UnitId`].
const UNIT_NAME_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A named, typed grouping of files within a tree that can be analyzed
/// independently.
///
/// `(Name, Type)` is unique within a tree configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceUnit {
    pub name: String,

    #[serde(rename = "Type")]
    pub unit_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,

    #[serde(rename = "CommitID", default, skip_serializing_if = "String::is_empty")]
    pub commit_id: String,

    /// Glob patterns the scanner used to find `files`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub globs: Vec<String>,

    /// Files relative to the tree root. May contain globs before expansion.
    #[serde(default)]
    pub files: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dir: String,

    /// Raw, tool-specific dependency descriptions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Free-form properties passed through to tools.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, serde_json::Value>,

    /// Operations requested for this unit. A `None` value means "pick a tool
    /// for me"; `Some` pins the tool explicitly.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ops: BTreeMap<String, Option<ToolRef>>,

    /// Commit of an earlier build whose outputs may be reused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_rev: Option<String>,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, unit_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit_type: unit_type.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> UnitId {
        UnitId::new(&self.name, &self.unit_type)
    }

    pub fn key(&self) -> UnitKey {
        UnitKey {
            name: self.name.clone(),
            unit_type: self.unit_type.clone(),
        }
    }

    /// True if the unit's `Ops` map names `op`.
    pub fn wants_op(&self, op: &str) -> bool {
        self.ops.contains_key(op)
    }

    /// Explicitly pinned tool for `op`, if any.
    pub fn tool_override(&self, op: &str) -> Option<&ToolRef> {
        self.ops.get(op).and_then(Option::as_ref)
    }

    /// The unit's directory, falling back to the directory of its first file.
    pub fn effective_dir(&self) -> Option<String> {
        if !self.dir.is_empty() {
            return Some(self.dir.clone());
        }
        let first = self.files.first()?;
        match first.rsplit_once('/') {
            Some((dir, _)) => Some(dir.to_string()),
            None => Some(".".to_string()),
        }
    }

    pub fn cached_rev(&self) -> Option<&str> {
        self.cached_rev.as_deref().filter(|r| !r.is_empty())
    }
}

/// `(Name, Type)` pair, as used by `SkipUnits` in a tree config.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnitKey {
    pub name: String,

    #[serde(rename = "Type")]
    pub unit_type: String,
}

/// Stable string identifier for a unit: `<escaped name>@<type>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitIdError {
    #[error("unit ID {0:?} has no @TYPE suffix")]
    MissingType(String),

    #[error("unit ID {0:?} has an invalid escaped name")]
    BadEscape(String),
}

impl UnitId {
    pub fn new(name: &str, unit_type: &str) -> Self {
        UnitId(format!(
            "{}@{}",
            utf8_percent_encode(name, UNIT_NAME_ESCAPE),
            unit_type
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the ID back into `(name, type)`.
    pub fn parse(&self) -> Result<(String, String), UnitIdError> {
        let (escaped, unit_type) = self
            .0
            .rsplit_once('@')
            .ok_or_else(|| UnitIdError::MissingType(self.0.clone()))?;
        if unit_type.is_empty() {
            return Err(UnitIdError::MissingType(self.0.clone()));
        }
        let name = percent_decode_str(escaped)
            .decode_utf8()
            .map_err(|_| UnitIdError::BadEscape(self.0.clone()))?;
        Ok((name.into_owned(), unit_type.to_string()))
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UnitId {
    type Err = UnitIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = UnitId(s.to_string());
        id.parse()?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_escapes_slashes_in_name() {
        let u = SourceUnit::new("github.com/acme/lib", "GoPackage");
        assert_eq!(u.id().as_str(), "github.com%2Facme%2Flib@GoPackage");
        let (name, ty) = u.id().parse().expect("parse");
        assert_eq!(name, "github.com/acme/lib");
        assert_eq!(ty, "GoPackage");
    }

    #[test]
    fn id_without_type_is_rejected() {
        assert!(matches!(
            "plainname".parse::<UnitId>(),
            Err(UnitIdError::MissingType(_))
        ));
    }

    #[test]
    fn effective_dir_falls_back_to_first_file() {
        let mut u = SourceUnit::new("n", "t");
        assert_eq!(u.effective_dir(), None);
        u.files = vec!["src/lib/a.py".into(), "b.py".into()];
        assert_eq!(u.effective_dir().as_deref(), Some("src/lib"));
        u.files = vec!["top.py".into()];
        assert_eq!(u.effective_dir().as_deref(), Some("."));
        u.dir = "pkg".into();
        assert_eq!(u.effective_dir().as_deref(), Some("pkg"));
    }

    #[test]
    fn ops_distinguish_requested_and_pinned() {
        let mut u = SourceUnit::new("n", "t");
        u.ops.insert("graph".into(), None);
        u.ops.insert("depresolve".into(), Some(ToolRef::new("tc", "dep")));
        assert!(u.wants_op("graph"));
        assert!(u.tool_override("graph").is_none());
        assert_eq!(
            u.tool_override("depresolve").map(|r| r.subcmd.as_str()),
            Some("dep")
        );
        assert!(!u.wants_op("blame"));
    }

    #[test]
    fn empty_cached_rev_is_ignored() {
        let mut u = SourceUnit::new("n", "t");
        u.cached_rev = Some(String::new());
        assert_eq!(u.cached_rev(), None);
        u.cached_rev = Some("abc".into());
        assert_eq!(u.cached_rev(), Some("abc"));
    }
}
