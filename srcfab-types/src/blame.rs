//! VCS blame data handed to the core by a blame tool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlameOutput {
    /// Commits by ID.
    #[serde(default)]
    pub commit_map: BTreeMap<String, BlameCommit>,

    /// Hunks by file path, relative to the tree root.
    #[serde(default)]
    pub hunk_map: BTreeMap<String, Vec<Hunk>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlameCommit {
    #[serde(rename = "ID")]
    pub id: String,

    pub author: Signature,

    pub author_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Signature {
    #[serde(default)]
    pub name: String,

    pub email: String,
}

/// A contiguous character range last touched by one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Hunk {
    #[serde(default)]
    pub line_start: u32,

    #[serde(default)]
    pub line_end: u32,

    pub char_start: u32,

    pub char_end: u32,

    #[serde(rename = "CommitID")]
    pub commit_id: String,
}
