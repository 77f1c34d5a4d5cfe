//! Per-unit authorship computed from blame and graph output.

use crate::graph::RefKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorshipInfo {
    pub author_email: String,

    pub last_commit_date: DateTime<Utc>,

    /// Most recent commit by this author touching the described range.
    #[serde(rename = "LastCommitID")]
    pub last_commit_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DefAuthorship {
    #[serde(flatten)]
    pub info: AuthorshipInfo,

    pub exported: bool,

    pub chars: u32,

    pub chars_proportion: f64,
}

/// A ref has exactly one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RefAuthorship {
    #[serde(flatten)]
    pub key: RefKey,

    #[serde(flatten)]
    pub info: AuthorshipInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorStats {
    #[serde(flatten)]
    pub info: AuthorshipInfo,

    /// Number of defs this author touched.
    pub def_count: u32,

    pub defs_proportion: f64,

    pub exported_def_count: u32,

    pub exported_defs_proportion: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorshipOutput {
    /// Authors of each def, keyed by def path.
    #[serde(default)]
    pub defs: BTreeMap<String, Vec<DefAuthorship>>,

    #[serde(default)]
    pub refs: Vec<RefAuthorship>,

    #[serde(default)]
    pub authors: Vec<AuthorStats>,
}
