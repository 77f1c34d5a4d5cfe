use serde::{Deserialize, Serialize};

/// A raw dependency and, if resolution succeeded, what it points to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResolvedDep {
    /// The dependency as listed in the unit, in the tool's own format.
    #[serde(default)]
    pub raw: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ResolvedTarget>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResolvedTarget {
    #[serde(rename = "ToRepoCloneURL", default, skip_serializing_if = "String::is_empty")]
    pub to_repo_clone_url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to_unit: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to_unit_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to_version_string: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to_rev_spec: String,
}
