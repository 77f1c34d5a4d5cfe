//! Output of a grapher tool: definitions, references, docs and annotations.

use serde::{Deserialize, Serialize};

/// Globally identifies a definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DefKey {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,

    #[serde(rename = "CommitID", default, skip_serializing_if = "String::is_empty")]
    pub commit_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,

    pub path: String,
}

impl DefKey {
    /// JSON encoding of the key; defs and docs are ordered by it.
    pub fn sort_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Def {
    #[serde(flatten)]
    pub key: DefKey,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tree_path: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default)]
    pub file: String,

    #[serde(default)]
    pub def_start: u32,

    #[serde(default)]
    pub def_end: u32,

    #[serde(default)]
    pub exported: bool,

    #[serde(default)]
    pub local: bool,

    #[serde(default)]
    pub test: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Identifies a reference for duplicate detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RefKey {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub def_repo: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub def_unit_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub def_unit: String,

    pub def_path: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,

    #[serde(rename = "CommitID", default, skip_serializing_if = "String::is_empty")]
    pub commit_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,

    pub file: String,

    pub start: u32,

    pub end: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ref {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub def_repo: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub def_unit_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub def_unit: String,

    pub def_path: String,

    /// True if this ref is the definition site itself.
    #[serde(default)]
    pub def: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,

    #[serde(rename = "CommitID", default, skip_serializing_if = "String::is_empty")]
    pub commit_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,

    #[serde(default)]
    pub file: String,

    #[serde(default)]
    pub start: u32,

    #[serde(default)]
    pub end: u32,
}

impl Ref {
    pub fn key(&self) -> RefKey {
        RefKey {
            def_repo: self.def_repo.clone(),
            def_unit_type: self.def_unit_type.clone(),
            def_unit: self.def_unit.clone(),
            def_path: self.def_path.clone(),
            repo: self.repo.clone(),
            commit_id: self.commit_id.clone(),
            unit_type: self.unit_type.clone(),
            unit: self.unit.clone(),
            file: self.file.clone(),
            start: self.start,
            end: self.end,
        }
    }

    pub fn def_key(&self) -> DefKey {
        DefKey {
            repo: self.def_repo.clone(),
            commit_id: String::new(),
            unit_type: self.def_unit_type.clone(),
            unit: self.def_unit.clone(),
            path: self.def_path.clone(),
        }
    }

    pub fn sort_key(&self) -> String {
        format!(
            "{}{}{}{}{}{}{}{}{}{}",
            self.def_path,
            self.def_repo,
            self.def_unit_type,
            self.def_unit,
            self.repo,
            self.unit_type,
            self.unit,
            self.file,
            self.start,
            self.end
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Doc {
    #[serde(flatten)]
    pub key: DefKey,

    /// MIME type of `data`, e.g. `text/html`.
    pub format: String,

    pub data: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,

    #[serde(default)]
    pub start: u32,

    #[serde(default)]
    pub end: u32,
}

/// Identifies a doc for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocKey {
    pub def: DefKey,
    pub format: String,
    pub file: String,
}

impl Doc {
    pub fn doc_key(&self) -> DocKey {
        DocKey {
            def: self.key.clone(),
            format: self.format.clone(),
            file: self.file.clone(),
        }
    }
}

/// A source annotation (e.g. a link or a syntax class).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ann {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,

    #[serde(rename = "CommitID", default, skip_serializing_if = "String::is_empty")]
    pub commit_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,

    #[serde(rename = "Type")]
    pub ann_type: String,

    pub file: String,

    pub start: u32,

    pub end: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Ann {
    pub fn sort_key(&self) -> String {
        [
            self.repo.as_str(),
            self.commit_id.as_str(),
            self.unit_type.as_str(),
            self.unit.as_str(),
            self.ann_type.as_str(),
            self.file.as_str(),
            &self.start.to_string(),
            &self.end.to_string(),
        ]
        .join(":")
    }
}

/// Everything a grapher emits for one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GraphOutput {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defs: Vec<Def>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<Ref>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<Doc>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anns: Vec<Ann>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn def_flattens_its_key() {
        let def = Def {
            key: DefKey {
                unit_type: "t".into(),
                unit: "u".into(),
                path: "p".into(),
                ..DefKey::default()
            },
            name: "P".into(),
            file: "f.go".into(),
            def_start: 1,
            def_end: 4,
            ..Def::default()
        };
        let v = serde_json::to_value(&def).expect("json");
        assert_eq!(v["UnitType"], "t");
        assert_eq!(v["Path"], "p");
        assert!(v.get("Repo").is_none());

        let back: Def = serde_json::from_value(v).expect("parse");
        assert_eq!(back, def);
    }

    #[test]
    fn def_key_sort_key_is_json() {
        let k = DefKey {
            path: "a/b".into(),
            ..DefKey::default()
        };
        assert_eq!(k.sort_key(), r#"{"Path":"a/b"}"#);
    }

    #[test]
    fn ann_sort_key_joins_with_colons() {
        let a = Ann {
            repo: "r".into(),
            ann_type: "link".into(),
            file: "f".into(),
            start: 3,
            end: 9,
            ..Ann::default()
        };
        assert_eq!(a.sort_key(), "r::::link:f:3:9");
    }
}
