use crate::unit::{SourceUnit, UnitId};
use serde::{Deserialize, Serialize};

/// Name of the aggregate rule prepended to every plan.
pub const ALL_TARGET: &str = "all";

/// Directive telling the executor to delete targets of failed recipes.
pub const DELETE_ON_ERROR: &str = ".DELETE_ON_ERROR";

/// Location of a build artifact, kept structured so the commit segment can be
/// swapped without reparsing the rendered path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTarget {
    /// Build data directory, e.g. `.srcfab-cache`.
    pub data_dir: String,

    /// Commit segment below `data_dir`, if the layout has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,

    /// Path within the commit, e.g. `pkg/GoPackage.graph.json`.
    pub file: String,
}

impl DataTarget {
    pub fn path(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if !self.data_dir.is_empty() && self.data_dir != "." {
            parts.push(self.data_dir.trim_end_matches('/'));
        }
        if let Some(commit) = self.commit_id.as_deref() {
            parts.push(commit);
        }
        parts.push(&self.file);
        parts.join("/")
    }

    /// Same file, addressed at another commit. Returns `None` when the layout
    /// has no commit segment to substitute.
    pub fn at_commit(&self, commit_id: &str) -> Option<DataTarget> {
        self.commit_id.as_ref()?;
        Some(DataTarget {
            data_dir: self.data_dir.clone(),
            commit_id: Some(commit_id.to_string()),
            file: self.file.clone(),
        })
    }
}

/// One node of the build graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub target: String,

    #[serde(default)]
    pub prereqs: Vec<String>,

    /// Shell command lines. Empty means the rule is a placeholder.
    #[serde(default)]
    pub recipes: Vec<String>,

    /// Operation that produced the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<SourceUnit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<DataTarget>,
}

impl Rule {
    /// A bare rule with no recipe, e.g. the aggregate or a directive.
    pub fn placeholder(target: impl Into<String>, prereqs: Vec<String>) -> Self {
        Self {
            target: target.into(),
            prereqs,
            recipes: vec![],
            op: None,
            unit: None,
            output: None,
        }
    }

    /// A rule producing `output` for `unit` as part of `op`.
    pub fn for_unit(
        op: &str,
        unit: &SourceUnit,
        output: DataTarget,
        prereqs: Vec<String>,
        recipes: Vec<String>,
    ) -> Self {
        Self {
            target: output.path(),
            prereqs,
            recipes,
            op: Some(op.to_string()),
            unit: Some(unit.clone()),
            output: Some(output),
        }
    }

    pub fn unit_id(&self) -> Option<UnitId> {
        self.unit.as_ref().map(SourceUnit::id)
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.op.as_deref() == Some(op)
    }

    pub fn is_placeholder(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// An ordered set of rules, renderable as a make-compatible file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Makefile {
    pub rules: Vec<Rule>,
}

impl Makefile {
    /// The first rule that is not a directive.
    pub fn default_rule(&self) -> Option<&Rule> {
        self.rules.iter().find(|r| !r.target.starts_with('.'))
    }

    pub fn rule(&self, target: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.target == target)
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.target.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(commit: Option<&str>) -> DataTarget {
        DataTarget {
            data_dir: ".srcfab-cache".into(),
            commit_id: commit.map(str::to_string),
            file: "n/t.graph.json".into(),
        }
    }

    #[test]
    fn path_joins_present_segments() {
        assert_eq!(
            target(Some("c0ffee")).path(),
            ".srcfab-cache/c0ffee/n/t.graph.json"
        );
        assert_eq!(target(None).path(), ".srcfab-cache/n/t.graph.json");
    }

    #[test]
    fn at_commit_swaps_only_the_commit_segment() {
        let moved = target(Some("new")).at_commit("old").expect("has commit");
        assert_eq!(moved.path(), ".srcfab-cache/old/n/t.graph.json");
        assert!(target(None).at_commit("old").is_none());
    }

    #[test]
    fn default_rule_skips_directives() {
        let mf = Makefile {
            rules: vec![
                Rule::placeholder(DELETE_ON_ERROR, vec![]),
                Rule::placeholder(ALL_TARGET, vec!["x".into()]),
            ],
        };
        assert_eq!(mf.default_rule().map(|r| r.target.as_str()), Some("all"));
        assert!(mf.rule("x").is_none());
    }
}
