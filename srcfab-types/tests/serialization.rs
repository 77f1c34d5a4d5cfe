//! Wire-format tests: the JSON shapes exchanged with external tools.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use srcfab_types::blame::BlameOutput;
use srcfab_types::graph::GraphOutput;
use srcfab_types::plan::{DataTarget, Rule};
use srcfab_types::{SourceUnit, ToolRef, Tree, UnitId};

#[test]
fn scanner_output_parses_into_units() {
    let json = r#"[
        {
            "Name": "github.com/acme/lib",
            "Type": "GoPackage",
            "Dir": "lib",
            "Files": ["lib/a.go", "lib/b.go"],
            "Dependencies": ["fmt", "github.com/acme/util"],
            "Config": {"GOPATH": "/go"},
            "Ops": {"graph": null, "depresolve": {"Toolchain": "tc", "Subcmd": "dep"}}
        }
    ]"#;
    let units: Vec<SourceUnit> = serde_json::from_str(json).expect("parse units");
    assert_eq!(units.len(), 1);
    let u = &units[0];
    assert_eq!(u.unit_type, "GoPackage");
    assert_eq!(u.dependencies.len(), 2);
    assert_eq!(u.config["GOPATH"], "/go");
    assert!(u.wants_op("graph"));
    assert_eq!(u.tool_override("depresolve"), Some(&ToolRef::new("tc", "dep")));
    assert_eq!(u.cached_rev(), None);
}

#[test]
fn unit_serialization_omits_empty_fields() {
    let mut u = SourceUnit::new("n", "t");
    u.files = vec!["f".into()];
    u.commit_id = "abc".into();
    let json = serde_json::to_string(&u).expect("json");
    assert_eq!(json, r#"{"Name":"n","Type":"t","CommitID":"abc","Files":["f"]}"#);
}

#[test]
fn tree_config_reads_srcfile_fields() {
    let json = r#"{
        "Scanners": [{"Toolchain": "tc", "Subcmd": "scan"}],
        "SkipDirs": ["vendor"],
        "SkipUnits": [{"Name": "x", "Type": "t"}],
        "Config": {"key": "value"}
    }"#;
    let tree: Tree = serde_json::from_str(json).expect("parse tree");
    assert!(tree.units.is_empty());
    assert_eq!(tree.scanners, vec![ToolRef::new("tc", "scan")]);
    assert_eq!(tree.skip_dirs, vec!["vendor".to_string()]);
    assert_eq!(tree.skip_units[0].name, "x");
    assert_eq!(tree.config["key"], "value");
}

#[test]
fn graph_output_accepts_partial_documents() {
    let json = r#"{"Defs":[{"Path":"p","Name":"P","File":"a.py","DefStart":0,"DefEnd":5}]}"#;
    let out: GraphOutput = serde_json::from_str(json).expect("parse graph");
    assert_eq!(out.defs.len(), 1);
    assert!(out.refs.is_empty());
    assert_eq!(out.defs[0].key.path, "p");
}

#[test]
fn blame_output_parses_commit_dates() {
    let json = r#"{
        "CommitMap": {"c1": {"ID": "c1", "Author": {"Name": "A", "Email": "a@x"}, "AuthorDate": "2014-01-02T03:04:05Z"}},
        "HunkMap": {"a.py": [{"CharStart": 0, "CharEnd": 10, "CommitID": "c1"}]}
    }"#;
    let out: BlameOutput = serde_json::from_str(json).expect("parse blame");
    assert_eq!(out.commit_map["c1"].author.email, "a@x");
    assert_eq!(out.hunk_map["a.py"][0].char_end, 10);
}

#[test]
fn rule_json_keeps_structured_output() {
    let unit = SourceUnit::new("n", "t");
    let rule = Rule::for_unit(
        "graph",
        &unit,
        DataTarget {
            data_dir: ".srcfab-cache".into(),
            commit_id: Some("c".into()),
            file: "n/t.graph.json".into(),
        },
        vec![],
        vec!["true".into()],
    );
    let back: Rule = serde_json::from_str(&serde_json::to_string(&rule).expect("json"))
        .expect("parse rule");
    assert_eq!(back.target, ".srcfab-cache/c/n/t.graph.json");
    assert_eq!(back.output, rule.output);
    assert_eq!(back.unit_id(), Some(UnitId::new("n", "t")));
}

proptest! {
    #[test]
    fn unit_id_parse_recovers_name_and_type(
        name in "[a-zA-Z0-9_./@:% -]{1,24}",
        ty in "[A-Za-z][A-Za-z0-9]{0,10}",
    ) {
        let id = UnitId::new(&name, &ty);
        let (n, t) = id.parse().unwrap();
        prop_assert_eq!(n, name);
        prop_assert_eq!(t, ty);
    }
}
