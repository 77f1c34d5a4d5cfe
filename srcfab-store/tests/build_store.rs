//! Build store behaviour against a real filesystem.

use camino::{Utf8Path, Utf8PathBuf};
use pretty_assertions::assert_eq;
use srcfab_store::{
    DataTypeRegistry, RepoStore, StoreError, list_data_files, load_units, read_cached_tree,
    write_unit,
};
use srcfab_types::graph::GraphOutput;
use srcfab_types::SourceUnit;
use std::io::{Read, Write};
use tempfile::TempDir;

fn store_root(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().join("store")).expect("utf8 temp path")
}

#[test]
fn create_then_open_round_trips_bytes() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = RepoStore::new(store_root(&temp));
    let commit = store.commit("c1");
    assert!(!commit.exists(), "commit dir is created lazily");

    let mut f = commit.create("pkg/Go.graph.json").expect("create");
    f.write_all(b"{\"Defs\":[]}").expect("write");
    drop(f);

    let mut back = String::new();
    commit
        .open("pkg/Go.graph.json")
        .expect("open")
        .read_to_string(&mut back)
        .expect("read");
    assert_eq!(back, "{\"Defs\":[]}");
    assert!(store.build_data_exists_for_commit("c1"));
}

#[test]
fn list_data_files_recovers_commit_and_path() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = RepoStore::new(store_root(&temp));
    store
        .commit("c2")
        .write("b/Python.graph.json", b"{}")
        .expect("write b");
    store
        .commit("c1")
        .write("a/Go.unit.json", b"{}")
        .expect("write a");

    let files = list_data_files(&store, "github.com/acme/lib", Utf8Path::new(".")).expect("list");
    let got: Vec<(&str, &str)> = files
        .iter()
        .map(|f| (f.commit_id.as_str(), f.path.as_str()))
        .collect();
    assert_eq!(got, vec![("c1", "a/Go.unit.json"), ("c2", "b/Python.graph.json")]);

    let name = files[1].name.as_ref().expect("parsed file name");
    assert_eq!(name.unit_type, "Python");
    assert_eq!(name.data_type, "graph");
    assert_eq!(files[1].unit.as_deref(), Some("b"));
    assert_eq!(files[1].size, 2);
    assert_eq!(files[0].repo_uri, "github.com/acme/lib");
}

#[test]
fn list_data_files_rejects_files_outside_a_commit() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = store_root(&temp);
    std::fs::create_dir_all(&root).expect("mkdir");
    std::fs::write(root.join("stray.json"), b"{}").expect("write");

    let store = RepoStore::new(root);
    let err = list_data_files(&store, "r", Utf8Path::new(".")).unwrap_err();
    assert!(matches!(err, StoreError::BadDataFilePath { ref path } if path == "stray.json"));
}

#[test]
fn remove_all_data_for_commit_is_idempotent() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = RepoStore::new(store_root(&temp));
    let commit = store.commit("c1");
    commit.write("a/b/c/T.graph.json", b"{}").expect("write");
    commit.write("a/T.unit.json", b"{}").expect("write");
    store.commit("c2").write("x/T.unit.json", b"{}").expect("write");

    store.remove_all_data_for_commit("c1").expect("first removal");
    assert!(!store.build_data_exists_for_commit("c1"));
    store.remove_all_data_for_commit("c1").expect("second removal");
    assert!(store.build_data_exists_for_commit("c2"));
    assert_eq!(store.commits().expect("commits"), vec!["c2".to_string()]);
}

#[test]
fn load_units_reports_unconfigured_commit() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = RepoStore::new(store_root(&temp));
    let err = load_units(&store.commit("missing")).unwrap_err();
    assert!(err.is_not_configured());
    assert!(err.to_string().contains("srcfab config"));
}

#[test]
fn cached_tree_contains_written_units_in_path_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = RepoStore::new(store_root(&temp));
    let commit = store.commit("c1");

    let mut z = SourceUnit::new("z/pkg", "Go");
    z.files = vec!["z/pkg/a.go".into()];
    let a = SourceUnit::new("a", "Python");
    assert_eq!(write_unit(&commit, &z).expect("write z"), "z/pkg/Go.unit.json");
    write_unit(&commit, &a).expect("write a");
    commit.write("a/Python.graph.json", b"{}").expect("unrelated artifact");

    let tree = read_cached_tree(&commit).expect("tree");
    let names: Vec<&str> = tree.units.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["a", "z/pkg"]);
    assert_eq!(tree.units[1], z);
}

#[test]
fn registry_decodes_stored_artifacts_by_file_name() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = RepoStore::new(store_root(&temp));
    let commit = store.commit("c1");
    commit
        .write(
            "n/t.graph.json",
            br#"{"Defs":[{"Path":"p","Name":"P","File":"f","DefStart":0,"DefEnd":1}]}"#,
        )
        .expect("write");

    let files = list_data_files(&store, "r", Utf8Path::new("c1")).expect("list");
    let name = files[0].name.as_ref().expect("name");
    let reg = DataTypeRegistry::builtin();
    let obj = reg
        .decode(&name.data_type, &commit.read(&files[0].path).expect("read"))
        .expect("decode");
    let graph = obj
        .as_any()
        .downcast_ref::<GraphOutput>()
        .expect("graph output");
    assert_eq!(graph.defs[0].name, "P");
}
