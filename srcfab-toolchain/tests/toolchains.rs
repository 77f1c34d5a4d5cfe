//! Toolchain discovery and tool execution against real directories.

use camino::{Utf8Path, Utf8PathBuf};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use srcfab_toolchain::{
    DESCRIPTOR_FILE, Mode, SearchPath, ToolchainError, add, list, lookup, open_tool, temp_dir,
};
use tempfile::TempDir;

const DESCRIPTOR: &str = r#"{"Tools":[{"Subcmd":"graph","Op":"graph","SourceUnitTypes":["GoPackage"]}]}"#;

fn utf8(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 temp path")
}

fn make_toolchain(root: &Utf8Path, path: &str) -> Utf8PathBuf {
    let dir = root.join(path);
    std::fs::create_dir_all(&dir).expect("mkdir toolchain");
    std::fs::write(dir.join(DESCRIPTOR_FILE), DESCRIPTOR).expect("write descriptor");
    dir
}

#[test]
fn lookup_reads_descriptor() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = utf8(&temp);
    make_toolchain(&root, "github.com/acme/go-tc");

    let search = SearchPath::new(vec![root.clone()]);
    let info = lookup(&search, "github.com/acme/go-tc/").expect("lookup");
    assert_eq!(info.path, "github.com/acme/go-tc");
    assert_eq!(info.dir, root.join("github.com/acme/go-tc"));
    assert_eq!(info.program, None);

    let cfg = info.read_config().expect("config");
    assert_eq!(cfg.tools[0].subcmd, "graph");
    assert_eq!(cfg.tools_for("graph", "GoPackage").count(), 1);
}

#[test]
fn lookup_missing_toolchain_is_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let search = SearchPath::new(vec![utf8(&temp)]);
    let err = lookup(&search, "github.com/acme/none").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn lookup_in_two_roots_is_shadowed() {
    let a = tempfile::tempdir().expect("tempdir");
    let b = tempfile::tempdir().expect("tempdir");
    let dir_a = make_toolchain(&utf8(&a), "tc");
    let dir_b = make_toolchain(&utf8(&b), "tc");

    let search = SearchPath::new(vec![utf8(&a), utf8(&b)]);
    let err = lookup(&search, "tc").unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, ToolchainError::Shadowed { ref found, .. } if found.len() == 2));
    assert!(msg.contains(dir_a.as_str()), "{msg}");
    assert!(msg.contains(dir_b.as_str()), "{msg}");
}

#[test]
fn list_skips_hidden_and_nested_toolchains() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = utf8(&temp);
    make_toolchain(&root, "github.com/acme/b");
    make_toolchain(&root, "github.com/acme/a");
    make_toolchain(&root, "github.com/acme/a/nested");
    make_toolchain(&root, ".tmp/github.com/acme/scratch");
    make_toolchain(&root, "_old/tc");

    let search = SearchPath::new(vec![root]);
    let paths: Vec<String> = list(&search)
        .expect("list")
        .into_iter()
        .map(|i| i.path)
        .collect();
    assert_eq!(paths, vec!["github.com/acme/a", "github.com/acme/b"]);
}

#[cfg(unix)]
#[test]
fn list_reports_symlinked_toolchain_once() {
    let a = tempfile::tempdir().expect("tempdir");
    let b = tempfile::tempdir().expect("tempdir");
    let real = make_toolchain(&utf8(&a), "github.com/acme/tc");
    std::fs::create_dir_all(utf8(&b).join("github.com/acme")).expect("mkdir");
    std::os::unix::fs::symlink(&real, utf8(&b).join("github.com/acme/tc")).expect("symlink");
    std::os::unix::fs::symlink(utf8(&a).join("github.com"), utf8(&a).join("alias"))
        .expect("symlink");

    let search = SearchPath::new(vec![utf8(&a), utf8(&b)]);
    let found = list(&search).expect("list");
    let paths: Vec<&str> = found.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["github.com/acme/tc"]);
}

#[cfg(unix)]
#[test]
fn list_names_symlinked_trees_relative_to_their_root() {
    let root = tempfile::tempdir().expect("tempdir");
    let elsewhere = tempfile::tempdir().expect("tempdir");
    let real = make_toolchain(&utf8(&elsewhere), "checkout");
    std::fs::create_dir_all(utf8(&root).join("example.com")).expect("mkdir");
    std::os::unix::fs::symlink(&real, utf8(&root).join("example.com/tc")).expect("symlink");

    let search = SearchPath::new(vec![utf8(&root)]);
    let found = list(&search).expect("list");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].path, "example.com/tc");
}

#[cfg(unix)]
mod program {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::PermissionsExt;

    const SCRIPT: &str = "#!/bin/sh\nif [ \"$1\" = \"echo\" ]; then cat; else echo '{\"partial\":true}'; exit 3; fi\n";

    fn install_program(dir: &Utf8Path, name: &str, mode: u32) {
        let bin = dir.join(".bin");
        std::fs::create_dir_all(&bin).expect("mkdir .bin");
        let prog = bin.join(name);
        std::fs::write(&prog, SCRIPT).expect("write program");
        std::fs::set_permissions(&prog, std::fs::Permissions::from_mode(mode)).expect("chmod");
    }

    #[test]
    fn tool_run_pipes_json_both_ways() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = utf8(&temp);
        let dir = make_toolchain(&root, "example.com/echo-tc");
        install_program(&dir, "echo-tc", 0o755);

        let search = SearchPath::new(vec![root]);
        let tool = open_tool(&search, "example.com/echo-tc", "echo", Mode::default())
            .expect("open tool");
        assert_eq!(tool.toolchain().mode(), Mode::PROGRAM);

        let input = json!({"GoVersion": "1.22"});
        let out: Value = tool.run(&[], Some(&input)).expect("run");
        assert_eq!(out, input);
    }

    #[test]
    fn failing_tool_keeps_partial_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = utf8(&temp);
        let dir = make_toolchain(&root, "example.com/echo-tc");
        install_program(&dir, "echo-tc", 0o755);

        let search = SearchPath::new(vec![root]);
        let tool = open_tool(&search, "example.com/echo-tc", "boom", Mode::PROGRAM)
            .expect("open tool");
        let err = tool.run::<Value, Value>(&[], None).unwrap_err();
        match err {
            ToolchainError::ToolFailed { tool, output, .. } => {
                assert_eq!(tool, "example.com/echo-tc:boom");
                assert_eq!(output, Some(json!({"partial": true})));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_executable_program_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = utf8(&temp);
        let dir = make_toolchain(&root, "example.com/echo-tc");
        install_program(&dir, "echo-tc", 0o644);

        let search = SearchPath::new(vec![root]);
        let err = lookup(&search, "example.com/echo-tc").unwrap_err();
        assert!(matches!(err, ToolchainError::NotExecutable { .. }));
    }

    #[test]
    fn add_symlinks_local_dir_into_first_root() {
        let roots = tempfile::tempdir().expect("tempdir");
        let src = tempfile::tempdir().expect("tempdir");
        let src_dir = make_toolchain(&utf8(&src), "work");

        let search = SearchPath::new(vec![utf8(&roots)]);
        let dst = add(&search, &src_dir, "github.com/me/tc", false).expect("add");
        assert_eq!(dst, utf8(&roots).join("github.com/me/tc"));
        assert_eq!(lookup(&search, "github.com/me/tc").expect("lookup").path, "github.com/me/tc");

        assert!(add(&search, &src_dir, "github.com/me/tc", false).is_err());
        add(&search, &src_dir, "github.com/me/tc", true).expect("forced add");
    }
}

#[test]
fn temp_dir_lives_under_first_root() {
    let a = tempfile::tempdir().expect("tempdir");
    let b = tempfile::tempdir().expect("tempdir");
    let search = SearchPath::new(vec![utf8(&a), utf8(&b)]);
    let dir = temp_dir(&search, "github.com/acme/tc").expect("temp dir");
    assert_eq!(dir, utf8(&a).join(".tmp/github.com/acme/tc"));
    assert!(dir.is_dir());
}
