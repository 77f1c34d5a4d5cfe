//! Rendering helpers: make-compatible build graphs and plain-text listings.

use regex::Regex;
use srcfab_store::BuildDataFileInfo;
use srcfab_toolchain::{Info, ToolInfo};
use srcfab_types::plan::Makefile;
use srcfab_types::{SourceUnit, Tree};
use std::sync::LazyLock;

static SAFE_WORD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[\w\d_/.-]+$").ok());

/// Quotes `s` for a recipe line unless it is a plain path-like word.
///
/// Apostrophes are dropped rather than escaped, so `it's.go` renders as
/// `'its.go'` and no longer names the same file.
pub fn quote(s: &str) -> String {
    let safe = SAFE_WORD.as_ref().is_some_and(|re| re.is_match(s));
    if safe {
        return s.to_string();
    }
    let escaped = format!("{s:?}");
    let inner = escaped
        .strip_prefix('"')
        .and_then(|e| e.strip_suffix('"'))
        .unwrap_or(&escaped);
    format!("'{}'", inner.replace('\'', ""))
}

/// Renders rules in make syntax, one block per rule separated by blank lines.
pub fn render_makefile(mf: &Makefile) -> String {
    let blocks: Vec<String> = mf
        .rules
        .iter()
        .map(|rule| {
            let mut block = format!("{}:", rule.target);
            for p in &rule.prereqs {
                block.push(' ');
                block.push_str(p);
            }
            block.push('\n');
            for recipe in &rule.recipes {
                block.push('\t');
                block.push_str(recipe);
                block.push('\n');
            }
            block
        })
        .collect();
    blocks.join("\n")
}

pub fn render_units(units: &[SourceUnit]) -> String {
    if units.is_empty() {
        return "No source units.\n".to_string();
    }
    let mut out = String::new();
    for u in units {
        out.push_str(&format!("{}\n", u.id()));
        if !u.dir.is_empty() {
            out.push_str(&format!("  dir: {}\n", u.dir));
        }
        out.push_str(&format!("  files: {}\n", u.files.len()));
        if !u.ops.is_empty() {
            let ops: Vec<String> = u
                .ops
                .iter()
                .map(|(op, tool)| match tool {
                    Some(t) => format!("{op}={t}"),
                    None => op.clone(),
                })
                .collect();
            out.push_str(&format!("  ops: {}\n", ops.join(", ")));
        }
        if let Some(rev) = u.cached_rev() {
            out.push_str(&format!("  cached from: {rev}\n"));
        }
    }
    out
}

/// Summary printed after configuring a tree.
pub fn render_tree_summary(tree: &Tree) -> String {
    let mut out = String::new();
    out.push_str("SCANNERS\n");
    if tree.scanners.is_empty() {
        out.push_str("  (none)\n");
    }
    for s in &tree.scanners {
        out.push_str(&format!("  - {s}\n"));
    }

    out.push_str(&format!("\nSOURCE UNITS ({})\n", tree.units.len()));
    for line in render_units(&tree.units).lines() {
        out.push_str(&format!("  {line}\n"));
    }

    if !tree.config.is_empty() {
        out.push_str("\nCONFIG\n");
        for (k, v) in &tree.config {
            out.push_str(&format!("  {k}: {v}\n"));
        }
    }
    out
}

pub fn render_toolchains(infos: &[Info]) -> String {
    let width = infos.iter().map(|i| i.path.len()).max().unwrap_or(0).max(4);
    let mut out = format!("{:<width$}  MODES\n", "PATH");
    for info in infos {
        out.push_str(&format!(
            "{:<width$}  {}\n",
            info.path,
            info.available_modes()
        ));
    }
    out
}

/// Lists tools as `(toolchain path, tool)` pairs.
pub fn render_tools(tools: &[(String, ToolInfo)]) -> String {
    let mut out = String::new();
    for (toolchain, tool) in tools {
        out.push_str(&format!(
            "{}:{}\top={}\ttypes={}\n",
            toolchain,
            tool.subcmd,
            tool.op,
            tool.source_unit_types.join(",")
        ));
    }
    out
}

pub fn render_data_files(files: &[BuildDataFileInfo]) -> String {
    let mut out = String::new();
    for f in files {
        let (unit_type, data_type) = match &f.name {
            Some(n) => (n.unit_type.as_str(), n.data_type.as_str()),
            None => ("-", "-"),
        };
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            f.commit_id,
            f.unit.as_deref().unwrap_or("-"),
            unit_type,
            data_type,
            f.size,
            f.path
        ));
    }
    out
}

/// Pretty JSON with a trailing newline.
pub fn render_json(value: &serde_json::Value) -> String {
    let mut s = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    s.push('\n');
    s
}
