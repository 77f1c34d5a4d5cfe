use crate::uri::{UriError, try_make_uri};
use crate::validate::{MultiError, validate_defs, validate_docs, validate_refs};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use srcfab_types::graph::GraphOutput;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Unit types whose graphers already emit byte offsets.
pub const BYTE_OFFSET_UNIT_TYPES: &[&str] = &["GoPackage", "Dockerfile", "NugetPackage"];

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("canonicalize {field} of ref {def_path:?}: {source}")]
    Uri {
        field: &'static str,
        def_path: String,
        #[source]
        source: UriError,
    },

    #[error("{0}")]
    Invalid(#[from] MultiError),
}

/// Post-processes one grapher run in place.
///
/// Ref repos are canonicalized, offsets are converted from characters to
/// bytes (relative to `dir`), duplicate keys are rejected and every list is
/// sorted.
pub fn normalize_graph_data(
    unit_type: &str,
    dir: &Utf8Path,
    output: &mut GraphOutput,
) -> Result<(), NormalizeError> {
    for r in &mut output.refs {
        if !r.def_repo.is_empty() {
            r.def_repo = try_make_uri(&r.def_repo).map_err(|source| NormalizeError::Uri {
                field: "DefRepo",
                def_path: r.def_path.clone(),
                source,
            })?;
        }
        if !r.repo.is_empty() {
            r.repo = try_make_uri(&r.repo).map_err(|source| NormalizeError::Uri {
                field: "Repo",
                def_path: r.def_path.clone(),
                source,
            })?;
        }
    }

    if BYTE_OFFSET_UNIT_TYPES.contains(&unit_type) {
        debug!(unit_type, "offsets already in bytes");
    } else {
        ensure_byte_offsets(dir, output);
    }

    validate(output)?;
    sort_output(output);
    Ok(())
}

fn validate(output: &GraphOutput) -> Result<(), MultiError> {
    let mut errs = validate_refs(&output.refs);
    errs.extend(validate_defs(&output.defs));
    errs.extend(validate_docs(&output.docs));
    errs.into_result()
}

/// Stable order: defs and docs by def key, refs and anns by their flat keys.
pub fn sort_output(output: &mut GraphOutput) {
    output.defs.sort_by_cached_key(|d| d.key.sort_key());
    output.refs.sort_by_cached_key(|r| r.sort_key());
    output.docs.sort_by_cached_key(|d| d.key.sort_key());
    output.anns.sort_by_cached_key(|a| a.sort_key());
}

fn ensure_byte_offsets(dir: &Utf8Path, output: &mut GraphOutput) {
    let mut files = OffsetTables::new(dir);
    for d in &mut output.defs {
        files.fix(&d.file, &mut [&mut d.def_start, &mut d.def_end]);
    }
    for r in &mut output.refs {
        files.fix(&r.file, &mut [&mut r.start, &mut r.end]);
    }
    for d in &mut output.docs {
        files.fix(&d.file, &mut [&mut d.start, &mut d.end]);
    }
}

/// Per-file character to byte offset tables, loaded on first use.
struct OffsetTables<'a> {
    dir: &'a Utf8Path,
    // `None` marks files that are missing or not regular.
    tables: HashMap<Utf8PathBuf, Option<Vec<u32>>>,
}

impl<'a> OffsetTables<'a> {
    fn new(dir: &'a Utf8Path) -> Self {
        Self {
            dir,
            tables: HashMap::new(),
        }
    }

    fn fix(&mut self, file: &str, offsets: &mut [&mut u32]) {
        if file.is_empty() {
            return;
        }
        let path = self.dir.join(file);
        let Some(table) = self
            .tables
            .entry(path.clone())
            .or_insert_with(|| load_table(&path))
        else {
            return;
        };

        let mut converted = Vec::with_capacity(offsets.len());
        for offset in offsets.iter() {
            if **offset == 0 {
                converted.push(0);
                continue;
            }
            match table.get(**offset as usize) {
                Some(&byte) => converted.push(byte),
                None => {
                    warn!(
                        file = %path,
                        offset = **offset,
                        "failed to convert character offset to byte offset (did the grapher emit a nonexistent offset?), continuing anyway"
                    );
                    return;
                }
            }
        }
        for (offset, byte) in offsets.iter_mut().zip(converted) {
            **offset = byte;
        }
    }
}

/// Byte offset of every character boundary, including end of file.
fn load_table(path: &Utf8Path) -> Option<Vec<u32>> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => {}
        _ => return None,
    }
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            warn!(file = %path, error = %e, "read source file for offset conversion");
            return None;
        }
    };
    Some(char_boundaries(&String::from_utf8_lossy(&data), data.len()))
}

fn char_boundaries(text: &str, byte_len: usize) -> Vec<u32> {
    // Lossy decoding may change byte lengths; fall back to one char per byte.
    if text.len() != byte_len {
        return (0..=byte_len as u32).collect();
    }
    let mut table: Vec<u32> = text.char_indices().map(|(i, _)| i as u32).collect();
    table.push(byte_len as u32);
    table
}
