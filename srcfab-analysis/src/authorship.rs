use srcfab_types::authorship::{
    AuthorStats, AuthorshipInfo, AuthorshipOutput, DefAuthorship, RefAuthorship,
};
use srcfab_types::blame::{BlameOutput, Hunk};
use srcfab_types::graph::GraphOutput;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorshipError {
    #[error("no commit ID {commit_id:?} for hunk {hunk:?} in file {file}")]
    MissingCommit {
        commit_id: String,
        file: String,
        hunk: Hunk,
    },
}

/// Authors of one span, keyed by email, with the characters each wrote.
type SpanAuthors = BTreeMap<String, (AuthorshipInfo, u32)>;

/// Attributes every def and ref of a unit to the authors of the blame hunks
/// overlapping it, and summarizes per author.
pub fn compute_unit_authorship(
    blame: &BlameOutput,
    graph: &GraphOutput,
) -> Result<AuthorshipOutput, AuthorshipError> {
    let mut out = AuthorshipOutput::default();

    for def in &graph.defs {
        let authors = span_authors(blame, &def.file, def.def_start, def.def_end)?;
        if authors.is_empty() {
            continue;
        }
        let total = def.def_end.saturating_sub(def.def_start);
        let entries = out.defs.entry(def.key.path.clone()).or_default();
        for (info, chars) in authors.into_values() {
            entries.push(DefAuthorship {
                info,
                exported: def.exported,
                chars,
                chars_proportion: proportion(chars, total),
            });
        }
    }

    for r in &graph.refs {
        let authors = span_authors(blame, &r.file, r.start, r.end)?;
        for (info, _) in authors.into_values() {
            out.refs.push(RefAuthorship { key: r.key(), info });
        }
    }

    out.authors = author_stats(&out);
    Ok(out)
}

fn span_authors(
    blame: &BlameOutput,
    file: &str,
    start: u32,
    end: u32,
) -> Result<SpanAuthors, AuthorshipError> {
    let mut authors = SpanAuthors::new();
    let Some(hunks) = blame.hunk_map.get(file) else {
        debug!(file, "no blame hunks for file");
        return Ok(authors);
    };

    for h in hunks {
        if !(h.char_start <= end && h.char_end > start) {
            continue;
        }
        let commit = blame
            .commit_map
            .get(&h.commit_id)
            .ok_or_else(|| AuthorshipError::MissingCommit {
                commit_id: h.commit_id.clone(),
                file: file.to_string(),
                hunk: h.clone(),
            })?;

        let nchars = end.min(h.char_end).saturating_sub(start.max(h.char_start));
        let email = &commit.author.email;
        match authors.get_mut(email) {
            Some((info, chars)) => {
                if info.last_commit_date < commit.author_date {
                    info.last_commit_date = commit.author_date;
                    info.last_commit_id = commit.id.clone();
                }
                *chars += nchars;
            }
            None => {
                authors.insert(
                    email.clone(),
                    (
                        AuthorshipInfo {
                            author_email: email.clone(),
                            last_commit_date: commit.author_date,
                            last_commit_id: commit.id.clone(),
                        },
                        nchars,
                    ),
                );
            }
        }
    }
    Ok(authors)
}

fn author_stats(out: &AuthorshipOutput) -> Vec<AuthorStats> {
    let total_defs = out.defs.len() as u32;
    let total_exported = out
        .defs
        .values()
        .filter(|authors| authors.first().is_some_and(|a| a.exported))
        .count() as u32;

    let mut by_email: BTreeMap<&str, AuthorStats> = BTreeMap::new();
    for authors in out.defs.values() {
        for da in authors {
            let stats = by_email
                .entry(da.info.author_email.as_str())
                .or_insert_with(|| AuthorStats {
                    info: da.info.clone(),
                    def_count: 0,
                    defs_proportion: 0.0,
                    exported_def_count: 0,
                    exported_defs_proportion: 0.0,
                });
            stats.def_count += 1;
            if da.exported {
                stats.exported_def_count += 1;
            }
            if stats.info.last_commit_date < da.info.last_commit_date {
                stats.info.last_commit_date = da.info.last_commit_date;
                stats.info.last_commit_id = da.info.last_commit_id.clone();
            }
        }
    }

    by_email
        .into_values()
        .map(|mut stats| {
            stats.defs_proportion = proportion(stats.def_count, total_defs);
            stats.exported_defs_proportion = proportion(stats.exported_def_count, total_exported);
            stats
        })
        .collect()
}

fn proportion(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(total)
    }
}
