use srcfab_types::graph::{Def, Doc, Ref};
use std::collections::HashSet;
use std::fmt;

/// Every structural violation found in one grapher output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiError(Vec<String>);

impl MultiError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn extend(&mut self, other: MultiError) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    /// `Err(self)` when anything was collected.
    pub fn into_result(self) -> Result<(), MultiError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\n"))
    }
}

impl std::error::Error for MultiError {}

pub fn validate_refs(refs: &[Ref]) -> MultiError {
    let mut seen = HashSet::with_capacity(refs.len());
    let mut errs = MultiError::new();
    for r in refs {
        let key = r.key();
        if !seen.insert(key.clone()) {
            errs.push(format!("duplicate ref key: {key:?}"));
        }
    }
    errs
}

pub fn validate_defs(defs: &[Def]) -> MultiError {
    let mut seen = HashSet::with_capacity(defs.len());
    let mut errs = MultiError::new();
    for def in defs {
        if !seen.insert(&def.key) {
            errs.push(format!("duplicate def key: {:?}", def.key));
        }
    }
    errs
}

pub fn validate_docs(docs: &[Doc]) -> MultiError {
    let mut seen = HashSet::with_capacity(docs.len());
    let mut errs = MultiError::new();
    for doc in docs {
        let key = doc.doc_key();
        if !seen.insert(key.clone()) {
            errs.push(format!("duplicate doc key: {key:?}"));
        }
    }
    errs
}
