use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The commit's build data directory has never been written.
    #[error(
        "build cache dir {dir} does not exist (did you run `srcfab config` to create it?)"
    )]
    NotConfigured { dir: Utf8PathBuf },

    #[error("bad build data file path: {path:?}")]
    BadDataFilePath { path: String },

    #[error("path {path:?} escapes the build store")]
    InvalidPath { path: String },

    #[error("unknown data type {name:?}")]
    UnknownDataType { name: String },

    #[error("decode {name} data: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the "run config first" condition.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, StoreError::NotConfigured { .. })
    }
}
