use crate::error::ToolchainError;
use camino::{Utf8Path, Utf8PathBuf};

/// Environment variable holding the colon-separated toolchain roots.
pub const SEARCH_PATH_ENV: &str = "SRCFABPATH";

/// Directory under the home directory used when `SRCFABPATH` is unset.
pub const DEFAULT_ROOT_NAME: &str = ".srcfab";

/// Ordered list of toolchain root directories.
///
/// The first root is where fetched toolchains, symlinks and temp dirs go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPath {
    roots: Vec<Utf8PathBuf>,
}

impl SearchPath {
    pub fn new(roots: Vec<Utf8PathBuf>) -> Self {
        Self { roots }
    }

    /// Splits a colon-separated list. Empty entries mean the current directory.
    pub fn parse(list: &str) -> Self {
        let roots = list
            .split(':')
            .map(|s| {
                if s.is_empty() {
                    Utf8PathBuf::from(".")
                } else {
                    Utf8PathBuf::from(s)
                }
            })
            .collect();
        Self { roots }
    }

    /// Reads `SRCFABPATH`, falling back to `~/.srcfab`.
    pub fn from_env() -> Result<Self, ToolchainError> {
        match std::env::var(SEARCH_PATH_ENV) {
            Ok(v) if !v.is_empty() => Ok(Self::parse(&v)),
            _ => Self::default_path()
                .map(|p| Self::new(vec![p]))
                .ok_or(ToolchainError::EmptySearchPath),
        }
    }

    /// `~/.srcfab`, if the home directory is known and UTF-8.
    pub fn default_path() -> Option<Utf8PathBuf> {
        let home = dirs::home_dir()?;
        let home = Utf8PathBuf::from_path_buf(home).ok()?;
        Some(home.join(DEFAULT_ROOT_NAME))
    }

    pub fn roots(&self) -> &[Utf8PathBuf] {
        &self.roots
    }

    pub fn first(&self) -> Result<&Utf8Path, ToolchainError> {
        self.roots
            .first()
            .map(Utf8PathBuf::as_path)
            .ok_or(ToolchainError::EmptySearchPath)
    }
}

impl std::fmt::Display for SearchPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<&str> = self.roots.iter().map(|r| r.as_str()).collect();
        f.write_str(&parts.join(":"))
    }
}

/// Lexically cleans a toolchain path, rejecting absolute paths and `..`.
pub(crate) fn clean_toolchain_path(path: &str) -> Result<String, ToolchainError> {
    let invalid = || ToolchainError::InvalidPath {
        path: path.to_string(),
    };
    if path.starts_with('/') {
        return Err(invalid());
    }
    let mut parts = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => return Err(invalid()),
            s => parts.push(s),
        }
    }
    if parts.is_empty() {
        return Err(invalid());
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_order_and_maps_empty_to_cwd() {
        let sp = SearchPath::parse("/a::/b");
        assert_eq!(
            sp.roots(),
            &[
                Utf8PathBuf::from("/a"),
                Utf8PathBuf::from("."),
                Utf8PathBuf::from("/b")
            ]
        );
        assert_eq!(sp.first().unwrap(), "/a");
        assert_eq!(sp.to_string(), "/a:.:/b");
    }

    #[test]
    fn empty_search_path_has_no_first_root() {
        assert!(matches!(
            SearchPath::default().first(),
            Err(ToolchainError::EmptySearchPath)
        ));
    }

    #[test]
    fn clean_path_normalizes_and_rejects_escapes() {
        assert_eq!(
            clean_toolchain_path("github.com//acme/./tc/").unwrap(),
            "github.com/acme/tc"
        );
        assert!(clean_toolchain_path("../tc").is_err());
        assert!(clean_toolchain_path("/abs").is_err());
        assert!(clean_toolchain_path(".").is_err());
    }
}
