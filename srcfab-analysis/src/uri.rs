use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("make repo URI: empty clone URL")]
    Empty,

    #[error("make repo URI from {value:?}: {source}")]
    Parse {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Canonical repository URI for a clone URL.
///
/// `https://GitHub.com/acme/lib.git/` becomes `github.com/acme/lib`. Values
/// without a scheme are already URIs and only have their path cleaned.
pub fn try_make_uri(clone_url: &str) -> Result<String, UriError> {
    if clone_url.is_empty() {
        return Err(UriError::Empty);
    }

    let (host, path) = if clone_url.contains("://") {
        let url = Url::parse(clone_url).map_err(|source| UriError::Parse {
            value: clone_url.to_string(),
            source,
        })?;
        (
            url.host_str().unwrap_or_default().to_lowercase(),
            url.path().to_string(),
        )
    } else {
        (String::new(), clone_url.to_string())
    };

    let path = path.strip_suffix(".git").unwrap_or(&path);
    let path = clean_path(path);
    let path = path.trim_end_matches('/');
    if path == "." {
        return Ok(host);
    }
    Ok(format!("{host}{path}"))
}

/// Lexical path cleaning: collapses separators, `.` and `..` segments.
fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let rooted = path.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
