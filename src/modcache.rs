//! Module cache layout.
//!
//! Downloaded modules live under `<GOPATH>/pkg/mod/<path>@<version>`. Because
//! the cache must work on case-insensitive filesystems, every ASCII upper-case
//! character in the path or version is written as `!` followed by its
//! lower-case form (`github.com/Azure` -> `github.com/!azure`).

use std::env;
use std::path::{Path, PathBuf};

/// Escape marker placed in front of a lower-cased upper-case character.
pub const ESCAPE_MARKER: char = '!';

/// Escapes upper-case characters for use in a cache directory name.
pub fn encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            out.push(ESCAPE_MARKER);
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Read-only view of the module download cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModCache {
    root: PathBuf,
}

impl ModCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locates the cache the same way the go tool does: `GOMODCACHE`, then the
    /// first `GOPATH` entry, then `~/go`.
    pub fn discover() -> Self {
        let gomodcache = env::var_os("GOMODCACHE").filter(|v| !v.is_empty());
        let gopath = env::var_os("GOPATH").filter(|v| !v.is_empty());
        Self::new(cache_root(
            gomodcache.map(PathBuf::from),
            gopath.as_deref().and_then(|v| env::split_paths(v).next()),
            dirs::home_dir(),
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding `import_path` at `version`.
    pub fn resolve(&self, import_path: &str, version: &str) -> PathBuf {
        self.root
            .join(format!("{}@{}", encode(import_path), encode(version)))
    }
}

fn cache_root(
    gomodcache: Option<PathBuf>,
    gopath: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = gomodcache {
        return dir;
    }
    let gopath = gopath
        .or_else(|| home.map(|h| h.join("go")))
        .unwrap_or_else(|| PathBuf::from("go"));
    gopath.join("pkg").join("mod")
}
