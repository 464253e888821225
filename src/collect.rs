//! Candidate file collection.
//!
//! Each copy pattern is cleaned like a path joined onto the module directory
//! (`./include/` and `include` are the same pattern) and matched against the
//! paths below it.
//! The empty pattern is special: it selects every entry of the module,
//! directories included, starting with the module root itself.

use crate::error::{Result, VendorError};
use globset::{GlobBuilder, GlobMatcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One entry of the `--copy` list.
#[derive(Debug, Clone)]
pub enum CopyPattern {
    /// Empty pattern: no glob restriction.
    Everything,
    /// A pattern that cleans down to the module directory itself (`./`, `/`).
    Root { source: String },
    Glob { source: String, matcher: GlobMatcher },
}

impl CopyPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self::Everything);
        }
        let cleaned = clean_pattern(pattern);
        if cleaned.is_empty() {
            return Ok(Self::Root {
                source: pattern.to_string(),
            });
        }
        let glob = GlobBuilder::new(&cleaned)
            .literal_separator(true)
            .build()
            .map_err(|source| VendorError::Glob {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self::Glob {
            source: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Everything => "",
            Self::Root { source } | Self::Glob { source, .. } => source,
        }
    }
}

/// Lexically cleans a pattern so it reads as a path relative to the module
/// directory: leading `/` and `.` segments are dropped, `..` removes the
/// previous segment and trailing separators are trimmed.
fn clean_pattern(pattern: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in pattern.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// The compiled, non-empty list of copy patterns.
#[derive(Debug, Clone)]
pub struct CopyPatterns(Vec<CopyPattern>);

impl CopyPatterns {
    /// Parses the space-separated `--copy` value. A blank value becomes the
    /// single empty pattern, i.e. copy everything.
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_list(value.trim().split(' '))
    }

    pub fn from_list<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|p| CopyPattern::new(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if compiled.is_empty() {
            return Err(VendorError::EmptyCopyPattern);
        }
        Ok(Self(compiled))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CopyPattern> {
        self.0.iter()
    }

    fn has_globs(&self) -> bool {
        self.0.iter().any(|p| matches!(p, CopyPattern::Glob { .. }))
    }

    fn has_everything(&self) -> bool {
        self.0.iter().any(|p| matches!(p, CopyPattern::Everything))
    }

    fn has_root(&self) -> bool {
        self.0.iter().any(|p| matches!(p, CopyPattern::Root { .. }))
    }
}

/// Files selected for a module, in two phases: every glob match starts as a
/// candidate and becomes confirmed once it is known to be used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorSet {
    candidates: BTreeSet<PathBuf>,
    confirmed: BTreeSet<PathBuf>,
}

impl VendorSet {
    pub fn add_candidate(&mut self, path: PathBuf) {
        self.candidates.insert(path);
    }

    /// Marks a candidate as used. Paths that were never candidates are ignored.
    pub fn confirm(&mut self, path: &Path) -> bool {
        if self.candidates.contains(path) {
            self.confirmed.insert(path.to_path_buf());
            true
        } else {
            false
        }
    }

    pub fn is_confirmed(&self, path: &Path) -> bool {
        self.confirmed.contains(path)
    }

    pub fn candidates(&self) -> impl Iterator<Item = &PathBuf> {
        self.candidates.iter()
    }

    pub fn confirmed(&self) -> impl Iterator<Item = &PathBuf> {
        self.confirmed.iter()
    }

    /// Drops every candidate that was not confirmed.
    pub fn prune(&mut self) {
        self.candidates = self.confirmed.clone();
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn confirmed_count(&self) -> usize {
        self.confirmed.len()
    }
}

/// Builds the candidate set of the module rooted at `dir`.
pub fn collect_candidates(patterns: &CopyPatterns, dir: &Path) -> Result<VendorSet> {
    let mut set = VendorSet::default();

    if patterns.has_everything() {
        for path in list_all_entries(dir)? {
            set.add_candidate(path);
        }
    }

    if patterns.has_root() {
        set.add_candidate(dir.to_path_buf());
    }

    if patterns.has_globs() {
        for entry in WalkDir::new(dir).follow_links(true).min_depth(1) {
            let entry = entry.map_err(|source| VendorError::Enumerate {
                dir: dir.to_path_buf(),
                source,
            })?;
            let Ok(relative) = entry.path().strip_prefix(dir) else {
                continue;
            };
            let matched = patterns.iter().any(|p| match p {
                CopyPattern::Glob { matcher, .. } => matcher.is_match(relative),
                CopyPattern::Everything | CopyPattern::Root { .. } => false,
            });
            if matched {
                set.add_candidate(entry.into_path());
            }
        }
    }

    Ok(set)
}

/// Every file and directory below `dir`, following symbolic links, with
/// `dir` itself first.
pub fn list_all_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .map(|entry| {
            entry.map(walkdir::DirEntry::into_path).map_err(|source| {
                VendorError::Enumerate {
                    dir: dir.to_path_buf(),
                    source,
                }
            })
        })
        .collect()
}
