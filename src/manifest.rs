//! `vendor/modules.txt` parsing.
//!
//! The manifest is line oriented. Lines starting with `#` are module headers:
//!
//! ```text
//! # <path> <version>
//! # <path> <version> => <path2> <version2>
//! # <path> <version> => ./local/path
//! ```
//!
//! Every other line names a package of the most recent module that the
//! project imports. Parsing is a fold over the lines: each line turns one
//! [`ParseState`] into the next.

use crate::collect::VendorSet;
use crate::error::{Result, VendorError};
use crate::modcache::ModCache;
use log::debug;
use std::fs;
use std::path::{Component, Path, PathBuf};

const COMMENT_MARKER: char = '#';
const REDIRECT_ARROW: &str = "=>";
const EXPLICIT_MARKER: &str = "explicit";

/// One dependency module and the packages the project uses from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRecord {
    pub import_path: String,
    /// Replacement target, empty when the module is not replaced.
    pub source_path: String,
    pub version: String,
    /// Empty when there is no replacement or it points to a local directory.
    pub source_version: String,
    /// Absolute path of the module source tree.
    pub dir: PathBuf,
    /// Import paths of used packages, or just `import_path` in full-copy mode.
    pub used_subpaths: Vec<String>,
    pub vendor_set: VendorSet,
}

impl ModuleRecord {
    pub fn is_replaced(&self) -> bool {
        !self.source_path.is_empty()
    }

    /// Human readable origin, used for reporting.
    pub fn origin(&self) -> String {
        if !self.is_replaced() {
            "cache".to_string()
        } else if self.source_version.is_empty() {
            format!("=> {}", self.source_path)
        } else {
            format!("=> {}@{}", self.source_path, self.source_version)
        }
    }
}

/// Inputs that influence how headers are resolved.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub full_copy: bool,
    pub extra_includes: Vec<String>,
    pub cache: ModCache,
    /// Directory that relative replace targets are resolved against.
    pub base_dir: PathBuf,
}

/// Recognized header shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Header<'a> {
    Module {
        path: &'a str,
        version: &'a str,
    },
    ModuleReplace {
        path: &'a str,
        version: &'a str,
        target: &'a str,
        target_version: &'a str,
    },
    LocalReplace {
        path: &'a str,
        version: &'a str,
        target: &'a str,
    },
}

/// Returns `None` for headers that carry no module to vendor
/// (`## explicit`, `# path => target`, malformed token counts).
fn classify_header(line: &str) -> Option<Header<'_>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if !matches!(tokens.len(), 3 | 5 | 6) || tokens[1] == EXPLICIT_MARKER {
        return None;
    }
    if tokens[2] == REDIRECT_ARROW {
        return None;
    }

    let (path, version) = (tokens[1], tokens[2]);
    match tokens.len() {
        3 => Some(Header::Module { path, version }),
        5 if tokens[3] == REDIRECT_ARROW && is_local_path(tokens[4]) => {
            Some(Header::LocalReplace {
                path,
                version,
                target: tokens[4],
            })
        }
        6 if tokens[3] == REDIRECT_ARROW => Some(Header::ModuleReplace {
            path,
            version,
            target: tokens[4],
            target_version: tokens[5],
        }),
        _ => None,
    }
}

fn is_local_path(target: &str) -> bool {
    target.starts_with('.') || target.starts_with('/')
}

/// Running state of the line fold: the record still receiving package lines
/// and the records already closed.
#[derive(Debug, Default)]
pub struct ParseState {
    current: Option<ModuleRecord>,
    completed: Vec<ModuleRecord>,
}

impl ParseState {
    pub fn step(mut self, line: &str, opts: &ParseOptions) -> Result<Self> {
        let line = line.trim_end();
        if line.is_empty() {
            return Ok(self);
        }

        if line.starts_with(COMMENT_MARKER) {
            let Some(header) = classify_header(line) else {
                debug!("skipping manifest header {:?}", line);
                return Ok(self);
            };
            let record = open_record(header, opts)?;
            if let Some(done) = self.current.replace(record) {
                self.completed.push(done);
            }
            return Ok(self);
        }

        if !opts.full_copy {
            match self.current.as_mut() {
                Some(record) => record.used_subpaths.push(line.to_string()),
                None => debug!("package line {:?} precedes any module header", line),
            }
        }
        Ok(self)
    }

    pub fn finish(mut self) -> Vec<ModuleRecord> {
        if let Some(done) = self.current.take() {
            self.completed.push(done);
        }
        self.completed
    }
}

fn open_record(header: Header<'_>, opts: &ParseOptions) -> Result<ModuleRecord> {
    let mut record = match header {
        Header::Module { path, version } => ModuleRecord {
            import_path: path.to_string(),
            version: version.to_string(),
            dir: opts.cache.resolve(path, version),
            ..Default::default()
        },
        Header::ModuleReplace {
            path,
            version,
            target,
            target_version,
        } => ModuleRecord {
            import_path: path.to_string(),
            source_path: target.to_string(),
            version: version.to_string(),
            source_version: target_version.to_string(),
            dir: opts.cache.resolve(target, target_version),
            ..Default::default()
        },
        Header::LocalReplace {
            path,
            version,
            target,
        } => ModuleRecord {
            import_path: path.to_string(),
            source_path: target.to_string(),
            version: version.to_string(),
            dir: absolutize(&opts.base_dir, target)?,
            ..Default::default()
        },
    };

    if !record.dir.exists() {
        return Err(VendorError::ModuleDirMissing {
            import_path: record.import_path,
            dir: record.dir,
        });
    }

    for include in &opts.extra_includes {
        if include.starts_with(&record.import_path) {
            record.used_subpaths.push(include.clone());
        }
    }
    if opts.full_copy {
        record.used_subpaths.push(record.import_path.clone());
    }

    debug!(
        "module {} {} resolved to {}",
        record.import_path,
        record.version,
        record.dir.display()
    );
    Ok(record)
}

/// Absolute, lexically cleaned form of `target` relative to `base`.
fn absolutize(base: &Path, target: &str) -> Result<PathBuf> {
    let joined = std::path::absolute(base.join(target)).map_err(|e| {
        VendorError::InvalidLocalPath {
            path: target.to_string(),
            reason: e.to_string(),
        }
    })?;

    let mut cleaned = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    Ok(cleaned)
}

/// Parses manifest text into module records, in manifest order.
pub fn parse_manifest(text: &str, opts: &ParseOptions) -> Result<Vec<ModuleRecord>> {
    text.lines()
        .try_fold(ParseState::default(), |state, line| state.step(line, opts))
        .map(ParseState::finish)
}

pub fn load_manifest(path: &Path, opts: &ParseOptions) -> Result<Vec<ModuleRecord>> {
    let text = fs::read_to_string(path).map_err(|source| VendorError::ReadManifest {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&text, opts)
}
