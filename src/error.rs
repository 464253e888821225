//! Error taxonomy for the vendoring pipeline.
//!
//! Every variant is fatal: the pipeline never recovers locally, it returns the
//! first error to the caller and leaves the decision to exit to the binary.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VendorError>;

#[derive(Error, Debug)]
pub enum VendorError {
    #[error("cannot find `go.mod` in {0}")]
    MissingProjectFile(PathBuf),

    #[error("cannot find {0}, first run `go mod vendor` and try again")]
    MissingManifest(PathBuf),

    #[error("unable to read {path}: {source}")]
    ReadManifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("copy pattern list is empty, nothing to copy")]
    EmptyCopyPattern,

    #[error("invalid local replace path {path:?}: {reason}")]
    InvalidLocalPath { path: String, reason: String },

    #[error("module path {dir} does not exist (import path {import_path}), check the module cache")]
    ModuleDirMissing { import_path: String, dir: PathBuf },

    #[error("glob pattern {pattern:?} is invalid: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to list {dir}: {source}")]
    Enumerate {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("vendor file {file} does not belong to module dir {dir}")]
    ForeignFile { file: PathBuf, dir: PathBuf },

    #[error("unable to create directory {dir}: {source}")]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to copy {src} to {dst}: {source}")]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
