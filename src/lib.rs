//! # modvendor - Selective Go module vendoring
//!
//! `go mod vendor` only copies the Go packages a project imports. Non-Go
//! assets such as C headers or `.proto` files are left behind. modvendor
//! copies the files matching a set of glob patterns from the module cache
//! into `./vendor/`, restricted to the packages listed in
//! `vendor/modules.txt`.
//!
//! ## Quick Start
//!
//! ```bash
//! go mod vendor
//! modvendor --copy="**/*.c **/*.h **/*.proto" --fullcopy=false -v
//! ```
//!
//! ## Module Organization
//!
//! - [`modcache`] - Module cache layout and path escaping
//! - [`manifest`] - `modules.txt` parsing
//! - [`collect`] - Glob matching of candidate files
//! - [`filter`] - Restricting candidates to used packages
//! - [`copy`] - Writing the vendor tree
//! - [`vendor`] - The full pipeline

/// Candidate file collection from copy patterns.
pub mod collect;

/// Project settings (`.modvendor.toml` and command line).
pub mod config;

/// Copying confirmed files into `vendor/`.
pub mod copy;

/// Error types.
pub mod error;

/// Usage filtering of candidates.
pub mod filter;

/// `vendor/modules.txt` parsing.
pub mod manifest;

/// Module cache paths.
pub mod modcache;

/// Terminal UI utilities (tables, colors).
pub mod ui;

/// End-to-end vendoring.
pub mod vendor;

pub use error::{Result, VendorError};
