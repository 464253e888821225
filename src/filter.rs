//! Usage filtering.
//!
//! A candidate is kept when its path starts with `dir + suffix` for some used
//! package, where `suffix` is the package import path with the module import
//! path removed from its front. This is a plain string prefix test that relies
//! on the module tree mirroring its import paths.

use crate::manifest::ModuleRecord;
use std::path::PathBuf;

/// Part of `package` below `module`, or `""` when `package` is not inside it.
pub fn import_path_suffix<'a>(module: &str, package: &'a str) -> &'a str {
    package.strip_prefix(module).unwrap_or("")
}

/// Directory prefixes (as strings) that mark a candidate as used.
fn used_prefixes(module: &ModuleRecord) -> Vec<String> {
    let dir = module.dir.to_string_lossy();
    module
        .used_subpaths
        .iter()
        .map(|pkg| format!("{}{}", dir, import_path_suffix(&module.import_path, pkg)))
        .collect()
}

/// Confirms the candidates that lie under a used package and drops the rest.
/// A module without used packages ends up with an empty set.
pub fn filter_module(module: &mut ModuleRecord) {
    let prefixes = used_prefixes(module);
    let used: Vec<PathBuf> = module
        .vendor_set
        .candidates()
        .filter(|path| {
            let path = path.to_string_lossy();
            prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
        })
        .cloned()
        .collect();

    for path in &used {
        module.vendor_set.confirm(path);
    }
    module.vendor_set.prune();
}
