//! The vendoring pipeline.
//!
//! ```text
//! modules.txt -> parse -> collect candidates -> filter by usage -> copy
//! ```
//!
//! Every phase finishes for all modules before the next one starts, so a
//! module that cannot be resolved stops the run before anything is copied.

use crate::collect::collect_candidates;
use crate::config::Settings;
use crate::copy::vendor_module;
use crate::error::{Result, VendorError};
use crate::filter::filter_module;
use crate::manifest::{ModuleRecord, ParseOptions, load_manifest};
use crate::modcache::ModCache;
use crate::ui;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

/// Outcome of a successful run.
#[derive(Debug)]
pub struct VendorReport {
    pub modules: Vec<ModuleRecord>,
    /// Entries copied per module, parallel to `modules`.
    pub copied: Vec<usize>,
}

impl VendorReport {
    pub fn total(&self) -> usize {
        self.copied.iter().sum()
    }
}

/// Fails unless the project marker and the manifest are present.
pub fn check_preconditions(settings: &Settings) -> Result<()> {
    if !settings.project_file().exists() {
        return Err(VendorError::MissingProjectFile(settings.root.clone()));
    }
    let manifest = settings.manifest_path();
    if !manifest.exists() {
        return Err(VendorError::MissingManifest(manifest));
    }
    Ok(())
}

/// Parses the manifest and computes the confirmed file set of every module.
/// Nothing is written to disk.
pub fn plan(settings: &Settings, cache: &ModCache) -> Result<Vec<ModuleRecord>> {
    check_preconditions(settings)?;

    let opts = ParseOptions {
        full_copy: settings.full_copy,
        extra_includes: settings.extra_includes.clone(),
        cache: cache.clone(),
        base_dir: settings.root.clone(),
    };
    let mut modules = load_manifest(&settings.manifest_path(), &opts)?;
    info!(
        "parsed {} modules from {}",
        modules.len(),
        settings.manifest_path().display()
    );

    for module in &mut modules {
        module.vendor_set = collect_candidates(&settings.copy_patterns, &module.dir)?;
    }
    for module in &mut modules {
        let candidates = module.vendor_set.candidate_count();
        filter_module(module);
        debug!(
            "{}: {} of {} candidates used",
            module.import_path,
            module.vendor_set.confirmed_count(),
            candidates
        );
    }
    Ok(modules)
}

/// Runs the whole pipeline and copies the result into `vendor/`.
pub fn run(settings: &Settings, cache: &ModCache) -> Result<VendorReport> {
    debug!("module cache: {}", cache.root().display());
    let modules = plan(settings, cache)?;

    let total: usize = modules.iter().map(|m| m.vendor_set.confirmed_count()).sum();
    println!(
        "{} Vendoring {} entries from {} modules to ./vendor...",
        "📦".blue(),
        total,
        modules.len()
    );

    let bar = if settings.verbose {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("   {bar:30.green} {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    };

    let vendor_dir = settings.vendor_dir();
    let mut copied = Vec::with_capacity(modules.len());
    for module in &modules {
        let count = vendor_module(module, &vendor_dir, |local| {
            if settings.verbose {
                println!("vendoring {}", local);
            }
            bar.set_message(local.to_string());
            bar.inc(1);
        })?;
        copied.push(count);
    }
    bar.finish_and_clear();

    let report = VendorReport { modules, copied };
    if settings.verbose {
        ui::print_summary(&report.modules, &report.copied);
    }
    println!("{} Vendor complete ({} entries).", "✓".green(), report.total());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliOverrides, FileConfig};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn settings(root: &Path, copy: &str, fullcopy: bool) -> Settings {
        Settings::resolve(
            root.to_path_buf(),
            FileConfig::default(),
            CliOverrides {
                copy: Some(copy.to_string()),
                fullcopy: Some(fullcopy),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_missing_go_mod_is_reported() {
        let tmp = TempDir::new().unwrap();
        let err = check_preconditions(&settings(tmp.path(), "", true)).unwrap_err();
        assert!(matches!(err, VendorError::MissingProjectFile(_)));
    }

    #[test]
    fn test_missing_manifest_is_reported() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("go.mod"), "module x\n").unwrap();
        let err = check_preconditions(&settings(tmp.path(), "", true)).unwrap_err();
        match err {
            VendorError::MissingManifest(path) => {
                assert_eq!(path, tmp.path().join("vendor").join("modules.txt"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_plan_filters_by_used_packages() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("mod");
        let project = tmp.path().join("project");
        let dir: PathBuf = ModCache::new(&cache).resolve("example.com/a", "v1.0.0");
        fs::create_dir_all(dir.join("used")).unwrap();
        fs::create_dir_all(dir.join("unused")).unwrap();
        fs::write(dir.join("used/u.h"), "").unwrap();
        fs::write(dir.join("unused/n.h"), "").unwrap();

        fs::create_dir_all(project.join("vendor")).unwrap();
        fs::write(project.join("go.mod"), "module p\n").unwrap();
        fs::write(
            project.join("vendor/modules.txt"),
            "# example.com/a v1.0.0\nexample.com/a/used\n",
        )
        .unwrap();

        let modules = plan(&settings(&project, "**/*.h", false), &ModCache::new(&cache)).unwrap();
        let kept: Vec<&PathBuf> = modules[0].vendor_set.confirmed().collect();
        assert_eq!(kept, vec![&dir.join("used/u.h")]);

        let modules = plan(&settings(&project, "**/*.h", true), &ModCache::new(&cache)).unwrap();
        assert_eq!(modules[0].vendor_set.confirmed_count(), 2);
    }
}
