use crate::collect::CopyPatterns;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".modvendor.toml";
pub const PROJECT_FILE: &str = "go.mod";
pub const VENDOR_DIR: &str = "vendor";
pub const MANIFEST_FILE: &str = "modules.txt";

/// Optional per-project defaults.
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub copy: Option<Vec<String>>,
    pub fullcopy: Option<bool>,
    pub include: Option<Vec<String>>,
}

impl FileConfig {
    /// Reads `<root>/.modvendor.toml`, or returns defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Values given on the command line; `None` means not given.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub copy: Option<String>,
    pub fullcopy: Option<bool>,
    pub include: Option<String>,
    pub verbose: bool,
}

/// Fully merged settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub copy_patterns: CopyPatterns,
    pub full_copy: bool,
    pub verbose: bool,
    pub extra_includes: Vec<String>,
}

impl Settings {
    /// Command-line values win over the config file, field by field.
    pub fn resolve(root: PathBuf, file: FileConfig, cli: CliOverrides) -> Result<Self> {
        let copy_patterns = match (cli.copy, file.copy) {
            (Some(flag), _) => CopyPatterns::parse(&flag)?,
            (None, Some(list)) => CopyPatterns::from_list(list)?,
            (None, None) => CopyPatterns::parse("")?,
        };

        let extra_includes = match (cli.include, file.include) {
            (Some(flag), _) => split_includes(&flag),
            (None, Some(list)) => list.into_iter().filter(|s| !s.is_empty()).collect(),
            (None, None) => Vec::new(),
        };

        Ok(Self {
            root,
            copy_patterns,
            full_copy: cli.fullcopy.or(file.fullcopy).unwrap_or(true),
            verbose: cli.verbose,
            extra_includes,
        })
    }

    pub fn project_file(&self) -> PathBuf {
        self.root.join(PROJECT_FILE)
    }

    pub fn vendor_dir(&self) -> PathBuf {
        self.root.join(VENDOR_DIR)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.vendor_dir().join(MANIFEST_FILE)
    }
}

fn split_includes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::CopyPattern;
    use tempfile::TempDir;

    fn patterns(settings: &Settings) -> Vec<String> {
        settings
            .copy_patterns
            .iter()
            .map(|p| p.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_defaults_without_file_or_flags() {
        let s = Settings::resolve(
            PathBuf::from("/p"),
            FileConfig::default(),
            CliOverrides::default(),
        )
        .unwrap();
        assert!(s.full_copy);
        assert!(s.extra_includes.is_empty());
        assert!(matches!(
            s.copy_patterns.iter().next(),
            Some(CopyPattern::Everything)
        ));
        assert_eq!(s.manifest_path(), PathBuf::from("/p/vendor/modules.txt"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            copy: Some(vec!["**/*.proto".to_string()]),
            fullcopy: Some(false),
            include: Some(vec!["example.com/a/x".to_string()]),
        };
        let cli = CliOverrides {
            copy: Some("**/*.c **/*.h".to_string()),
            fullcopy: None,
            include: Some("example.com/b/y,,example.com/b/z".to_string()),
            verbose: true,
        };
        let s = Settings::resolve(PathBuf::from("/p"), file, cli).unwrap();

        assert_eq!(patterns(&s), vec!["**/*.c", "**/*.h"]);
        assert!(!s.full_copy);
        assert!(s.verbose);
        assert_eq!(s.extra_includes, vec!["example.com/b/y", "example.com/b/z"]);
    }

    #[test]
    fn test_empty_copy_list_in_file_is_rejected() {
        let file = FileConfig {
            copy: Some(Vec::new()),
            ..Default::default()
        };
        assert!(Settings::resolve(PathBuf::from("/p"), file, CliOverrides::default()).is_err());
    }

    #[test]
    fn test_load_reads_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "copy = [\"**/*.h\"]\nfullcopy = false\n",
        )
        .unwrap();

        let file = FileConfig::load(tmp.path()).unwrap();
        assert_eq!(file.copy, Some(vec!["**/*.h".to_string()]));
        assert_eq!(file.fullcopy, Some(false));
        assert_eq!(file.include, None);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(FileConfig::load(tmp.path()).unwrap(), FileConfig::default());
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "copyy = []\n").unwrap();
        assert!(FileConfig::load(tmp.path()).is_err());
    }
}
