//! Copying confirmed files into the vendor tree.
//!
//! A file at `<dir>/<rest>` lands at `<vendor>/<import path>/<rest>`. Copied
//! files get mode 0644 and created directories 0755, whatever the modes in the
//! module cache were, so two runs over the same inputs produce the same tree.

use crate::error::{Result, VendorError};
use crate::manifest::ModuleRecord;
use std::fs;
use std::path::{Path, PathBuf};

pub const FILE_MODE: u32 = 0o644;
pub const DIR_MODE: u32 = 0o755;

/// `import_path` followed by the part of `file` below the module directory.
pub fn local_path(module: &ModuleRecord, file: &Path) -> Result<String> {
    let dir = module.dir.to_string_lossy();
    let file_str = file.to_string_lossy();
    match file_str.strip_prefix(&*dir) {
        Some(rest) => Ok(format!("{}{}", module.import_path, rest.replace('\\', "/"))),
        None => Err(VendorError::ForeignFile {
            file: file.to_path_buf(),
            dir: module.dir.clone(),
        }),
    }
}

/// Copies every confirmed entry of `module` below `vendor_root`, calling
/// `on_entry` with the local path of each entry before it is copied.
pub fn vendor_module(
    module: &ModuleRecord,
    vendor_root: &Path,
    mut on_entry: impl FnMut(&str),
) -> Result<usize> {
    let mut copied = 0;
    for file in module.vendor_set.confirmed() {
        let local = local_path(module, file)?;
        on_entry(&local);

        let dest = vendor_root.join(&local);
        create_vendor_dirs(vendor_root, &local)?;
        copy_tree(file, &dest)?;
        copied += 1;
    }
    Ok(copied)
}

/// Copies a file, or a directory recursively, with normalized permissions.
/// Symbolic links are followed.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    let metadata = fs::metadata(src).map_err(|source| copy_error(src, dst, source))?;
    if !metadata.is_dir() {
        fs::copy(src, dst).map_err(|source| copy_error(src, dst, source))?;
        return set_mode(dst, FILE_MODE).map_err(|source| copy_error(src, dst, source));
    }

    create_dir_all(dst)?;
    let entries = fs::read_dir(src).map_err(|source| copy_error(src, dst, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| copy_error(src, dst, source))?;
        copy_tree(&entry.path(), &dst.join(entry.file_name()))?;
    }
    Ok(())
}

fn copy_error(src: &Path, dst: &Path, source: std::io::Error) -> VendorError {
    VendorError::Copy {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    }
}

/// Creates every directory between `vendor_root` and the parent of `local`,
/// each with [`DIR_MODE`]. `vendor_root` itself is left alone.
fn create_vendor_dirs(vendor_root: &Path, local: &str) -> Result<()> {
    let Some((parents, _)) = local.rsplit_once('/') else {
        return Ok(());
    };
    let mut dir = vendor_root.to_path_buf();
    for segment in parents.split('/') {
        dir.push(segment);
        create_dir_all(&dir)?;
    }
    Ok(())
}

/// Creates `dir` if needed and resets its mode, which the umask or an
/// earlier run may have left different.
fn create_dir_all(dir: &Path) -> Result<()> {
    let create_error = |source| VendorError::CreateDir {
        dir: PathBuf::from(dir),
        source,
    };
    fs::DirBuilder::new()
        .recursive(true)
        .create(dir)
        .map_err(create_error)?;
    set_mode(dir, DIR_MODE).map_err(create_error)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::VendorSet;
    use tempfile::TempDir;

    fn module_at(dir: &Path, files: &[PathBuf]) -> ModuleRecord {
        let mut set = VendorSet::default();
        for f in files {
            set.add_candidate(f.clone());
            set.confirm(f);
        }
        ModuleRecord {
            import_path: "example.com/a".to_string(),
            version: "v1.0.0".to_string(),
            dir: dir.to_path_buf(),
            vendor_set: set,
            ..Default::default()
        }
    }

    #[test]
    fn test_local_path_mirrors_import_path() {
        let m = module_at(Path::new("/cache/example.com/a@v1.0.0"), &[]);
        let local = local_path(&m, Path::new("/cache/example.com/a@v1.0.0/sub/x.go")).unwrap();
        assert_eq!(local, "example.com/a/sub/x.go");

        let root = local_path(&m, Path::new("/cache/example.com/a@v1.0.0")).unwrap();
        assert_eq!(root, "example.com/a");
    }

    #[test]
    fn test_local_path_rejects_foreign_file() {
        let m = module_at(Path::new("/cache/example.com/a@v1.0.0"), &[]);
        let err = local_path(&m, Path::new("/elsewhere/x.go")).unwrap_err();
        assert!(matches!(err, VendorError::ForeignFile { .. }));
    }

    #[test]
    fn test_vendor_module_copies_confirmed_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("mod");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("sub/x.go"), "package sub").unwrap();
        fs::write(dir.join("skip.go"), "package a").unwrap();

        let m = module_at(&dir, &[dir.join("sub/x.go")]);
        let vendor = tmp.path().join("vendor");
        let mut seen = Vec::new();
        let count = vendor_module(&m, &vendor, |local| seen.push(local.to_string())).unwrap();

        assert_eq!(count, 1);
        assert_eq!(seen, vec!["example.com/a/sub/x.go"]);
        assert_eq!(
            fs::read_to_string(vendor.join("example.com/a/sub/x.go")).unwrap(),
            "package sub"
        );
        assert!(!vendor.join("example.com/a/skip.go").exists());
    }

    #[test]
    fn test_copy_tree_copies_directories() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("inner")).unwrap();
        fs::write(src.join("inner/f.h"), "x").unwrap();

        let dst = tmp.path().join("dst");
        copy_tree(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst.join("inner/f.h")).unwrap(), "x");
    }

    #[cfg(unix)]
    #[test]
    fn test_copied_files_get_fixed_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("f.c");
        fs::write(&src, "int x;").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o400)).unwrap();

        let dst = tmp.path().join("out.c");
        copy_tree(&src, &dst).unwrap();
        let mode = fs::metadata(&dst).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, FILE_MODE);
    }

    #[cfg(unix)]
    #[test]
    fn test_vendor_dirs_get_fixed_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("mod");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("sub/x.go"), "package sub").unwrap();

        let vendor = tmp.path().join("vendor");
        let stale = vendor.join("example.com/a");
        fs::create_dir_all(&stale).unwrap();
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o700)).unwrap();

        let m = module_at(&dir, &[dir.join("sub/x.go")]);
        vendor_module(&m, &vendor, |_| {}).unwrap();

        for rel in ["example.com", "example.com/a", "example.com/a/sub"] {
            let mode = fs::metadata(vendor.join(rel)).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, DIR_MODE, "{rel}");
        }
    }

    #[test]
    fn test_blocked_vendor_dir_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("mod");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("x.go"), "package a").unwrap();

        let vendor = tmp.path().join("vendor");
        fs::create_dir_all(&vendor).unwrap();
        fs::write(vendor.join("example.com"), "not a directory").unwrap();

        let m = module_at(&dir, &[dir.join("x.go")]);
        let err = vendor_module(&m, &vendor, |_| {}).unwrap_err();
        match err {
            VendorError::CreateDir { dir, .. } => assert_eq!(dir, vendor.join("example.com")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_copy_overwrites_existing_destination() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.go");
        let dst = tmp.path().join("b.go");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();

        copy_tree(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }
}
