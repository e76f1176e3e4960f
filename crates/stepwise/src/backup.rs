//! Timestamped backups of user state about to be overwritten
//!
//! Each run gets one `<timestamp>` directory under the backup root. The
//! directory is only created when the first file is captured, so a run
//! that overwrites nothing leaves the filesystem untouched. Backups are
//! never deleted by the runner.

use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::BackupRecord;

/// Format of backup directory names
pub const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Backup location for one run
#[derive(Debug)]
pub struct BackupStore {
    root: PathBuf,
    base: PathBuf,
    stamp: String,
}

impl BackupStore {
    /// Create a store stamped with the current time
    ///
    /// `base` is stripped from captured paths so a backup of
    /// `~/.config/nvim/init.lua` lands at `<stamp>/.config/nvim/init.lua`.
    pub fn new(root: impl Into<PathBuf>, base: impl Into<PathBuf>) -> Self {
        Self::with_stamp(root, base, Utc::now().format(STAMP_FORMAT).to_string())
    }

    pub fn with_stamp(
        root: impl Into<PathBuf>,
        base: impl Into<PathBuf>,
        stamp: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            base: base.into(),
            stamp: stamp.into(),
        }
    }

    /// Directory this run's backups go into
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.stamp)
    }

    /// Copy `original` into the backup directory and verify the copy
    pub fn capture(&self, original: &Path) -> Result<BackupRecord> {
        let fail = |message: String| Error::Backup {
            path: original.to_path_buf(),
            message,
        };

        let meta = fs::symlink_metadata(original).map_err(|e| fail(e.to_string()))?;
        let dest = unique_path(&self.dir().join(self.relative(original)));

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                fail(format!(
                    "cannot create backup directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        if meta.is_dir() {
            copy_tree(original, &dest).map_err(fail)?;
        } else {
            copy_verified(original, &dest).map_err(fail)?;
        }

        log::info!("Backed up {} to {}", original.display(), dest.display());
        Ok(BackupRecord {
            original: original.to_path_buf(),
            backup: dest,
        })
    }

    fn relative(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.base) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => path
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect(),
        }
    }
}

/// Whether `path` holds user state that must be captured before overwrite
///
/// Missing paths and symlinks carry no content of their own. Any other
/// error means the path could not be inspected and is returned as is.
pub fn needs_backup(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(!meta.file_type().is_symlink()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// A backup directory from a previous run
#[derive(Debug, Clone)]
pub struct BackupSet {
    pub stamp: String,
    pub path: PathBuf,
    pub files: usize,
}

/// List backup directories under `root`, oldest first
pub fn list(root: &Path) -> Result<Vec<BackupSet>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut sets = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path();
        let files = WalkDir::new(&path)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| !e.file_type().is_dir())
            .count();
        sets.push(BackupSet {
            stamp: entry.file_name().to_string_lossy().to_string(),
            path,
            files,
        });
    }
    sets.sort_by(|a, b| a.stamp.cmp(&b.stamp));
    Ok(sets)
}

/// Append `.1`, `.2`, ... until the path is free
fn unique_path(path: &Path) -> PathBuf {
    if fs::symlink_metadata(path).is_err() {
        return path.to_path_buf();
    }
    let mut n = 1;
    loop {
        let mut candidate = path.as_os_str().to_owned();
        candidate.push(format!(".{n}"));
        let candidate = PathBuf::from(candidate);
        if fs::symlink_metadata(&candidate).is_err() {
            return candidate;
        }
        n += 1;
    }
}

fn copy_verified(from: &Path, to: &Path) -> std::result::Result<(), String> {
    fs::copy(from, to).map_err(|e| format!("copy to {} failed: {e}", to.display()))?;

    let original = hash_file(from)?;
    let copy = hash_file(to)?;
    if original != copy {
        return Err(format!(
            "copy at {} does not match the original",
            to.display()
        ));
    }
    Ok(())
}

fn hash_file(path: &Path) -> std::result::Result<blake3::Hash, String> {
    let file = fs::File::open(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mut hasher = blake3::Hasher::new();
    hasher
        .update_reader(file)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(hasher.finalize())
}

fn copy_tree(from: &Path, to: &Path) -> std::result::Result<(), String> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| e.to_string())?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| e.to_string())?;
        let dest = to.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&dest)
                .map_err(|e| format!("cannot create {}: {e}", dest.display()))?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path()).map_err(|e| e.to_string())?;
            copy_link(&link, &dest)?;
        } else {
            copy_verified(entry.path(), &dest)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_link(link: &Path, dest: &Path) -> std::result::Result<(), String> {
    std::os::unix::fs::symlink(link, dest)
        .map_err(|e| format!("cannot recreate link {}: {e}", dest.display()))
}

#[cfg(not(unix))]
fn copy_link(link: &Path, dest: &Path) -> std::result::Result<(), String> {
    Err(format!(
        "cannot back up symlink {} -> {} on this platform",
        dest.display(),
        link.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> BackupStore {
        BackupStore::with_stamp(
            tmp.path().join("backups"),
            tmp.path().join("home"),
            "20260101-000000",
        )
    }

    #[test]
    fn test_capture_file_under_base() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        fs::create_dir_all(home.join(".config/nvim")).unwrap();
        let original = home.join(".config/nvim/init.lua");
        fs::write(&original, "set number").unwrap();

        let record = store(&tmp).capture(&original).unwrap();

        assert_eq!(
            record.backup,
            tmp.path()
                .join("backups/20260101-000000/.config/nvim/init.lua")
        );
        assert_eq!(fs::read_to_string(&record.backup).unwrap(), "set number");
        // the original is left alone; overwriting it is the step's job
        assert!(original.exists());
    }

    #[test]
    fn test_capture_twice_keeps_both() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).unwrap();
        let original = home.join(".zshrc");
        let store = store(&tmp);

        fs::write(&original, "first").unwrap();
        let first = store.capture(&original).unwrap();
        fs::write(&original, "second").unwrap();
        let second = store.capture(&original).unwrap();

        assert_ne!(first.backup, second.backup);
        assert!(second.backup.to_string_lossy().ends_with(".zshrc.1"));
        assert_eq!(fs::read_to_string(first.backup).unwrap(), "first");
        assert_eq!(fs::read_to_string(second.backup).unwrap(), "second");
    }

    #[test]
    fn test_capture_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("home/.config/tmux");
        fs::create_dir_all(dir.join("plugins")).unwrap();
        fs::write(dir.join("tmux.conf"), "set -g mouse on").unwrap();
        fs::write(dir.join("plugins/tpm"), "x").unwrap();

        let record = store(&tmp).capture(&dir).unwrap();

        assert_eq!(
            fs::read_to_string(record.backup.join("tmux.conf")).unwrap(),
            "set -g mouse on"
        );
        assert!(record.backup.join("plugins/tpm").exists());
    }

    #[test]
    fn test_capture_missing_is_backup_error() {
        let tmp = TempDir::new().unwrap();
        let err = store(&tmp)
            .capture(&tmp.path().join("home/.nope"))
            .unwrap_err();
        assert!(matches!(err, Error::Backup { .. }));
        assert!(!tmp.path().join("backups").exists());
    }

    #[test]
    fn test_outside_base_keeps_full_path() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert_eq!(
            store.relative(Path::new("/etc/pacman.conf")),
            PathBuf::from("etc/pacman.conf")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_needs_backup() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file");
        let link = tmp.path().join("link");
        fs::write(&file, "x").unwrap();
        std::os::unix::fs::symlink(&file, &link).unwrap();

        assert!(needs_backup(&file).unwrap());
        assert!(!needs_backup(&link).unwrap());
        assert!(!needs_backup(&tmp.path().join("missing")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_needs_backup_reports_unreadable_paths() {
        let tmp = TempDir::new().unwrap();
        std::os::unix::fs::symlink("loop", tmp.path().join("loop")).unwrap();

        assert!(needs_backup(&tmp.path().join("loop/.zshrc")).is_err());
    }

    #[test]
    fn test_list_on_a_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("backups");
        fs::write(&root, "not a directory").unwrap();

        assert!(matches!(list(&root), Err(Error::Io(_))));
    }

    #[test]
    fn test_list_sets() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("backups");
        fs::create_dir_all(root.join("20260102-000000/a")).unwrap();
        fs::create_dir_all(root.join("20260101-000000")).unwrap();
        fs::write(root.join("20260102-000000/a/one"), "1").unwrap();
        fs::write(root.join("20260102-000000/two"), "2").unwrap();

        let sets = list(&root).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].stamp, "20260101-000000");
        assert_eq!(sets[0].files, 0);
        assert_eq!(sets[1].files, 2);
    }

    #[test]
    fn test_list_missing_root() {
        let tmp = TempDir::new().unwrap();
        assert!(list(&tmp.path().join("none")).unwrap().is_empty());
    }
}
