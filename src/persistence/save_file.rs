//! On-disk save file with a one-step backup
//!
//! A write goes to a staging file next to the target, which is flushed and
//! renamed over the target. The target is never removed first, so a crash
//! leaves either the old or the new contents in place. The contents being
//! replaced are copied to `<name>.bak` beforehand.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub(crate) struct SaveFile<'a> {
    path: &'a Path,
}

impl<'a> SaveFile<'a> {
    pub(crate) fn new(path: &'a Path) -> Self {
        Self { path }
    }

    /// Previous contents, kept after each successful replace
    pub(crate) fn backup_path(&self) -> PathBuf {
        self.sibling("bak")
    }

    fn staging_path(&self) -> PathBuf {
        self.sibling("tmp")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "saves.json".into());
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Replace the file contents with `text`
    pub(crate) fn replace(&self, text: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();
        let result = Self::write_synced(&staging, text)
            .and_then(|()| self.keep_backup())
            .and_then(|()| fs::rename(&staging, self.path));
        if result.is_err() {
            let _ = fs::remove_file(&staging);
        }
        result
    }

    fn write_synced(path: &Path, text: &str) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()
    }

    fn keep_backup(&self) -> io::Result<()> {
        match fs::copy(self.path, self.backup_path()) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sky-climb-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_sibling_paths() {
        let file = SaveFile::new(Path::new("/tmp/a/saves.json"));
        assert_eq!(file.backup_path(), PathBuf::from("/tmp/a/saves.json.bak"));
        assert_eq!(file.staging_path(), PathBuf::from("/tmp/a/saves.json.tmp"));

        let bare = SaveFile::new(Path::new("x.json"));
        assert_eq!(bare.backup_path(), PathBuf::from("x.json.bak"));
    }

    #[test]
    fn test_first_write_has_no_backup() {
        let dir = scratch("first-write");
        let path = dir.join("saves.json");
        let file = SaveFile::new(&path);

        file.replace("one").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one");
        assert!(!file.backup_path().exists());
        assert!(!file.staging_path().exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_replace_keeps_previous_contents() {
        let dir = scratch("replace");
        let path = dir.join("saves.json");
        let file = SaveFile::new(&path);

        file.replace("one").unwrap();
        file.replace("two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
        assert_eq!(fs::read_to_string(file.backup_path()).unwrap(), "one");

        file.replace("three").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "three");
        assert_eq!(fs::read_to_string(file.backup_path()).unwrap(), "two");
        assert!(!file.staging_path().exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failed_replace_leaves_target_alone() {
        let dir = scratch("failed-replace");
        let path = dir.join("saves.json");
        let file = SaveFile::new(&path);
        file.replace("one").unwrap();

        // A directory where the staging file should go makes the write fail
        fs::create_dir_all(file.staging_path()).unwrap();
        assert!(file.replace("two").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "one");
        let _ = fs::remove_dir_all(&dir);
    }
}
