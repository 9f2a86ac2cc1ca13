//! Resume cursor persisted as a plain-text file

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Durable cursor: the number of top-level locations fully handled so far.
///
/// Stored as a single plain-text integer.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored position. A missing or unreadable file means a first run.
    pub fn load(&self) -> u64 {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Replace the stored position.
    ///
    /// Writes a sibling temp file and renames it over the old one, so a crash
    /// mid-write leaves the previous value readable.
    pub fn save(&self, position: u64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create checkpoint directory")?;
            }
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, position.to_string())
            .with_context(|| format!("Failed to write checkpoint: {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace checkpoint: {:?}", self.path))?;

        Ok(())
    }

    /// Forget all progress
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove checkpoint: {:?}", self.path))?;
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "checkpoint".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_zero() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.txt"));
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("nested/checkpoint.txt"));
        store.save(17).unwrap();
        assert_eq!(store.load(), 17);
        store.save(18).unwrap();
        assert_eq!(store.load(), 18);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "18");
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn test_garbage_loads_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checkpoint.txt");
        fs::write(&path, "not a number").unwrap();
        assert_eq!(CheckpointStore::new(&path).load(), 0);

        fs::write(&path, " 42\n").unwrap();
        assert_eq!(CheckpointStore::new(&path).load(), 42);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.txt"));
        store.clear().unwrap();
        store.save(3).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), 0);
    }
}
