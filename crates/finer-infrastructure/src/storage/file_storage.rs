//! File-backed durable storage, one file per key.
//!
//! Writes go to a temporary file in the same directory, are fsynced and
//! then renamed over the target, so a failed write never leaves a partly
//! written value behind. Credentials are created owner-only from the
//! first byte.

use finer_core::storage::{API_KEY_KEY, DurableStorage};
use finer_core::{FinerError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as IoWrite};
use std::path::{Path, PathBuf};

pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a storage rooted at `dir`. The directory is created lazily
    /// on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(FinerError::persistence(format!(
                "invalid storage key '{}'",
                key
            )));
        }
        Ok(self.dir.join(key))
    }

    fn write_atomic(&self, path: &Path, value: &str, private: bool) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "Path has no file name"))?;
        let tmp_path = self
            .dir
            .join(format!(".{}.tmp", file_name.to_string_lossy()));

        // A leftover temp file would keep its old mode.
        match fs::remove_file(&tmp_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            if private {
                options.mode(0o600);
            }
        }
        #[cfg(not(unix))]
        let _ = private;

        let mut tmp_file = options.open(&tmp_path)?;
        tmp_file.write_all(value.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }
}

impl DurableStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FinerError::persistence(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        self.write_atomic(&path, value, key == API_KEY_KEY)
            .map_err(|e| {
                FinerError::persistence(format!("failed to write {}: {}", path.display(), e))
            })?;

        tracing::debug!("[FileStorage] Wrote {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FinerError::persistence(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finer_core::storage::SESSION_STATE_KEY;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("nested"));

        assert_eq!(storage.get_item(SESSION_STATE_KEY).unwrap(), None);
        storage.set_item(SESSION_STATE_KEY, "{\"a\":1}").unwrap();
        assert_eq!(
            storage.get_item(SESSION_STATE_KEY).unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_overwrite_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.set_item("k", "one").unwrap();
        storage.set_item("k", "two").unwrap();

        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("two"));
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.set_item("k", "v").unwrap();
        storage.remove_item("k").unwrap();
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        assert!(storage.set_item("../escape", "x").is_err());
        assert!(storage.get_item("").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_api_key_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.set_item(API_KEY_KEY, "secret").unwrap();

        let mode = fs::metadata(temp_dir.path().join(API_KEY_KEY))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_api_key_ignores_leftover_temp_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let tmp_path = temp_dir.path().join(format!(".{}.tmp", API_KEY_KEY));
        fs::write(&tmp_path, "stale").unwrap();
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o644)).unwrap();

        let storage = FileStorage::new(temp_dir.path());
        storage.set_item(API_KEY_KEY, "secret").unwrap();

        let key_path = temp_dir.path().join(API_KEY_KEY);
        let mode = fs::metadata(&key_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(fs::read_to_string(key_path).unwrap(), "secret");
        assert!(!tmp_path.exists());
    }
}
