//! Persisted brightness level
//!
//! The only state surviving between invocations: one decimal integer in a
//! plain text file under the user's local data directory. A missing or corrupt
//! file falls back to the default level instead of failing.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};
use tracing::{debug, info, warn};

use crate::constants::paths;
use crate::error::{BrightnessError, Result};
use crate::level::BrightnessLevel;

#[derive(Debug, Clone)]
pub struct LevelStore {
    path: PathBuf,
}

/// Exclusive advisory lock on the state directory, released on drop
pub struct StateLock {
    _lock: Flock<File>,
    path: PathBuf,
}

impl Drop for StateLock {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "released state lock");
    }
}

impl LevelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.local/share/brightness_level` or the platform equivalent
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(paths::STATE_FILENAME);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(paths::LOCK_FILENAME)
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| BrightnessError::io(parent, e))?;
        }
        Ok(())
    }

    /// Block until no other invocation holds the lock
    pub fn lock(&self) -> Result<StateLock> {
        self.ensure_parent()?;
        let path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| BrightnessError::io(&path, e))?;
        let lock = Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, errno)| {
            BrightnessError::Lock {
                path: path.clone(),
                reason: errno.desc().to_string(),
            }
        })?;
        debug!(path = %path.display(), "acquired state lock");
        Ok(StateLock { _lock: lock, path })
    }

    /// Stored level, or the default when absent, unreadable or malformed
    pub fn load(&self) -> BrightnessLevel {
        match fs::read_to_string(&self.path) {
            Ok(contents) => match contents.parse::<BrightnessLevel>() {
                Ok(level) => {
                    debug!(path = %self.path.display(), level = %level, "loaded level");
                    level
                }
                Err(reason) => {
                    warn!(path = %self.path.display(), %reason, "corrupt state file, using default level");
                    BrightnessLevel::DEFAULT
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no state file yet, creating it with the default level");
                if let Err(e) = self.save(BrightnessLevel::DEFAULT) {
                    warn!(error = %e, "failed to create state file");
                }
                BrightnessLevel::DEFAULT
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable state file, using default level");
                BrightnessLevel::DEFAULT
            }
        }
    }

    /// Replace the stored level atomically (temp file + rename)
    pub fn save(&self, level: BrightnessLevel) -> Result<()> {
        self.ensure_parent()?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| paths::STATE_FILENAME.to_string());
        let tmp = self
            .path
            .with_file_name(format!(".{file_name}.{}.tmp", std::process::id()));

        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp)?;
            writeln!(file, "{level}")?;
            file.sync_all()
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(BrightnessError::io(&tmp, e));
        }
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            BrightnessError::io(&self.path, e)
        })?;

        debug!(path = %self.path.display(), level = %level, "saved level");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backlight::test_support::scratch_dir;

    fn store(tag: &str) -> LevelStore {
        LevelStore::new(scratch_dir(tag).join("brightness_level"))
    }

    #[test]
    fn test_save_then_load() {
        let store = store("save-load");
        store.save(BrightnessLevel::clamped(15)).unwrap();
        assert_eq!(store.load(), BrightnessLevel::clamped(15));
    }

    #[test]
    fn test_save_overwrites() {
        let store = store("overwrite");
        store.save(BrightnessLevel::clamped(5)).unwrap();
        store.save(BrightnessLevel::clamped(20)).unwrap();
        assert_eq!(store.load(), BrightnessLevel::clamped(20));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "20\n");
    }

    #[test]
    fn test_missing_file_defaults_and_is_created() {
        let store = store("missing");
        assert!(!store.path().exists());
        assert_eq!(store.load().value(), 19);
        assert!(store.path().exists());
        assert_eq!(fs::read_to_string(store.path()).unwrap().trim(), "19");
    }

    #[test]
    fn test_corrupt_file_defaults() {
        let store = store("corrupt");
        for contents in ["", "abc", "-3", "30", "12.5", "999999999999"] {
            fs::write(store.path(), contents).unwrap();
            assert_eq!(store.load().value(), 19, "contents {contents:?}");
        }
    }

    #[test]
    fn test_unreadable_path_defaults() {
        let store = store("dir-as-file");
        fs::create_dir_all(store.path()).unwrap();
        assert_eq!(store.load().value(), 19);
    }

    #[test]
    fn test_save_creates_parent_and_leaves_no_temp_files() {
        let root = scratch_dir("nested");
        let store = LevelStore::new(root.join("a/b/brightness_level"));
        store.save(BrightnessLevel::MIN).unwrap();

        let leftovers: Vec<_> = fs::read_dir(root.join("a/b"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
        assert_eq!(store.load(), BrightnessLevel::MIN);
    }

    #[test]
    fn test_lock_is_exclusive_and_released_on_drop() {
        let store = store("lock");
        let guard = store.lock().unwrap();

        let other = OpenOptions::new()
            .write(true)
            .open(store.lock_path())
            .unwrap();
        let attempt = Flock::lock(other, FlockArg::LockExclusiveNonblock);
        assert!(attempt.is_err());

        drop(guard);
        let other = OpenOptions::new()
            .write(true)
            .open(store.lock_path())
            .unwrap();
        assert!(Flock::lock(other, FlockArg::LockExclusiveNonblock).is_ok());
    }
}
