use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, warn};

/// Locations of the kernel wake-lock attribute files.
///
/// Overridable so tests can use plain files instead of sysfs.
#[derive(Debug, Clone)]
pub struct WakeLockPaths {
    pub lock_path: PathBuf,
    pub unlock_path: PathBuf,
}

impl Default for WakeLockPaths {
    fn default() -> Self {
        Self {
            lock_path: PathBuf::from("/sys/power/wake_lock"),
            unlock_path: PathBuf::from("/sys/power/wake_unlock"),
        }
    }
}

/// A held wake-lock, preventing system suspend until dropped.
///
/// Acquisition writes the tag to the wake-lock attribute; `Drop` writes it
/// to the wake-unlock attribute, so release happens on every exit path of
/// the scope holding the guard, error returns included. A failed acquisition
/// is logged and yields an inert guard: blocking without the lock is
/// preferable to failing the receive outright.
#[must_use = "the wake-lock is released when the guard is dropped"]
pub struct WakeLock {
    paths: WakeLockPaths,
    tag: String,
    held: bool,
}

impl WakeLock {
    pub fn acquire(paths: &WakeLockPaths, tag: &str) -> Self {
        let held = match write_tag(&paths.lock_path, tag) {
            Ok(()) => {
                debug!(tag, "wake-lock acquired");
                true
            }
            Err(err) => {
                warn!(tag, %err, "wake-lock acquisition failed");
                false
            }
        };
        Self {
            paths: paths.clone(),
            tag: tag.to_string(),
            held,
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

impl Drop for WakeLock {
    fn drop(&mut self) {
        if !self.held {
            return;
        }
        match write_tag(&self.paths.unlock_path, &self.tag) {
            Ok(()) => debug!(tag = %self.tag, "wake-lock released"),
            Err(err) => warn!(tag = %self.tag, %err, "wake-lock release failed"),
        }
    }
}

fn write_tag(path: &std::path::Path, tag: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new().append(true).open(path)?;
    file.write_all(tag.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_paths(dir: &std::path::Path) -> WakeLockPaths {
        WakeLockPaths {
            lock_path: dir.join("wake_lock"),
            unlock_path: dir.join("wake_unlock"),
        }
    }

    #[test]
    fn acquire_and_release_write_tag() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wake_lock"), b"").unwrap();
        std::fs::write(dir.path().join("wake_unlock"), b"").unwrap();
        let paths = test_paths(dir.path());

        {
            let lock = WakeLock::acquire(&paths, "bbipc_fmt-interface");
            assert!(lock.is_held());
            assert_eq!(
                std::fs::read(dir.path().join("wake_lock")).unwrap(),
                b"bbipc_fmt-interface"
            );
            assert!(std::fs::read(dir.path().join("wake_unlock"))
                .unwrap()
                .is_empty());
        }

        assert_eq!(
            std::fs::read(dir.path().join("wake_unlock")).unwrap(),
            b"bbipc_fmt-interface"
        );
    }

    #[test]
    fn released_on_early_exit_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wake_lock"), b"").unwrap();
        std::fs::write(dir.path().join("wake_unlock"), b"").unwrap();
        let paths = test_paths(dir.path());

        fn receive_that_fails(paths: &WakeLockPaths) -> Result<(), ()> {
            let _lock = WakeLock::acquire(paths, "bbipc_rfs-interface");
            Err(())
        }

        assert!(receive_that_fails(&paths).is_err());
        assert_eq!(
            std::fs::read(dir.path().join("wake_unlock")).unwrap(),
            b"bbipc_rfs-interface"
        );
    }

    #[test]
    fn missing_attribute_files_yield_inert_guard() {
        let dir = tempfile::tempdir().unwrap();
        let paths = test_paths(dir.path());

        let lock = WakeLock::acquire(&paths, "bbipc_fmt-interface");
        assert!(!lock.is_held());
        drop(lock);
        assert!(!dir.path().join("wake_unlock").exists());
    }
}
