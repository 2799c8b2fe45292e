//! Exclusively-locked PID file.
//!
//! The daemon takes an advisory exclusive lock (flock) on the PID file at
//! startup and holds it for its whole lifetime. A second daemon pointed at
//! the same file fails to lock and refuses to start, so the lock, not the
//! file's existence, is the single-instance guarantee. Stale files left by
//! a crashed daemon carry no lock and are reclaimed transparently.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// A held PID file. Dropping it releases the lock and removes the file.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    file: File,
    pid: u32,
}

impl PidFile {
    /// Locks `path` and writes the current process id into it.
    ///
    /// Fails with [`PidFileError::AlreadyRunning`] when another live
    /// process holds the lock; the file content is left untouched in that
    /// case so the owner's recorded pid stays readable.
    pub fn acquire(path: &Path) -> Result<Self, PidFileError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PidFileError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        // Open without truncating: the content must survive a failed lock.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| PidFileError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        if file.try_lock_exclusive().is_err() {
            return Err(PidFileError::AlreadyRunning {
                path: path.to_path_buf(),
                owner: read_pid(path),
            });
        }

        let pid = std::process::id();
        let mut locked = Self {
            path: path.to_path_buf(),
            file,
            pid,
        };
        locked.write_pid().map_err(|e| PidFileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!(path = %path.display(), pid, "PID file acquired");
        Ok(locked)
    }

    /// The pid recorded in the file (this process).
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Path of the held file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_pid(&mut self) -> std::io::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        writeln!(self.file, "{}", self.pid)?;
        self.file.flush()
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        // Fully qualified: std's File grew an inherent unlock method.
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "Failed to unlock PID file");
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "PID file removed"),
            // After dropping privileges the daemon may no longer be allowed
            // to unlink a root-owned file; `stop` cleans those up.
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove PID file"),
        }
    }
}

/// Reads the pid recorded in a PID file, if the file holds one.
pub fn read_pid(path: &Path) -> Option<u32> {
    let text = fs::read_to_string(path).ok()?;
    text.trim().parse().ok()
}

/// Errors acquiring the PID file.
#[derive(Debug, Error)]
pub enum PidFileError {
    #[error("Another instance already holds {} (pid {})", .path.display(), owner_label(.owner))]
    AlreadyRunning { path: PathBuf, owner: Option<u32> },

    #[error("PID file {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn owner_label(owner: &Option<u32>) -> String {
    owner.map_or_else(|| "unknown".to_string(), |pid| pid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_writes_own_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ltgd.pid");

        let held = PidFile::acquire(&path).unwrap();

        assert_eq!(held.pid(), std::process::id());
        assert_eq!(read_pid(&path), Some(std::process::id()));
    }

    #[test]
    fn test_acquire_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/state/ltgd.pid");

        let _held = PidFile::acquire(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_second_acquire_fails_while_first_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ltgd.pid");

        let _held = PidFile::acquire(&path).unwrap();

        // flock conflicts apply across descriptors, even in one process.
        let err = PidFile::acquire(&path).unwrap_err();
        match err {
            PidFileError::AlreadyRunning { owner, .. } => {
                assert_eq!(owner, Some(std::process::id()));
            }
            other => panic!("expected AlreadyRunning, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_acquire_leaves_content_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ltgd.pid");

        let _held = PidFile::acquire(&path).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let _ = PidFile::acquire(&path).unwrap_err();
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_drop_removes_file_and_allows_reacquire() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ltgd.pid");

        let held = PidFile::acquire(&path).unwrap();
        drop(held);
        assert!(!path.exists());

        let reacquired = PidFile::acquire(&path).unwrap();
        assert_eq!(reacquired.pid(), std::process::id());
    }

    #[test]
    fn test_drop_tolerates_externally_removed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ltgd.pid");

        let held = PidFile::acquire(&path).unwrap();
        fs::remove_file(&path).unwrap();
        // Must not panic even though the unlink already happened.
        drop(held);
    }

    #[test]
    fn test_read_pid_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ltgd.pid");

        fs::write(&path, "not a pid\n").unwrap();
        assert_eq!(read_pid(&path), None);
    }

    #[test]
    fn test_read_pid_missing_file() {
        assert_eq!(read_pid(Path::new("/nonexistent/ltgd.pid")), None);
    }
}
