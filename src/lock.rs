//! Exclusive access to a storage root.
//!
//! Every process that opens the ledger storage for read/write use (the server's
//! provider, or a maintenance command such as unjoin) first takes an OS-level
//! advisory lock on `<root>/ledgersData/fileLock`. Acquisition never waits: if
//! another holder exists the caller gets [`LockError::AlreadyLocked`] at once.
//!
//! The lock is released when the [`ExclusiveLock`] is dropped.

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum LockError {
    #[error("storage root is locked by another process: {}", .0.display())]
    AlreadyLocked(PathBuf),

    #[error("failed to create lock file {}: {}", .path.display(), .source)]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LockError>;

/// Held exclusive lock on a storage root
#[derive(Debug)]
pub struct ExclusiveLock {
    // Kept open: closing the handle drops the flock
    file: File,
    path: PathBuf,
}

impl ExclusiveLock {
    /// Try to take the lock at `lock_path` without blocking
    pub fn acquire<P: AsRef<Path>>(lock_path: P) -> Result<Self> {
        let lock_path = lock_path.as_ref();

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|source| LockError::CreateFailed {
                path: lock_path.to_path_buf(),
                source,
            })?;
        }

        // Never truncate: the file may belong to a live holder
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|source| LockError::CreateFailed {
                path: lock_path.to_path_buf(),
                source,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                info!(path = %lock_path.display(), "Acquired exclusive lock");
                Ok(Self {
                    file,
                    path: lock_path.to_path_buf(),
                })
            }
            Err(e) if is_contended(&e) => {
                debug!(path = %lock_path.display(), "Lock is held elsewhere");
                Err(LockError::AlreadyLocked(lock_path.to_path_buf()))
            }
            Err(source) => {
                error!(path = %lock_path.display(), error = %source, "Failed to acquire lock");
                Err(LockError::CreateFailed {
                    path: lock_path.to_path_buf(),
                    source,
                })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// EWOULDBLOCK surfaces as 11 on Linux and 35 on macOS when not mapped to WouldBlock
fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == Some(11)
        || err.raw_os_error() == Some(35)
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for ExclusiveLock {
    fn drop(&mut self) {
        match FileExt::unlock(&self.file) {
            Ok(()) => info!(path = %self.path.display(), "Released exclusive lock"),
            Err(e) => error!(
                path = %self.path.display(),
                error = %e,
                "Failed to release exclusive lock"
            ),
        }
    }
}
