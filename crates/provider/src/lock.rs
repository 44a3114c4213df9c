use std::{
    fs::File,
    path::{Path, PathBuf},
};

use fs4::FileExt;
use snafu::ResultExt;

use crate::{error, Result};

/// Advisory lock shared by every process serving the same storage.
#[derive(Debug)]
pub struct ProcessLock {
    file_path: PathBuf,
    file: File,
}

impl ProcessLock {
    /// # Errors
    pub fn open<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)
                .context(error::CreateDirectorySnafu { dir_path: parent.to_path_buf() })?;
        }
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&file_path)
            .context(error::OpenFileSnafu { file_path: file_path.clone() })?;
        Ok(Self { file_path, file })
    }

    #[inline]
    pub fn file_path(&self) -> &Path { &self.file_path }

    /// Blocks until no other process holds the lock.
    ///
    /// Returns `None` if the platform refused the lock; callers carry on unprotected.
    pub fn acquire(&self) -> Option<ProcessLockGuard<'_>> {
        match FileExt::lock_exclusive(&self.file) {
            Ok(()) => Some(ProcessLockGuard { lock: self }),
            Err(err) => {
                tracing::warn!("Could not lock {}, error: {err}", self.file_path.display());
                None
            }
        }
    }
}

#[derive(Debug)]
pub struct ProcessLockGuard<'a> {
    lock: &'a ProcessLock,
}

impl Drop for ProcessLockGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.lock.file) {
            tracing::warn!("Could not unlock {}, error: {err}", self.lock.file_path.display());
        }
    }
}
