use std::{
    fs::File,
    path::{Path, PathBuf},
};

use clipmux_base::{Handle, OpenMode};
use snafu::ResultExt;

use crate::{error, Error, Result};

/// Payload files named `{prefix}{handle}` under one directory.
#[derive(Clone, Debug)]
pub struct BlobStore {
    dir_path: PathBuf,
    prefix: String,
}

impl BlobStore {
    /// # Errors
    pub fn new<P, S>(dir_path: P, prefix: S) -> Result<Self>
    where
        P: AsRef<Path>,
        S: Into<String>,
    {
        let dir_path = dir_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir_path)
            .context(error::CreateDirectorySnafu { dir_path: dir_path.clone() })?;
        Ok(Self { dir_path, prefix: prefix.into() })
    }

    #[inline]
    pub fn dir_path(&self) -> &Path { &self.dir_path }

    #[inline]
    pub fn path(&self, handle: &Handle) -> PathBuf {
        [self.dir_path.as_path(), Path::new(&format!("{}{handle}", self.prefix))]
            .into_iter()
            .collect()
    }

    /// Opens the payload of `handle` for writing, creating or truncating it.
    ///
    /// # Errors
    #[inline]
    pub fn create(&self, handle: &Handle) -> Result<File> {
        self.open_with(handle, OpenMode::WriteTruncate)
    }

    /// Opens the payload of `handle` for reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such payload.
    #[inline]
    pub fn open(&self, handle: &Handle) -> Result<File> { self.open_with(handle, OpenMode::Read) }

    /// # Errors
    pub fn open_with(&self, handle: &Handle, mode: OpenMode) -> Result<File> {
        let file_path = self.path(handle);
        match mode.open_options().open(&file_path) {
            Ok(file) => Ok(file),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !mode.is_write() => {
                Err(Error::NotFound { handle: *handle })
            }
            Err(source) => Err(Error::OpenFile { source, file_path }),
        }
    }

    /// Returns `true` if a file was removed.
    pub fn delete(&self, handle: &Handle) -> bool {
        let file_path = self.path(handle);
        match std::fs::remove_file(&file_path) {
            Ok(()) => {
                tracing::debug!("Remove payload file `{}`", file_path.display());
                true
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => false,
            Err(err) => {
                tracing::warn!("Could not remove `{}`, error: {err}", file_path.display());
                false
            }
        }
    }

    /// Handles of every payload file carrying this store's prefix.
    ///
    /// # Errors
    pub fn list(&self) -> Result<Vec<Handle>> {
        let entries = std::fs::read_dir(&self.dir_path)
            .context(error::ReadDirectorySnafu { dir_path: self.dir_path.clone() })?;

        let mut handles = entries
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|file_type| file_type.is_file()))
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_prefix(self.prefix.as_str()))
                    .and_then(|id| id.parse::<Handle>().ok())
            })
            .collect::<Vec<_>>();
        handles.sort_unstable();
        Ok(handles)
    }
}
