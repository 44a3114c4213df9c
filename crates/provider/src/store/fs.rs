use std::{
    collections::{BTreeMap, BTreeSet},
    io::Write,
    path::{Path, PathBuf},
};

use snafu::ResultExt;

use crate::{error, store::KeyValueStore, Error, Result};

type Entries = BTreeMap<String, serde_json::Value>;

/// Keeps all keys in one JSON document, replaced atomically on every change.
///
/// Several processes may share the document; each change is applied on top of the latest
/// version on disk.
#[derive(Debug)]
pub struct FileKeyValueStore {
    file_path: PathBuf,
    entries: Entries,
    // raw document last read or written, `None` if the file did not exist
    snapshot: Option<Vec<u8>>,
}

impl FileKeyValueStore {
    /// Opens the store at `file_path`; a missing file is an empty store.
    ///
    /// # Errors
    pub fn open<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)
                .context(error::CreateDirectorySnafu { dir_path: parent.to_path_buf() })?;
        }

        let snapshot = read_document(&file_path)?;
        let entries = parse_document(&file_path, snapshot.as_deref())?;
        Ok(Self { file_path, entries, snapshot })
    }

    /// Like [`FileKeyValueStore::open`], but an undecodable document is discarded.
    ///
    /// # Errors
    pub fn open_or_reset<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        match Self::open(&file_path) {
            Err(err @ Error::DeserializeStore { .. }) => {
                tracing::error!("{err}, the store is reset");
                let file_path = file_path.as_ref().to_path_buf();
                let snapshot = read_document(&file_path)?;
                Ok(Self { file_path, entries: Entries::new(), snapshot })
            }
            result => result,
        }
    }

    #[inline]
    pub fn file_path(&self) -> &Path { &self.file_path }

    fn temporary_file_path(&self) -> PathBuf {
        let mut file_name = self.file_path.file_name().unwrap_or_default().to_os_string();
        file_name.push(".tmp");
        self.file_path.with_file_name(file_name)
    }

    // Brings `entries` up to date before a change; an undecodable document is overwritten.
    fn refresh(&mut self) -> Result<()> {
        match self.reload() {
            Ok(_) => Ok(()),
            Err(err @ Error::DeserializeStore { .. }) => {
                tracing::error!("{err}, the store is reset");
                self.entries.clear();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn flush(&mut self) -> Result<()> {
        let content =
            serde_json::to_vec_pretty(&self.entries).context(error::SerializeStoreSnafu)?;
        let tmp_path = self.temporary_file_path();

        {
            let mut file = std::fs::File::create(&tmp_path)
                .context(error::OpenFileSnafu { file_path: tmp_path.clone() })?;
            file.write_all(&content)
                .and_then(|()| file.sync_all())
                .context(error::WriteFileSnafu { file_path: tmp_path.clone() })?;
        }

        std::fs::rename(&tmp_path, &self.file_path)
            .context(error::RenameFileSnafu { from: tmp_path, to: self.file_path.clone() })?;
        self.snapshot = Some(content);
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_string_set(&self, key: &str) -> Result<Option<BTreeSet<String>>> {
        self.entries
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone())
                    .context(error::DeserializeValueSnafu { key: key.to_string() })
            })
            .transpose()
    }

    fn put_string_set(&mut self, key: &str, values: &BTreeSet<String>) -> Result<()> {
        self.refresh()?;
        let value = serde_json::to_value(values).context(error::SerializeStoreSnafu)?;
        drop(self.entries.insert(key.to_string(), value));
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.refresh()?;
        if self.entries.remove(key).is_some() {
            self.flush()
        } else {
            Ok(())
        }
    }

    fn reload(&mut self) -> Result<bool> {
        let snapshot = read_document(&self.file_path)?;
        if snapshot == self.snapshot {
            return Ok(false);
        }
        self.entries = parse_document(&self.file_path, snapshot.as_deref())?;
        self.snapshot = snapshot;
        Ok(true)
    }
}

fn read_document(file_path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(file_path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::ReadFile { source, file_path: file_path.to_path_buf() }),
    }
}

fn parse_document(file_path: &Path, content: Option<&[u8]>) -> Result<Entries> {
    content.map_or_else(
        || Ok(Entries::new()),
        |content| {
            serde_json::from_slice(content)
                .context(error::DeserializeStoreSnafu { file_path: file_path.to_path_buf() })
        },
    )
}
