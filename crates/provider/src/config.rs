use std::path::{Path, PathBuf};

/// Storage layout of a provider, fixed at construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Keep payloads under `data_dir` instead of `cache_dir`.
    pub durable: bool,

    /// Prepended to the handle to form a payload file name.
    pub filename_prefix: String,

    /// Namespace of the key-value store holding the handle registry.
    pub registry_store_name: String,

    /// Authority of the `content://` addresses this provider answers.
    pub authority: String,

    pub data_dir: PathBuf,

    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            durable: true,
            filename_prefix: clipmux_base::DEFAULT_FILENAME_PREFIX.to_string(),
            registry_store_name: clipmux_base::DEFAULT_REGISTRY_STORE_NAME.to_string(),
            authority: clipmux_base::DEFAULT_AUTHORITY.to_string(),
            data_dir: clipmux_base::PROJECT_DATA_DIR.to_path_buf(),
            cache_dir: clipmux_base::PROJECT_CACHE_DIR.to_path_buf(),
        }
    }
}

impl Config {
    /// Default configuration with both storage roots under `base_dir`.
    pub fn with_base_dir<P: AsRef<Path>>(base_dir: P) -> Self {
        let base_dir = base_dir.as_ref();
        Self {
            data_dir: base_dir.join("data"),
            cache_dir: base_dir.join("cache"),
            ..Self::default()
        }
    }

    #[inline]
    pub fn filename_prefix(&self) -> &str {
        if self.filename_prefix.is_empty() {
            clipmux_base::DEFAULT_FILENAME_PREFIX
        } else {
            &self.filename_prefix
        }
    }

    #[inline]
    pub fn registry_store_name(&self) -> &str {
        if self.registry_store_name.is_empty() {
            clipmux_base::DEFAULT_REGISTRY_STORE_NAME
        } else {
            &self.registry_store_name
        }
    }

    #[inline]
    pub fn blob_dir_path(&self) -> PathBuf {
        let root = if self.durable { &self.data_dir } else { &self.cache_dir };
        [root.as_path(), Path::new("blobs")].into_iter().collect()
    }

    #[inline]
    pub fn registry_file_path(&self) -> PathBuf {
        [self.data_dir.clone(), PathBuf::from(format!("{}.json", self.registry_store_name()))]
            .into_iter()
            .collect()
    }

    /// Lock file serializing every process that shares this storage.
    #[inline]
    pub fn lock_file_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.lock", self.registry_store_name()))
    }
}
