mod descriptor;
mod handle;
mod open_mode;
mod uri;

use std::path::PathBuf;

use directories::ProjectDirs;

pub use self::{
    descriptor::{mime_matches, ClipDescriptor, ClipItem, ItemDescriptor},
    handle::{Error as HandleError, Handle},
    open_mode::{Error as OpenModeError, OpenMode},
    uri::{ContentPath, ContentUri, Error as ContentUriError, SCHEME as CONTENT_SCHEME},
};

pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const PROJECT_NAME: &str = "clipmux";

pub const CTL_PROGRAM_NAME: &str = "clipmuxctl";
pub const CTL_CONFIG_NAME: &str = "clipmuxctl.toml";

pub const DEFAULT_AUTHORITY: &str = "org.clipmux.provider";
pub const DEFAULT_FILENAME_PREFIX: &str = "clipmux_";
pub const DEFAULT_REGISTRY_STORE_NAME: &str = "clipmux-registry";

/// Key of the handle set inside the registry store.
pub const REGISTRY_FILES_KEY: &str = "files";

lazy_static::lazy_static! {
    static ref PROJECT_DIRS: ProjectDirs = ProjectDirs::from("", PROJECT_NAME, PROJECT_NAME)
            .expect("Creating `ProjectDirs` should always success");

    pub static ref PROJECT_CONFIG_DIR: PathBuf = PROJECT_DIRS.config_dir().to_path_buf();

    pub static ref PROJECT_DATA_DIR: PathBuf = PROJECT_DIRS.data_dir().to_path_buf();

    pub static ref PROJECT_CACHE_DIR: PathBuf = PROJECT_DIRS.cache_dir().to_path_buf();
}
