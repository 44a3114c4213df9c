use std::path::PathBuf;

use clipmux_base::{ContentUri, ContentUriError, Handle};
use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to create directory {}, error: {source}", dir_path.display()))]
    CreateDirectory { source: std::io::Error, dir_path: PathBuf },

    #[snafu(display("Failed to read directory {}, error: {source}", dir_path.display()))]
    ReadDirectory { source: std::io::Error, dir_path: PathBuf },

    #[snafu(display("Failed to open file {}, error: {source}", file_path.display()))]
    OpenFile { source: std::io::Error, file_path: PathBuf },

    #[snafu(display("Failed to read file {}, error: {source}", file_path.display()))]
    ReadFile { source: std::io::Error, file_path: PathBuf },

    #[snafu(display("Failed to write file {}, error: {source}", file_path.display()))]
    WriteFile { source: std::io::Error, file_path: PathBuf },

    #[snafu(display("Failed to rename {} to {}, error: {source}", from.display(), to.display()))]
    RenameFile { source: std::io::Error, from: PathBuf, to: PathBuf },

    #[snafu(display("Failed to serialize key-value store, error: {source}"))]
    SerializeStore { source: serde_json::Error },

    #[snafu(display(
        "Failed to deserialize key-value store {}, error: {source}",
        file_path.display()
    ))]
    DeserializeStore { source: serde_json::Error, file_path: PathBuf },

    #[snafu(display("Failed to deserialize value of key `{key}`, error: {source}"))]
    DeserializeValue { source: serde_json::Error, key: String },

    #[snafu(display("Payload `{handle}` is not found"))]
    NotFound { handle: Handle },

    #[snafu(display("{source}"))]
    ContentUri { source: ContentUriError },

    #[snafu(display("Authority `{authority}` does not belong to this provider `{expected}`"))]
    ForeignAuthority { authority: String, expected: String },

    #[snafu(display("`{uri}` does not support {operation}"))]
    UnsupportedOperation { uri: ContentUri, operation: &'static str },

    #[snafu(display("Could not subscribe clipboard session, error: {source}"))]
    SubscribeSession { source: clipmux_clipboard::Error },

    #[snafu(display("Could not spawn garbage collector, error: {source}"))]
    SpawnCollector { source: std::io::Error },
}

impl From<ContentUriError> for Error {
    fn from(source: ContentUriError) -> Self { Self::ContentUri { source } }
}
