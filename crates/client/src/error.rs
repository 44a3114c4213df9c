use clipmux_base::ContentUriError;
use snafu::Snafu;

use crate::codec;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Producer has no item to copy"))]
    EmptyPayload,

    #[snafu(display("Could not allocate payload file for item {index}, error: {source}"))]
    AllocatePayload { index: usize, source: clipmux_provider::Error },

    #[snafu(display("Could not write item {index}, error: {source}"))]
    WritePayload { index: usize, source: codec::Error },

    #[snafu(display("Could not flush item {index}, error: {source}"))]
    FlushPayload { index: usize, source: std::io::Error },

    #[snafu(display("Could not build item address, error: {source}"))]
    BuildAddress { source: ContentUriError },

    #[snafu(display("Could not install descriptor into clipboard, error: {source}"))]
    InstallDescriptor { source: clipmux_clipboard::Error },

    #[snafu(display("Could not load clipboard, error: {source}"))]
    LoadSession { source: clipmux_clipboard::Error },

    #[snafu(display("Could not reset clipboard, error: {source}"))]
    ResetSession { source: clipmux_clipboard::Error },

    #[snafu(display("Could not open `{uri}`, error: {source}"))]
    OpenPayload { uri: http::Uri, source: clipmux_provider::Error },

    #[snafu(display("Could not decode `{uri}`, error: {source}"))]
    DecodePayload { uri: http::Uri, source: codec::Error },

    #[snafu(display("{source}"))]
    Provider { source: clipmux_provider::Error },
}
