use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Could not read file {}, error: {source}", filename.display()))]
    ReadFile { filename: PathBuf, source: std::io::Error },

    #[snafu(display("Could not write file {}, error: {source}", filename.display()))]
    WriteFile { filename: PathBuf, source: std::io::Error },

    #[snafu(display("Could not read from stdin, error: {source}"))]
    ReadStdin { source: std::io::Error },

    #[snafu(display("Could not write to stdout, error: {source}"))]
    WriteStdout { source: std::io::Error },

    #[snafu(display("Content of {source_name} is not valid UTF-8, error: {source}"))]
    CheckUtf8String { source_name: String, source: simdutf8::basic::Utf8Error },

    #[snafu(display("Could not create tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: std::io::Error },

    #[snafu(display("Could not wait for termination signal, error: {source}"))]
    WaitSignal { source: std::io::Error },

    #[snafu(display("Could not open clipboard, error: {source}"))]
    OpenClipboard { source: clipmux_clipboard::Error },

    #[snafu(display("Could not open provider, error: {source}"))]
    OpenProvider { source: clipmux_provider::Error },

    #[snafu(display("{source}"))]
    Client { source: clipmux_client::Error },
}

impl From<clipmux_client::Error> for Error {
    fn from(source: clipmux_client::Error) -> Self { Self::Client { source } }
}
