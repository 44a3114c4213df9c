use std::{fmt, fs::OpenOptions, str::FromStr};

use snafu::Snafu;

/// How a payload file is opened.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum OpenMode {
    #[default]
    Read,
    /// Create or truncate, write only.
    WriteTruncate,
    /// Create if missing, append.
    WriteAppend,
    /// Create if missing, read and write.
    ReadWrite,
    /// Create or truncate, read and write.
    ReadWriteTruncate,
}

impl OpenMode {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::WriteTruncate => "wt",
            Self::WriteAppend => "wa",
            Self::ReadWrite => "rw",
            Self::ReadWriteTruncate => "rwt",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_write(&self) -> bool { !matches!(self, Self::Read) }

    #[must_use]
    pub fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            Self::Read => {
                let _ = options.read(true);
            }
            Self::WriteTruncate => {
                let _ = options.write(true).create(true).truncate(true);
            }
            Self::WriteAppend => {
                let _ = options.append(true).create(true);
            }
            Self::ReadWrite => {
                let _ = options.read(true).write(true).create(true).truncate(false);
            }
            Self::ReadWriteTruncate => {
                let _ = options.read(true).write(true).create(true).truncate(true);
            }
        }
        options
    }
}

impl FromStr for OpenMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Self::Read),
            "w" | "wt" => Ok(Self::WriteTruncate),
            "wa" => Ok(Self::WriteAppend),
            "rw" => Ok(Self::ReadWrite),
            "rwt" => Ok(Self::ReadWriteTruncate),
            _ => Err(Error::Parse { value: s.to_string() }),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Could not parse open mode, value: {value}"))]
    Parse { value: String },
}
