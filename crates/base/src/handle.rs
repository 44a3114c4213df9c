use std::{fmt, str::FromStr};

use snafu::Snafu;

/// Opaque identifier of one published payload.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Handle(uuid::Uuid);

impl Handle {
    /// Mints a fresh, random handle.
    #[inline]
    #[must_use]
    pub fn new() -> Self { Self(uuid::Uuid::new_v4()) }

    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid { &self.0 }
}

impl Default for Handle {
    fn default() -> Self { Self::new() }
}

impl FromStr for Handle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self).map_err(|_| Error::Parse { value: s.to_string() })
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.hyphenated().fmt(f) }
}

impl From<uuid::Uuid> for Handle {
    fn from(uuid: uuid::Uuid) -> Self { Self(uuid) }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Could not parse handle, value: {value}"))]
    Parse { value: String },
}
