use std::{fmt, str::FromStr};

use snafu::{OptionExt, ResultExt, Snafu};

use crate::{handle, Handle};

pub const SCHEME: &str = "content";

const COPY_SEGMENT: &str = "copy";
const CLEAR_SEGMENT: &str = "clear";
const CHECK_SEGMENT: &str = "check";

/// The operations a provider exposes under its authority.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContentPath {
    /// `copy/{handle}`: one payload file.
    Copy(Handle),
    /// `clear`: delete every tracked payload.
    Clear,
    /// `check`: whether any payload is tracked.
    Check,
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy(handle) => write!(f, "{COPY_SEGMENT}/{handle}"),
            Self::Clear => f.write_str(CLEAR_SEGMENT),
            Self::Check => f.write_str(CHECK_SEGMENT),
        }
    }
}

/// A parsed `content://{authority}/{path}` address.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ContentUri {
    authority: String,
    path: ContentPath,
}

impl ContentUri {
    #[inline]
    pub fn new<S: Into<String>>(authority: S, path: ContentPath) -> Self {
        Self { authority: authority.into(), path }
    }

    #[inline]
    pub fn copy<S: Into<String>>(authority: S, handle: Handle) -> Self {
        Self::new(authority, ContentPath::Copy(handle))
    }

    #[inline]
    pub fn clear<S: Into<String>>(authority: S) -> Self { Self::new(authority, ContentPath::Clear) }

    #[inline]
    pub fn check<S: Into<String>>(authority: S) -> Self { Self::new(authority, ContentPath::Check) }

    #[inline]
    #[must_use]
    pub fn authority(&self) -> &str { &self.authority }

    #[inline]
    #[must_use]
    pub const fn path(&self) -> ContentPath { self.path }

    #[inline]
    #[must_use]
    pub const fn handle(&self) -> Option<Handle> {
        match self.path {
            ContentPath::Copy(handle) => Some(handle),
            ContentPath::Clear | ContentPath::Check => None,
        }
    }

    /// Returns `true` if this address names a payload published under `authority`.
    #[inline]
    #[must_use]
    pub fn is_copy_of(&self, authority: &str) -> bool {
        self.authority == authority && matches!(self.path, ContentPath::Copy(_))
    }

    /// # Errors
    ///
    /// Fails if the authority is not a valid URI authority.
    pub fn to_uri(&self) -> Result<http::Uri, Error> {
        http::Uri::builder()
            .scheme(SCHEME)
            .authority(self.authority.as_str())
            .path_and_query(format!("/{}", self.path))
            .build()
            .context(BuildSnafu { authority: self.authority.clone() })
    }

    /// # Errors
    ///
    /// Fails if `uri` is not a `content://` address of a known path.
    pub fn parse(uri: &http::Uri) -> Result<Self, Error> {
        match uri.scheme_str() {
            Some(SCHEME) => {}
            scheme => {
                return Err(Error::Scheme { scheme: scheme.unwrap_or_default().to_string() })
            }
        }

        let authority = uri.authority().context(MissingAuthoritySnafu)?.as_str().to_string();
        let segments =
            uri.path().trim_matches('/').split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>();
        let path = match segments.as_slice() {
            [COPY_SEGMENT, handle] => {
                ContentPath::Copy(handle.parse().context(HandleSnafu)?)
            }
            [CLEAR_SEGMENT] => ContentPath::Clear,
            [CHECK_SEGMENT] => ContentPath::Check,
            _ => return Err(Error::UnknownPath { path: uri.path().to_string() }),
        };

        Ok(Self { authority, path })
    }
}

impl FromStr for ContentUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uri = s.parse::<http::Uri>().context(InvalidSnafu { value: s.to_string() })?;
        Self::parse(&uri)
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}://{}/{}", self.authority, self.path)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Could not parse URI `{value}`, error: {source}"))]
    Invalid { value: String, source: http::uri::InvalidUri },

    #[snafu(display("Could not build URI with authority `{authority}`, error: {source}"))]
    Build { authority: String, source: http::Error },

    #[snafu(display("Unsupported URI scheme `{scheme}`, expected `{SCHEME}`"))]
    Scheme { scheme: String },

    #[snafu(display("URI has no authority"))]
    MissingAuthority,

    #[snafu(display("Unknown content path `{path}`"))]
    UnknownPath { path: String },

    #[snafu(display("{source}"))]
    Handle { source: handle::Error },
}
