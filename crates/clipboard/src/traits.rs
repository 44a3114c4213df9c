use std::time::Duration;

use clipmux_base::ClipDescriptor;

use crate::Error;

pub trait Load {
    /// # Errors
    fn load(&self) -> Result<ClipDescriptor, Error>;

    fn is_empty(&self) -> bool { matches!(self.load(), Err(Error::Empty)) }
}

pub trait Store {
    /// Replaces the whole content of the clipboard at once.
    ///
    /// # Errors
    fn store(&self, descriptor: ClipDescriptor) -> Result<(), Error>;

    /// # Errors
    fn clear(&self) -> Result<(), Error>;
}

pub trait Wait {
    /// Blocks until the clipboard content changes.
    ///
    /// # Errors
    fn wait(&self) -> Result<(), Error>;

    /// Like [`Wait::wait`], but gives up after `timeout` and returns `Ok(false)`.
    ///
    /// # Errors
    fn wait_timeout(&self, timeout: Duration) -> Result<bool, Error>;
}

pub trait Subscribe: Send + Sync {
    type Subscriber: Wait + Send;

    /// # Errors
    fn subscribe(&self) -> Result<Self::Subscriber, Error>;
}

/// The host-owned shared clipboard slot.
pub trait Session: Load + Store + Subscribe {}

impl<C: Load + Store + Subscribe + ?Sized> Session for C {}

pub trait LoadExt: Load {
    /// # Errors
    fn load_mime_types(&self) -> Result<Vec<mime::Mime>, Error> {
        self.load().map(|descriptor| descriptor.mime_types().to_vec())
    }

    fn has_mime_type(&self, expected: &mime::Mime) -> bool {
        self.load().is_ok_and(|descriptor| descriptor.has_mime_type(expected))
    }

    /// # Errors
    fn load_text(&self) -> Result<String, Error> {
        self.load()?
            .items()
            .iter()
            .find_map(|item| match item {
                clipmux_base::ClipItem::Text(text) => Some(text.clone()),
                clipmux_base::ClipItem::Uri { .. } => None,
            })
            .ok_or(Error::Empty)
    }
}

impl<C: Load + ?Sized> LoadExt for C {}

pub trait StoreExt: Store {
    /// # Errors
    fn store_text(&self, text: &str) -> Result<(), Error> {
        self.store(ClipDescriptor::from_text(text))
    }
}

impl<C: Store + ?Sized> StoreExt for C {}
