use std::sync::{Arc, RwLock};

use clipmux_base::ClipDescriptor;

use crate::{
    pubsub::{Publisher, Subscriber},
    ClipboardLoad, ClipboardStore, ClipboardSubscribe, Error,
};

/// An in-process clipboard slot.
///
/// Clones share the same slot and the same notifier.
#[derive(Clone, Debug, Default)]
pub struct Clipboard {
    data: Arc<RwLock<Option<ClipDescriptor>>>,
    publisher: Arc<Publisher>,
}

impl Clipboard {
    #[inline]
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[inline]
    #[must_use]
    pub fn with_content(descriptor: ClipDescriptor) -> Self {
        Self { data: Arc::new(RwLock::new(Some(descriptor))), publisher: Arc::default() }
    }

    fn replace(&self, content: Option<ClipDescriptor>) -> Result<(), Error> {
        match self.data.write() {
            Ok(mut data) => {
                *data = content;
                drop(data);
                self.publisher.notify_all();
                Ok(())
            }
            Err(_err) => Err(Error::PrimitivePoisoned),
        }
    }
}

impl ClipboardSubscribe for Clipboard {
    type Subscriber = Subscriber;

    fn subscribe(&self) -> Result<Subscriber, Error> { Ok(self.publisher.subscribe()) }
}

impl ClipboardLoad for Clipboard {
    fn load(&self) -> Result<ClipDescriptor, Error> {
        self.data.read().map_or_else(
            |_| Err(Error::PrimitivePoisoned),
            |data| match data.as_ref() {
                Some(descriptor) if !descriptor.is_empty() => Ok(descriptor.clone()),
                _ => Err(Error::Empty),
            },
        )
    }
}

impl ClipboardStore for Clipboard {
    #[inline]
    fn store(&self, descriptor: ClipDescriptor) -> Result<(), Error> {
        self.replace(Some(descriptor))
    }

    #[inline]
    fn clear(&self) -> Result<(), Error> { self.replace(None) }
}
