use std::{
    io::{BufReader, BufWriter, Write},
    sync::Arc,
};

use clipmux_base::{ClipDescriptor, ClipItem, ContentUri, ItemDescriptor, OpenMode};
use clipmux_clipboard::{ClipboardLoadExt, ClipboardSession};
use clipmux_provider::{GarbageCollector, GarbageCollectorOptions, Provider};
use snafu::{ensure, ResultExt};

use crate::{error, Error, PayloadConsumer, PayloadProducer, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ServiceOptions {
    /// Also empty the clipboard on `clear` while it shows our payloads.
    pub reset_session_on_clear: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self { Self { reset_session_on_clear: true } }
}

/// Publishes and retrieves payloads through one [`Provider`] and one clipboard session.
#[derive(Debug)]
pub struct ClipboardService<S> {
    provider: Arc<Provider>,
    session: S,
    opts: ServiceOptions,
}

impl<S> ClipboardService<S>
where
    S: ClipboardSession,
{
    #[inline]
    pub fn new(provider: Arc<Provider>, session: S) -> Self {
        Self::with_options(provider, session, ServiceOptions::default())
    }

    #[inline]
    pub const fn with_options(provider: Arc<Provider>, session: S, opts: ServiceOptions) -> Self {
        Self { provider, session, opts }
    }

    #[inline]
    pub const fn provider(&self) -> &Arc<Provider> { &self.provider }

    #[inline]
    pub const fn session(&self) -> &S { &self.session }

    /// Replaces the previous batch with the items of `producer`.
    ///
    /// On failure nothing is installed, but files registered so far stay on disk
    /// until the next `copy`, `clear` or sweep.
    ///
    /// # Errors
    pub fn try_copy<P>(&self, producer: &P) -> Result<ClipDescriptor>
    where
        P: PayloadProducer + ?Sized,
    {
        let count = producer.count();
        let mime_types = producer.mime_types();

        let mut transaction = self.provider.lock();
        let _ = transaction.clear();
        ensure!(count > 0, error::EmptyPayloadSnafu);

        let mut items = Vec::with_capacity(count);
        for index in 0..count {
            let (handle, file) =
                transaction.allocate().context(error::AllocatePayloadSnafu { index })?;
            let mut sink = BufWriter::new(file);
            producer.write(index, &mut sink).context(error::WritePayloadSnafu { index })?;
            sink.flush().context(error::FlushPayloadSnafu { index })?;

            let mime = item_mime(&mime_types, index, count);
            let item = ItemDescriptor::new(handle, mime)
                .to_clip_item(transaction.authority())
                .context(error::BuildAddressSnafu)?;
            items.push(item);
        }

        let descriptor = ClipDescriptor::with_mime_types(manifest(mime_types), items);
        self.session.store(descriptor.clone()).context(error::InstallDescriptorSnafu)?;
        drop(transaction);

        tracing::info!("Copy {count} item(s) to clipboard");
        Ok(descriptor)
    }

    pub fn copy<P>(&self, producer: &P) -> bool
    where
        P: PayloadProducer + ?Sized,
    {
        self.try_copy(producer)
            .map_err(|err| tracing::warn!("Could not copy to clipboard, error: {err}"))
            .is_ok()
    }

    /// Decodes every item of the current batch that `consumer` accepts.
    ///
    /// Items which cannot be opened or decoded are skipped.
    ///
    /// # Errors
    pub fn try_paste<C>(&self, consumer: &C) -> Result<Vec<C::Item>>
    where
        C: PayloadConsumer + ?Sized,
    {
        let descriptor = match self.session.load() {
            Ok(descriptor) => descriptor,
            Err(clipmux_clipboard::Error::Empty) => return Ok(Vec::new()),
            Err(source) => return Err(Error::LoadSession { source }),
        };

        let authority = self.provider.authority();
        let values = descriptor
            .items()
            .iter()
            .filter_map(|item| match item {
                ClipItem::Uri { uri, mime } if consumer.accepts(mime) => Some(uri),
                ClipItem::Uri { .. } | ClipItem::Text(_) => None,
            })
            .filter(|uri| ContentUri::parse(uri).is_ok_and(|uri| uri.is_copy_of(authority)))
            .filter_map(|uri| {
                self.read_item(uri, consumer)
                    .map_err(|err| tracing::warn!("Skip clipboard item, error: {err}"))
                    .ok()
            })
            .collect();
        Ok(values)
    }

    /// Returns `None` when nothing of ours could be decoded.
    pub fn paste<C>(&self, consumer: &C) -> Option<Vec<C::Item>>
    where
        C: PayloadConsumer + ?Sized,
    {
        match self.try_paste(consumer) {
            Ok(values) if values.is_empty() => None,
            Ok(values) => Some(values),
            Err(err) => {
                tracing::warn!("Could not paste from clipboard, error: {err}");
                None
            }
        }
    }

    /// Returns `true` if the clipboard manifest lists a type matching `expected`.
    #[inline]
    pub fn contains(&self, expected: &mime::Mime) -> bool { self.session.has_mime_type(expected) }

    /// Asks the provider whether it still tracks any payload.
    pub fn is_copied(&self) -> bool {
        let result = ContentUri::check(self.provider.authority())
            .to_uri()
            .context(error::BuildAddressSnafu)
            .and_then(|uri| self.provider.query(&uri).context(error::ProviderSnafu));
        result.unwrap_or_else(|err| {
            tracing::warn!("Could not check provider, error: {err}");
            false
        })
    }

    /// Deletes every payload of ours and returns how many files were removed.
    ///
    /// The session is reset under the same provider lock, so a concurrent `copy` either
    /// completes before the clear or installs its batch after it.
    ///
    /// # Errors
    pub fn try_clear(&self) -> Result<usize> {
        let uri = ContentUri::clear(self.provider.authority())
            .to_uri()
            .context(error::BuildAddressSnafu)?;

        let mut transaction = self.provider.lock();
        let removed = transaction.delete(&uri).context(error::ProviderSnafu)?;
        if self.opts.reset_session_on_clear {
            let shows_ours = self
                .session
                .load()
                .is_ok_and(|descriptor| descriptor.references(transaction.authority()));
            if shows_ours {
                self.session.clear().context(error::ResetSessionSnafu)?;
            }
        }
        drop(transaction);

        Ok(removed)
    }

    pub fn clear(&self) -> bool {
        self.try_clear()
            .map_err(|err| tracing::warn!("Could not clear clipboard, error: {err}"))
            .is_ok()
    }
}

impl<S> ClipboardService<S>
where
    S: ClipboardSession + Clone + Send + 'static,
    S::Subscriber: 'static,
{
    /// Starts sweeping our payloads once the session stops showing them.
    ///
    /// # Errors
    pub fn spawn_garbage_collector(
        &self,
        opts: GarbageCollectorOptions,
    ) -> Result<GarbageCollector> {
        GarbageCollector::spawn(self.provider.clone(), self.session.clone(), opts)
            .context(error::ProviderSnafu)
    }
}

impl<S> ClipboardService<S> {
    fn read_item<C>(&self, uri: &http::Uri, consumer: &C) -> Result<C::Item>
    where
        C: PayloadConsumer + ?Sized,
    {
        let file = self
            .provider
            .open_file(uri, OpenMode::Read)
            .context(error::OpenPayloadSnafu { uri: uri.clone() })?;
        consumer
            .read(&mut BufReader::new(file))
            .context(error::DecodePayloadSnafu { uri: uri.clone() })
    }
}

fn item_mime(mime_types: &[mime::Mime], index: usize, count: usize) -> mime::Mime {
    if mime_types.len() == count {
        mime_types[index].clone()
    } else {
        mime_types.first().cloned().unwrap_or(mime::APPLICATION_OCTET_STREAM)
    }
}

fn manifest(mime_types: Vec<mime::Mime>) -> Vec<mime::Mime> {
    if mime_types.is_empty() {
        return vec![mime::APPLICATION_OCTET_STREAM];
    }
    let mut manifest: Vec<mime::Mime> = Vec::with_capacity(mime_types.len());
    for mime in mime_types {
        if !manifest.contains(&mime) {
            manifest.push(mime);
        }
    }
    manifest
}
