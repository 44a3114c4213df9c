use std::{fs::File, path::PathBuf};

use clipmux_base::{ContentPath, ContentUri, Handle, OpenMode};
use clipmux_clipboard::ClipboardLoad;
use parking_lot::{Mutex, MutexGuard};

use crate::{
    blob::BlobStore,
    lock::{ProcessLock, ProcessLockGuard},
    registry::HandleRegistry,
    store::{FileKeyValueStore, KeyValueStore},
    Config, Error, Result, SessionEvent, SweepOutcome,
};

#[derive(Debug)]
struct State {
    blobs: BlobStore,
    registry: HandleRegistry,
}

/// Owns the payload files of one authority and the registry tracking them.
///
/// Every mutation happens under one lock, see [`Provider::lock`]. The lock also spans
/// every other process opened on the same storage.
#[derive(Debug)]
pub struct Provider {
    authority: String,
    process_lock: ProcessLock,
    state: Mutex<State>,
}

impl Provider {
    /// Opens the provider described by `config`, with its registry kept in a
    /// [`FileKeyValueStore`].
    ///
    /// # Errors
    pub fn new(config: &Config) -> Result<Self> {
        let store = FileKeyValueStore::open_or_reset(config.registry_file_path())?;
        Self::with_store(config, Box::new(store))
    }

    /// # Errors
    pub fn with_store(config: &Config, store: Box<dyn KeyValueStore>) -> Result<Self> {
        let authority = config.authority.clone();
        let _ = ContentUri::check(authority.as_str()).to_uri()?;

        let process_lock = ProcessLock::open(config.lock_file_path())?;
        let blobs = BlobStore::new(config.blob_dir_path(), config.filename_prefix())?;
        let registry = {
            let _guard = process_lock.acquire();
            let listed = blobs.list()?;
            let registry = HandleRegistry::load(store);
            let purged = listed
                .into_iter()
                .filter(|handle| !registry.contains(handle))
                .filter(|handle| blobs.delete(handle))
                .count();
            if purged > 0 {
                tracing::info!("Purge {purged} untracked payload file(s)");
            }
            registry
        };

        tracing::info!(
            "Provider `{authority}` keeps payloads in `{}`, {} tracked",
            blobs.dir_path().display(),
            registry.len()
        );
        Ok(Self { authority, process_lock, state: Mutex::new(State { blobs, registry }) })
    }

    #[inline]
    pub fn authority(&self) -> &str { &self.authority }

    /// Takes the provider lock; other mutations wait until the transaction is dropped.
    ///
    /// The registry is brought up to date with changes made by other processes.
    pub fn lock(&self) -> Transaction<'_> {
        let mut state = self.state.lock();
        let process_lock = self.process_lock.acquire();
        state.registry.reload();
        Transaction { authority: &self.authority, _process_lock: process_lock, state }
    }

    /// # Errors
    ///
    /// Fails if `uri` is not a `copy/{handle}` address of this provider, or if the
    /// file cannot be opened.
    pub fn open_file(&self, uri: &http::Uri, mode: OpenMode) -> Result<File> {
        let uri = resolve(&self.authority, uri)?;
        match uri.path() {
            ContentPath::Copy(handle) => self.lock().open_file(&handle, mode),
            ContentPath::Clear | ContentPath::Check => {
                Err(Error::UnsupportedOperation { uri, operation: "opening a file" })
            }
        }
    }

    /// Serves the `clear` path and returns the number of deleted payload files.
    ///
    /// # Errors
    pub fn delete(&self, uri: &http::Uri) -> Result<usize> { self.lock().delete(uri) }

    /// Serves the `check` path.
    ///
    /// # Errors
    pub fn query(&self, uri: &http::Uri) -> Result<bool> {
        let uri = resolve(&self.authority, uri)?;
        match uri.path() {
            ContentPath::Check => Ok(self.check()),
            ContentPath::Copy(_) | ContentPath::Clear => {
                Err(Error::UnsupportedOperation { uri, operation: "query" })
            }
        }
    }

    #[inline]
    pub fn clear(&self) -> usize { self.lock().clear() }

    #[inline]
    pub fn check(&self) -> bool { self.lock().check() }

    #[inline]
    pub fn handle_event(&self, event: &SessionEvent) -> SweepOutcome { self.lock().sweep(event) }

    /// Reads the session under the provider lock and sweeps if it was abandoned.
    pub fn on_session_changed<L>(&self, session: &L) -> SweepOutcome
    where
        L: ClipboardLoad + ?Sized,
    {
        let mut transaction = self.lock();
        let event = SessionEvent::from(session.load());
        transaction.sweep(&event)
    }

    pub fn tracked_handles(&self) -> Vec<Handle> {
        self.lock().state.registry.iter().copied().collect()
    }

    pub fn blob_path(&self, handle: &Handle) -> PathBuf { self.state.lock().blobs.path(handle) }
}

/// Exclusive access to the provider state.
#[derive(Debug)]
pub struct Transaction<'a> {
    authority: &'a str,
    // released before `state` so no thread of this process runs unguarded
    _process_lock: Option<ProcessLockGuard<'a>>,
    state: MutexGuard<'a, State>,
}

impl Transaction<'_> {
    #[inline]
    pub fn authority(&self) -> &str { self.authority }

    /// Mints a handle, registers it and opens its payload file for writing.
    ///
    /// # Errors
    pub fn allocate(&mut self) -> Result<(Handle, File)> {
        let handle = Handle::new();
        let file = self.open_file(&handle, OpenMode::WriteTruncate)?;
        Ok((handle, file))
    }

    /// Opening for write registers `handle` before the file exists; opening for read
    /// requires it to be registered.
    ///
    /// # Errors
    pub fn open_file(&mut self, handle: &Handle, mode: OpenMode) -> Result<File> {
        if !mode.is_write() {
            return if self.state.registry.contains(handle) {
                self.state.blobs.open_with(handle, mode)
            } else {
                Err(Error::NotFound { handle: *handle })
            };
        }

        let registered = self.state.registry.add(*handle);
        match self.state.blobs.open_with(handle, mode) {
            Ok(file) => {
                if registered {
                    tracing::debug!("Register payload `{handle}`");
                }
                Ok(file)
            }
            Err(err) => {
                if registered {
                    let _ = self.state.registry.remove(handle);
                }
                Err(err)
            }
        }
    }

    /// Serves the `clear` path.
    ///
    /// # Errors
    pub fn delete(&mut self, uri: &http::Uri) -> Result<usize> {
        let uri = resolve(self.authority, uri)?;
        match uri.path() {
            ContentPath::Clear => Ok(self.clear()),
            ContentPath::Copy(_) | ContentPath::Check => {
                Err(Error::UnsupportedOperation { uri, operation: "deletion" })
            }
        }
    }

    /// Deletes every tracked payload file and empties the registry.
    pub fn clear(&mut self) -> usize {
        if self.state.registry.is_empty() {
            return 0;
        }
        let State { blobs, registry } = &mut *self.state;
        let removed = registry.remove_all().iter().filter(|handle| blobs.delete(handle)).count();
        tracing::debug!("Clear {removed} payload file(s)");
        removed
    }

    #[inline]
    pub fn check(&self) -> bool { !self.state.registry.is_empty() }

    pub fn sweep(&mut self, event: &SessionEvent) -> SweepOutcome {
        if event.references(self.authority) {
            return SweepOutcome::Retained;
        }
        if let SessionEvent::Unreadable(err) = event {
            tracing::warn!("Could not read clipboard session, error: {err}");
        }
        let removed = self.clear();
        if removed > 0 {
            tracing::info!("Clipboard content was replaced, sweep {removed} payload file(s)");
        }
        SweepOutcome::Swept { removed }
    }
}

fn resolve(authority: &str, uri: &http::Uri) -> Result<ContentUri> {
    let uri = ContentUri::parse(uri)?;
    if uri.authority() == authority {
        Ok(uri)
    } else {
        Err(Error::ForeignAuthority {
            authority: uri.authority().to_string(),
            expected: authority.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeSet,
        io::{Read, Write},
    };

    use clipmux_base::{ClipDescriptor, ContentUri, Handle, ItemDescriptor, OpenMode};
    use clipmux_clipboard::{ClipboardStore, LocalClipboard};

    use super::Provider;
    use crate::{store::KeyValueStore, Config, Error, Result, SessionEvent, SweepOutcome};

    fn provider(dir: &tempfile::TempDir) -> (Config, Provider) {
        let config = Config::with_base_dir(dir.path());
        let provider = Provider::new(&config).unwrap();
        (config, provider)
    }

    fn publish(provider: &Provider, contents: &[&[u8]]) -> Vec<Handle> {
        let mut transaction = provider.lock();
        let _ = transaction.clear();
        contents
            .iter()
            .map(|content| {
                let (handle, mut file) = transaction.allocate().unwrap();
                file.write_all(content).unwrap();
                handle
            })
            .collect()
    }

    fn descriptor(provider: &Provider, handles: &[Handle]) -> ClipDescriptor {
        ClipDescriptor::new(
            handles
                .iter()
                .map(|handle| {
                    ItemDescriptor::new(*handle, mime::APPLICATION_OCTET_STREAM)
                        .to_clip_item(provider.authority())
                        .unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn test_open_file_by_uri() {
        let dir = tempfile::tempdir().unwrap();
        let (_, provider) = provider(&dir);
        let handles = publish(&provider, &[b"hello"]);

        let uri = ContentUri::copy(provider.authority(), handles[0]).to_uri().unwrap();
        let mut content = String::new();
        let _ = provider.open_file(&uri, OpenMode::Read).unwrap().read_to_string(&mut content);
        assert_eq!(content, "hello");

        let unknown = ContentUri::copy(provider.authority(), Handle::new()).to_uri().unwrap();
        assert!(matches!(
            provider.open_file(&unknown, OpenMode::Read),
            Err(Error::NotFound { .. })
        ));

        let foreign = ContentUri::copy("org.other.provider", handles[0]).to_uri().unwrap();
        assert!(matches!(
            provider.open_file(&foreign, OpenMode::Read),
            Err(Error::ForeignAuthority { .. })
        ));
    }

    #[test]
    fn test_write_open_registers_handle() {
        let dir = tempfile::tempdir().unwrap();
        let (_, provider) = provider(&dir);
        let handle = Handle::new();
        let uri = ContentUri::copy(provider.authority(), handle).to_uri().unwrap();

        provider.open_file(&uri, OpenMode::WriteAppend).unwrap().write_all(b"ab").unwrap();
        provider.open_file(&uri, OpenMode::WriteAppend).unwrap().write_all(b"cd").unwrap();
        assert_eq!(provider.tracked_handles(), vec![handle]);
        assert_eq!(std::fs::read(provider.blob_path(&handle)).unwrap(), b"abcd");
    }

    #[test]
    fn test_clear_and_check_paths() {
        let dir = tempfile::tempdir().unwrap();
        let (_, provider) = provider(&dir);
        let clear = ContentUri::clear(provider.authority()).to_uri().unwrap();
        let check = ContentUri::check(provider.authority()).to_uri().unwrap();

        assert!(!provider.query(&check).unwrap());
        let handles = publish(&provider, &[b"1", b"2"]);
        assert!(provider.query(&check).unwrap());

        assert_eq!(provider.delete(&clear).unwrap(), 2);
        assert!(!provider.query(&check).unwrap());
        assert!(handles.iter().all(|handle| !provider.blob_path(handle).exists()));
        assert_eq!(provider.delete(&clear).unwrap(), 0);

        assert!(matches!(provider.delete(&check), Err(Error::UnsupportedOperation { .. })));
        assert!(matches!(provider.query(&clear), Err(Error::UnsupportedOperation { .. })));
        assert!(matches!(
            provider.open_file(&clear, OpenMode::Read),
            Err(Error::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_each_publish_replaces_previous_generation() {
        let dir = tempfile::tempdir().unwrap();
        let (_, provider) = provider(&dir);
        let first = publish(&provider, &[b"a", b"b"]);
        let second = publish(&provider, &[b"c"]);

        assert_eq!(provider.tracked_handles(), second);
        assert!(first.iter().all(|handle| !provider.blob_path(handle).exists()));
        assert!(provider.blob_path(&second[0]).exists());
    }

    #[test]
    fn test_registry_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let (config, provider) = provider(&dir);
        let mut handles = publish(&provider, &[b"1", b"2", b"3"]);
        drop(provider);

        let provider = Provider::new(&config).unwrap();
        handles.sort_unstable();
        assert_eq!(provider.tracked_handles(), handles);
        assert!(provider.check());
        assert_eq!(provider.clear(), 3);
    }

    #[test]
    fn test_startup_purges_untracked_files() {
        let dir = tempfile::tempdir().unwrap();
        let (config, provider) = provider(&dir);
        let tracked = publish(&provider, &[b"kept"]);
        let orphan = Handle::new();
        std::fs::write(provider.blob_path(&orphan), b"orphan").unwrap();
        let unrelated = config.blob_dir_path().join("notes.txt");
        std::fs::write(&unrelated, b"unrelated").unwrap();
        drop(provider);

        let provider = Provider::new(&config).unwrap();
        assert!(provider.blob_path(&tracked[0]).exists());
        assert!(!provider.blob_path(&orphan).exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_corrupted_registry_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (config, provider) = provider(&dir);
        let handles = publish(&provider, &[b"1"]);
        drop(provider);
        std::fs::write(config.registry_file_path(), b"\0\0garbage").unwrap();

        let provider = Provider::new(&config).unwrap();
        assert!(!provider.check());
        assert!(!provider.blob_path(&handles[0]).exists());
    }

    #[test]
    fn test_invalid_authority() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            authority: "not an authority".to_string(),
            ..Config::with_base_dir(dir.path())
        };
        assert!(matches!(Provider::new(&config), Err(Error::ContentUri { .. })));
    }

    #[test]
    fn test_sweep_on_foreign_content() {
        let dir = tempfile::tempdir().unwrap();
        let (_, provider) = provider(&dir);
        let handles = publish(&provider, &[b"1", b"2"]);

        let own = SessionEvent::Changed(descriptor(&provider, &handles));
        assert_eq!(provider.handle_event(&own), SweepOutcome::Retained);
        assert!(provider.check());

        let foreign = SessionEvent::Changed(ClipDescriptor::from_text("someone else"));
        assert_eq!(provider.handle_event(&foreign), SweepOutcome::Swept { removed: 2 });
        assert!(!provider.check());
        assert!(handles.iter().all(|handle| !provider.blob_path(handle).exists()));

        assert_eq!(
            provider.handle_event(&SessionEvent::Cleared),
            SweepOutcome::Swept { removed: 0 }
        );
    }

    #[test]
    fn test_unreadable_session_is_abandonment() {
        let dir = tempfile::tempdir().unwrap();
        let (_, provider) = provider(&dir);
        let handles = publish(&provider, &[b"1", b"2"]);

        let unreadable = SessionEvent::Unreadable(clipmux_clipboard::Error::PrimitivePoisoned);
        assert_eq!(provider.handle_event(&unreadable), SweepOutcome::Swept { removed: 2 });
        assert!(!provider.check());
        assert!(handles.iter().all(|handle| !provider.blob_path(handle).exists()));
    }

    #[test]
    fn test_sweep_sees_payloads_of_another_instance() {
        let dir = tempfile::tempdir().unwrap();
        let (config, watcher) = provider(&dir);
        let publisher = Provider::new(&config).unwrap();

        let handles = publish(&publisher, &[b"1"]);
        assert!(watcher.check());
        assert_eq!(watcher.tracked_handles(), handles);

        let session = LocalClipboard::with_content(ClipDescriptor::from_text("foreign"));
        assert_eq!(watcher.on_session_changed(&session), SweepOutcome::Swept { removed: 1 });
        assert!(!publisher.check());
        assert!(!publisher.blob_path(&handles[0]).exists());
        assert!(!Provider::new(&config).unwrap().check());
    }

    #[test]
    fn test_instances_share_one_slot() {
        let dir = tempfile::tempdir().unwrap();
        let (config, first) = provider(&dir);
        let second = Provider::new(&config).unwrap();

        let old = publish(&first, &[b"old"]);
        let new = publish(&second, &[b"new"]);
        assert!(!first.blob_path(&old[0]).exists());
        assert_eq!(first.tracked_handles(), new);

        // a later instance must not purge files tracked by an earlier one
        let third = Provider::new(&config).unwrap();
        assert!(third.blob_path(&new[0]).exists());
        assert_eq!(first.clear(), 1);
        assert!(!second.check());
        assert!(!third.check());
    }

    #[test]
    fn test_failed_write_open_is_not_registered() {
        let dir = tempfile::tempdir().unwrap();
        let (config, provider) = provider(&dir);
        std::fs::remove_dir_all(config.blob_dir_path()).unwrap();

        assert!(provider.lock().allocate().is_err());
        assert!(!provider.check());
        assert!(provider.tracked_handles().is_empty());
    }

    #[test]
    fn test_sweep_reads_session_under_lock() {
        let dir = tempfile::tempdir().unwrap();
        let (_, provider) = provider(&dir);
        let session = LocalClipboard::new();
        let handles = publish(&provider, &[b"1"]);

        session.store(descriptor(&provider, &handles)).unwrap();
        assert_eq!(provider.on_session_changed(&session), SweepOutcome::Retained);

        session.clear().unwrap();
        assert_eq!(provider.on_session_changed(&session), SweepOutcome::Swept { removed: 1 });
    }

    struct ReadOnlyStore(BTreeSet<String>);

    impl KeyValueStore for ReadOnlyStore {
        fn get_string_set(&self, _key: &str) -> Result<Option<BTreeSet<String>>> {
            Ok(Some(self.0.clone()))
        }

        fn put_string_set(&mut self, _key: &str, _values: &BTreeSet<String>) -> Result<()> {
            Err(Error::WriteFile {
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                file_path: "registry.json".into(),
            })
        }

        fn remove(&mut self, key: &str) -> Result<()> { self.put_string_set(key, &BTreeSet::new()) }
    }

    #[test]
    fn test_persistence_failure_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_base_dir(dir.path());
        let store = Box::new(ReadOnlyStore(BTreeSet::new()));
        let provider = Provider::with_store(&config, store).unwrap();

        let handles = publish(&provider, &[b"1"]);
        assert_eq!(provider.tracked_handles(), handles);
        assert_eq!(provider.clear(), 1);
        assert!(!provider.check());
    }
}
