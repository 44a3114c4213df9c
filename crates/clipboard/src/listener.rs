use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
    time::Duration,
};

use snafu::ResultExt;

use crate::{
    error,
    pubsub::{Publisher, Subscriber},
    Error,
};

/// Watches the host clipboard by polling its text content.
#[derive(Debug)]
pub struct Listener {
    publisher: Arc<Publisher>,
    is_running: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl Listener {
    /// # Errors
    pub fn new(poll_interval: Duration) -> Result<Self, Error> {
        let publisher = Arc::new(Publisher::new());
        let is_running = Arc::new(AtomicBool::new(true));

        let join_handle = std::thread::Builder::new()
            .name("clipmux-listener".to_string())
            .spawn({
                let publisher = publisher.clone();
                let is_running = is_running.clone();
                move || {
                    let mut clipboard = arboard::Clipboard::new()
                        .map_err(|err| tracing::warn!("Could not open clipboard, error: {err}"))
                        .ok();
                    let mut last_digest = clipboard.as_mut().and_then(text_digest);
                    while is_running.load(Ordering::Acquire) {
                        std::thread::sleep(poll_interval);
                        if clipboard.is_none() {
                            clipboard = arboard::Clipboard::new().ok();
                        }
                        let digest = clipboard.as_mut().and_then(text_digest);
                        if digest != last_digest {
                            tracing::trace!("Clipboard content changed");
                            last_digest = digest;
                            publisher.notify_all();
                        }
                    }
                }
            })
            .context(error::SpawnListenerSnafu)?;

        Ok(Self { publisher, is_running, join_handle: Some(join_handle) })
    }

    #[inline]
    pub fn subscribe(&self) -> Subscriber { self.publisher.subscribe() }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::Release);
        self.publisher.close();
        if let Some(join_handle) = self.join_handle.take() {
            let _unused = join_handle.join();
        }
    }
}

fn text_digest(clipboard: &mut arboard::Clipboard) -> Option<u64> {
    clipboard.get_text().ok().map(|text| {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        hasher.finish()
    })
}
