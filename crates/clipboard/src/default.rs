use std::{sync::Arc, time::Duration};

use clipmux_base::ClipDescriptor;

use crate::{
    listener::Listener, uri_list, ClipboardLoad, ClipboardStore, ClipboardSubscribe, Error,
    Subscriber,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// The system clipboard.
///
/// Descriptors are stored as text in the form written by [`uri_list::encode`].
#[derive(Clone, Debug)]
pub struct Clipboard {
    listener: Arc<Listener>,
}

impl Clipboard {
    /// # Errors
    pub fn new(poll_interval: Duration) -> Result<Self, Error> {
        let listener = Arc::new(Listener::new(poll_interval)?);
        Ok(Self { listener })
    }
}

impl ClipboardSubscribe for Clipboard {
    type Subscriber = Subscriber;

    fn subscribe(&self) -> Result<Self::Subscriber, Error> { Ok(self.listener.subscribe()) }
}

impl ClipboardLoad for Clipboard {
    fn load(&self) -> Result<ClipDescriptor, Error> {
        let text = arboard::Clipboard::new()?.get_text()?;
        uri_list::decode(&text).ok_or(Error::Empty)
    }
}

impl ClipboardStore for Clipboard {
    #[cfg(all(
        unix,
        not(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "android",
            target_os = "emscripten"
        ))
    ))]
    fn store(&self, descriptor: ClipDescriptor) -> Result<(), Error> {
        use arboard::SetExtLinux;
        use snafu::ResultExt;

        let mut arboard = arboard::Clipboard::new()?;
        let text = uri_list::encode(&descriptor);

        // X11 and Wayland only keep the content while its owner is alive.
        let _join_handle = std::thread::Builder::new()
            .name("clipmux-owner".to_string())
            .spawn({
                let text = text.clone();
                move || {
                    if let Err(err) = arboard.set().wait().text(text) {
                        tracing::warn!("Could not provide clipboard content, error: {err}");
                    }
                }
            })
            .context(crate::error::SpawnOwnerSnafu)?;

        wait_until_visible(&text);
        Ok(())
    }

    #[cfg(not(all(
        unix,
        not(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "android",
            target_os = "emscripten"
        ))
    )))]
    fn store(&self, descriptor: ClipDescriptor) -> Result<(), Error> {
        arboard::Clipboard::new()?.set_text(uri_list::encode(&descriptor))?;
        Ok(())
    }

    #[inline]
    fn clear(&self) -> Result<(), Error> {
        arboard::Clipboard::new()?.clear()?;
        Ok(())
    }
}

// Readers must observe the new content once `store` returns.
#[cfg(all(
    unix,
    not(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "android",
        target_os = "emscripten"
    ))
))]
fn wait_until_visible(text: &str) {
    const VISIBILITY_CHECK_INTERVAL: Duration = Duration::from_millis(10);
    const VISIBILITY_CHECK_LIMIT: usize = 100;

    for _ in 0..VISIBILITY_CHECK_LIMIT {
        let visible = arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.get_text())
            .is_ok_and(|current| current == text);
        if visible {
            return;
        }
        std::thread::sleep(VISIBILITY_CHECK_INTERVAL);
    }
    tracing::warn!("Clipboard content is still not visible after storing");
}
