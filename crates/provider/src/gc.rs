use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
    time::Duration,
};

use clipmux_clipboard::{ClipboardLoad, ClipboardSubscribe, ClipboardWait};
use snafu::ResultExt;

use crate::{error, Provider, Result, SweepOutcome};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Options {
    /// Upper bound on how long a shutdown request may go unnoticed.
    pub wait_interval: Duration,

    /// Sweep once against the current session before waiting for changes.
    pub sweep_on_start: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { wait_interval: Duration::from_millis(200), sweep_on_start: false }
    }
}

/// Deletes the provider's payloads once the shared clipboard stops showing them.
#[derive(Debug)]
pub struct GarbageCollector {
    is_running: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl GarbageCollector {
    /// Subscribes to `session` and reacts to its changes on a dedicated thread.
    ///
    /// # Errors
    pub fn spawn<S>(provider: Arc<Provider>, session: S, opts: Options) -> Result<Self>
    where
        S: ClipboardLoad + ClipboardSubscribe + Send + 'static,
        S::Subscriber: 'static,
    {
        let subscriber = session.subscribe().context(error::SubscribeSessionSnafu)?;
        let is_running = Arc::new(AtomicBool::new(true));

        let join_handle = std::thread::Builder::new()
            .name("clipmux-gc".to_string())
            .spawn({
                let is_running = is_running.clone();
                move || {
                    tracing::info!("Garbage collector for `{}` is started", provider.authority());
                    if opts.sweep_on_start {
                        log_outcome(provider.on_session_changed(&session));
                    }

                    while is_running.load(Ordering::Acquire) {
                        match subscriber.wait_timeout(opts.wait_interval) {
                            Ok(true) => log_outcome(provider.on_session_changed(&session)),
                            Ok(false) => {}
                            Err(clipmux_clipboard::Error::NotifierClosed) => {
                                tracing::info!("Clipboard session notifier is closed");
                                break;
                            }
                            Err(err) => {
                                tracing::error!(
                                    "Could not wait for clipboard session, error: {err}"
                                );
                                break;
                            }
                        }
                    }
                    tracing::info!("Garbage collector for `{}` is stopped", provider.authority());
                }
            })
            .context(error::SpawnCollectorSnafu)?;

        Ok(Self { is_running, join_handle: Some(join_handle) })
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.join_handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops the worker and waits for it to exit.
    pub fn shutdown(mut self) { self.stop(); }

    fn stop(&mut self) {
        self.is_running.store(false, Ordering::Release);
        if let Some(join_handle) = self.join_handle.take() {
            if join_handle.join().is_err() {
                tracing::error!("Garbage collector thread panicked");
            }
        }
    }
}

impl Drop for GarbageCollector {
    fn drop(&mut self) { self.stop(); }
}

fn log_outcome(outcome: SweepOutcome) {
    match outcome {
        SweepOutcome::Retained => tracing::trace!("Clipboard still shows our payloads"),
        SweepOutcome::Swept { removed } => tracing::debug!("Sweep removed {removed} file(s)"),
    }
}
