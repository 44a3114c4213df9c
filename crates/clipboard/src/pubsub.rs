use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::{Condvar, Mutex};

use crate::{ClipboardWait, Error};

#[derive(Clone, Copy, Debug)]
struct State {
    generation: u64,
    running: bool,
}

type Inner = Arc<(Mutex<State>, Condvar)>;

#[derive(Debug)]
pub struct Publisher(Inner);

impl Default for Publisher {
    fn default() -> Self { Self::new() }
}

impl Publisher {
    pub fn new() -> Self {
        Self(Arc::new((Mutex::new(State { generation: 0, running: true }), Condvar::new())))
    }

    /// Creates a subscriber that wakes up on changes published after this call.
    pub fn subscribe(&self) -> Subscriber {
        let (lock, _) = &*self.0;
        let generation = lock.lock().generation;
        Subscriber { inner: self.0.clone(), seen: AtomicU64::new(generation) }
    }

    pub fn notify_all(&self) {
        let (lock, condvar) = &*self.0;
        {
            let mut state = lock.lock();
            state.generation = state.generation.wrapping_add(1);
        }
        let _unused = condvar.notify_all();
    }

    pub fn close(&self) {
        let (lock, condvar) = &*self.0;
        lock.lock().running = false;
        let _unused = condvar.notify_all();
    }
}

impl Drop for Publisher {
    fn drop(&mut self) { self.close(); }
}

#[derive(Debug)]
pub struct Subscriber {
    inner: Inner,
    seen: AtomicU64,
}

impl Clone for Subscriber {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), seen: AtomicU64::new(self.seen.load(Ordering::Acquire)) }
    }
}

impl Subscriber {
    // Pending changes are reported before the closed state.
    fn poll(&self, state: &State) -> Option<Result<(), Error>> {
        if state.generation != self.seen.load(Ordering::Acquire) {
            self.seen.store(state.generation, Ordering::Release);
            Some(Ok(()))
        } else if state.running {
            None
        } else {
            Some(Err(Error::NotifierClosed))
        }
    }
}

impl ClipboardWait for Subscriber {
    fn wait(&self) -> Result<(), Error> {
        let (lock, condvar) = &*self.inner;
        let mut state = lock.lock();
        loop {
            if let Some(result) = self.poll(&state) {
                return result;
            }
            condvar.wait(&mut state);
        }
    }

    fn wait_timeout(&self, timeout: Duration) -> Result<bool, Error> {
        let (lock, condvar) = &*self.inner;
        let mut state = lock.lock();
        if let Some(result) = self.poll(&state) {
            return result.map(|()| true);
        }
        let _timed_out = condvar.wait_for(&mut state, timeout);
        self.poll(&state).map_or(Ok(false), |result| result.map(|()| true))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Publisher;
    use crate::{ClipboardWait, Error};

    #[test]
    fn test_change_before_wait_is_not_lost() {
        let publisher = Publisher::new();
        let subscriber = publisher.subscribe();
        publisher.notify_all();
        assert!(subscriber.wait_timeout(Duration::from_millis(10)).unwrap());
        assert!(!subscriber.wait_timeout(Duration::from_millis(10)).unwrap());
    }

    #[test]
    fn test_subscriber_ignores_earlier_changes() {
        let publisher = Publisher::new();
        publisher.notify_all();
        let subscriber = publisher.subscribe();
        assert!(!subscriber.wait_timeout(Duration::from_millis(10)).unwrap());
    }

    #[test]
    fn test_close_wakes_up_waiter() {
        let publisher = Publisher::new();
        let subscriber = publisher.subscribe();
        let waiter = std::thread::spawn(move || subscriber.wait());
        std::thread::sleep(Duration::from_millis(20));
        drop(publisher);
        assert!(matches!(waiter.join().unwrap(), Err(Error::NotifierClosed)));
    }

    #[test]
    fn test_wait_across_threads() {
        let publisher = Publisher::new();
        let subscriber = publisher.subscribe();
        let waiter = std::thread::spawn(move || subscriber.wait());
        std::thread::sleep(Duration::from_millis(20));
        publisher.notify_all();
        assert!(waiter.join().unwrap().is_ok());
    }
}
