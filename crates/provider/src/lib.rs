mod blob;
mod config;
mod error;
mod event;
mod gc;
mod lock;
mod provider;
mod registry;
mod store;

pub use self::{
    blob::BlobStore,
    config::Config,
    error::{Error, Result},
    event::{SessionEvent, SweepOutcome},
    gc::{GarbageCollector, Options as GarbageCollectorOptions},
    lock::{ProcessLock, ProcessLockGuard},
    provider::{Provider, Transaction},
    registry::HandleRegistry,
    store::{FileKeyValueStore, KeyValueStore},
};
