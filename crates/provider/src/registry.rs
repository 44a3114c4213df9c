use std::collections::BTreeSet;

use clipmux_base::{Handle, REGISTRY_FILES_KEY};

use crate::store::KeyValueStore;

/// The set of handles published by one provider, mirrored in its key-value store.
///
/// Persistence failures are logged and never surface to callers; the in-memory
/// set always reflects the latest call.
pub struct HandleRegistry {
    store: Box<dyn KeyValueStore>,
    handles: BTreeSet<Handle>,
}

impl std::fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleRegistry").field("handles", &self.handles).finish_non_exhaustive()
    }
}

impl HandleRegistry {
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let handles = read_handles(store.as_ref());
        tracing::debug!("Load {} handle(s) from registry", handles.len());
        Self { store, handles }
    }

    /// Replaces the in-memory set if another process changed the store.
    pub fn reload(&mut self) {
        match self.store.reload() {
            Ok(true) => {
                self.handles = read_handles(self.store.as_ref());
                tracing::debug!("Reload {} handle(s) from registry", self.handles.len());
            }
            Ok(false) => {}
            Err(err) => tracing::warn!("Could not reload handle registry, error: {err}"),
        }
    }

    #[inline]
    pub fn contains(&self, handle: &Handle) -> bool { self.handles.contains(handle) }

    #[inline]
    pub fn is_empty(&self) -> bool { self.handles.is_empty() }

    #[inline]
    pub fn len(&self) -> usize { self.handles.len() }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Handle> { self.handles.iter() }

    /// Returns `false` if `handle` was already tracked.
    pub fn add(&mut self, handle: Handle) -> bool {
        if !self.handles.insert(handle) {
            return false;
        }
        self.persist();
        true
    }

    /// Returns `false` if `handle` was not tracked.
    pub fn remove(&mut self, handle: &Handle) -> bool {
        if !self.handles.remove(handle) {
            return false;
        }
        self.persist();
        true
    }

    /// Forgets every handle and returns them.
    pub fn remove_all(&mut self) -> BTreeSet<Handle> {
        let handles = std::mem::take(&mut self.handles);
        if let Err(err) = self.store.remove(REGISTRY_FILES_KEY) {
            tracing::error!("Could not persist handle registry, error: {err}");
        }
        handles
    }

    fn persist(&mut self) {
        let values = self.handles.iter().map(ToString::to_string).collect::<BTreeSet<_>>();
        if let Err(err) = self.store.put_string_set(REGISTRY_FILES_KEY, &values) {
            tracing::error!("Could not persist handle registry, error: {err}");
        }
    }
}

fn read_handles(store: &dyn KeyValueStore) -> BTreeSet<Handle> {
    match store.get_string_set(REGISTRY_FILES_KEY) {
        Ok(Some(values)) => values
            .into_iter()
            .filter_map(|value| {
                value
                    .parse::<Handle>()
                    .map_err(|err| tracing::warn!("Skip registry entry, error: {err}"))
                    .ok()
            })
            .collect(),
        Ok(None) => BTreeSet::new(),
        Err(err) => {
            tracing::error!("Could not load handle registry, error: {err}");
            BTreeSet::new()
        }
    }
}
