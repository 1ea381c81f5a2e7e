use std::collections::BTreeMap;
use std::sync::RwLock;

use invsys_core::{Entity, StoreError};

/// In-memory record table keyed by entity id, for tests/dev.
///
/// A poisoned lock surfaces as [`StoreError::Unavailable`] rather than an
/// empty result, so callers never mistake a broken store for "no records".
#[derive(Debug)]
pub struct RecordTable<E: Entity> {
    inner: RwLock<BTreeMap<E::Id, E>>,
}

impl<E: Entity> RecordTable<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<E: Entity> Default for RecordTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RecordTable<E>
where
    E: Entity + Clone,
{
    pub fn get(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    pub fn find(&self, predicate: impl Fn(&E) -> bool) -> Result<Option<E>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|record| predicate(record)).cloned())
    }

    pub fn list(&self) -> Result<Vec<E>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().cloned().collect())
    }

    /// Insert `record` unless `conflicts` matches an existing record.
    pub fn insert_unique(
        &self,
        record: E,
        conflicts: impl Fn(&E) -> bool,
    ) -> Result<Option<E::Id>, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.values().any(|existing| conflicts(existing)) {
            return Ok(None);
        }
        let id = record.id();
        map.insert(id, record);
        Ok(Some(id))
    }

    /// Apply `change` to the record with `id` under the write lock and return
    /// the updated record.
    pub fn update(&self, id: E::Id, change: impl FnOnce(&mut E)) -> Result<E, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let record = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        change(record);
        Ok(record.clone())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.len())
    }
}

fn poisoned() -> StoreError {
    StoreError::unavailable("in-memory store lock poisoned")
}
