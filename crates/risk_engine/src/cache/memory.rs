//! In-process cache backend.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use async_trait::async_trait;

use super::{CacheEntry, CacheError, CacheStore};
use crate::fingerprint::Fingerprint;
use crate::outcome::SimulationOutcome;

/// Hash-map cache guarded by a read-write lock.
///
/// A poisoned lock is reported as [`CacheError::Unavailable`].
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<Fingerprint, CacheEntry>>,
}

impl InMemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Fingerprint, CacheEntry>>, CacheError> {
        self.entries
            .read()
            .map_err(|_| CacheError::Unavailable("cache lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<Fingerprint, CacheEntry>>, CacheError> {
        self.entries
            .write()
            .map_err(|_| CacheError::Unavailable("cache lock poisoned".to_string()))
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<Arc<SimulationOutcome>>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.read()?;
            match entries.get(fingerprint) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired_at(now) => {
                    return Ok(Some(entry.outcome.clone()))
                }
                Some(_) => {}
            }
        }

        // Expired: drop it unless it was replaced in the meantime
        let mut entries = self.write()?;
        if entries
            .get(fingerprint)
            .is_some_and(|entry| entry.is_expired_at(now))
        {
            entries.remove(fingerprint);
        }
        Ok(None)
    }

    async fn insert_if_absent(&self, entry: CacheEntry) -> Result<bool, CacheError> {
        let now = Instant::now();
        let mut entries = self.write()?;
        if entries
            .get(&entry.fingerprint)
            .is_some_and(|existing| !existing.is_expired_at(now))
        {
            return Ok(false);
        }
        entries.insert(entry.fingerprint.clone(), entry);
        Ok(true)
    }

    async fn remove(&self, fingerprint: &Fingerprint) -> Result<bool, CacheError> {
        Ok(self.write()?.remove(fingerprint).is_some())
    }

    async fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Instant::now();
        let mut entries = self.write()?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        Ok(before - entries.len())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        Ok(self.read()?.len())
    }
}
