// In-memory TTL cache implementing the ResultCache port.
//
// **Eviction is FIFO, not LRU.**
// When the cache grows past its capacity the entry that was inserted first is
// dropped, no matter how recently it was read. Re-inserting an existing key
// replaces the value but keeps its original queue position.
//
// Entries live in a DashMap so concurrent reads never block each other. The
// insertion queue sits behind a Mutex; every structural change (insert, evict,
// remove) takes that lock first, so the map and the queue stay in step.

use crate::core::moderation::{CacheError, CacheKey, ResultCache};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    created_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

pub struct TtlCache<T> {
    entries: DashMap<CacheKey, CacheEntry<T>>,
    order: Mutex<VecDeque<CacheKey>>,
    ttl: Duration,
    capacity: usize,
}

impl<T> TtlCache<T> {
    /// Create an empty cache. A capacity of 0 is treated as 1.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock_order(&self) -> Result<MutexGuard<'_, VecDeque<CacheKey>>, CacheError> {
        self.order
            .lock()
            .map_err(|e| CacheError::Poisoned(e.to_string()))
    }
}

impl<T> ResultCache<T> for TtlCache<T>
where
    T: Clone + Send + Sync,
{
    fn get(&self, key: &CacheKey) -> Result<Option<T>, CacheError> {
        let expired = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(self.ttl) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
        };

        if expired {
            let mut order = self.lock_order()?;
            // Another caller may have refreshed the key in the meantime.
            let ttl = self.ttl;
            if self
                .entries
                .remove_if(key, |_, entry| entry.is_expired(ttl))
                .is_some()
            {
                order.retain(|k| k != key);
            }
        }
        Ok(None)
    }

    fn insert(&self, key: CacheKey, value: T) -> Result<(), CacheError> {
        let mut order = self.lock_order()?;

        let entry = CacheEntry {
            value,
            created_at: Instant::now(),
        };
        if self.entries.insert(key.clone(), entry).is_none() {
            order.push_back(key);
        }

        while self.entries.len() > self.capacity {
            match order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    tracing::debug!(key = %oldest, "Evicted oldest cache entry");
                }
                None => break,
            }
        }
        Ok(())
    }

    fn invalidate_post(&self, post_id: &str) -> Result<usize, CacheError> {
        let mut order = self.lock_order()?;

        let before = order.len();
        order.retain(|k| k.post_id != post_id);
        self.entries.retain(|k, _| k.post_id != post_id);
        Ok(before - order.len())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut order = self.lock_order()?;
        order.clear();
        self.entries.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
