use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::StagingKey;

type Slot = Arc<AsyncMutex<()>>;

/// One async mutex per staging key.
///
/// Holders of a key's guard may await node calls; submissions for other
/// keys never contend on it. A key's slot lives only while someone holds
/// or waits for it.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<StagingKey, Slot>>,
}

/// Exclusive hold on one key. Dropping it releases the key and frees the
/// slot when nobody else is waiting.
#[derive(Debug)]
pub struct KeyGuard<'a> {
    locks: &'a KeyedLocks,
    key: StagingKey,
    held: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &StagingKey) -> KeyGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(*key).or_default())
        };
        let held = slot.lock_owned().await;
        KeyGuard {
            locks: self,
            key: *key,
            held: Some(held),
        }
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, key: &StagingKey) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots
            .get(key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(key);
        }
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so the owned guard's reference to the slot is gone.
        self.held.take();
        self.locks.release(&self.key);
    }
}
