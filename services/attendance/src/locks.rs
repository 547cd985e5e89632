//! Per-(session, claimant) serialization of issue/redeem.
//!
//! The attendance primary key is what guarantees one record per pair across
//! processes; these locks only keep a single process from racing its own
//! read-modify-write of a verification code.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type PairKey = (Uuid, Uuid);

#[derive(Clone, Default)]
pub struct PairLocks {
    slots: Arc<Mutex<HashMap<PairKey, Arc<AsyncMutex<()>>>>>,
}

impl PairLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `(session_id, claimant_id)`. Released on drop.
    pub async fn acquire(&self, session_id: Uuid, claimant_id: Uuid) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // A slot only the map still references has no holder and no waiter.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry((session_id, claimant_id)).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of pairs currently held or awaited.
    #[cfg(test)]
    fn in_flight(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| Arc::strong_count(slot) > 1)
            .count()
    }
}
