//! Identity-keyed execution registry
//!
//! Maps each live builder instance to its pending-or-settled execution
//! future. The registry is what serializes overlapping triggers on one
//! instance and replays memoized outcomes; instances on different keys
//! never wait on each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use futures::future::{BoxFuture, Shared};

use crate::error::ApiError;
use crate::response::ApiResponse;

/// Identity token minted for each builder instance at construction time.
///
/// Registry entries are keyed by identity, never by structural equality:
/// two structurally identical instances occupy distinct slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub(crate) fn mint() -> RequestId {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        RequestId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A registry slot: a cloneable handle on one execution outcome.
pub(crate) type ChainSlot = Shared<BoxFuture<'static, Result<ApiResponse, ApiError>>>;

/// Per-client execution registry.
#[derive(Default)]
pub(crate) struct ExecChains {
    slots: Mutex<HashMap<RequestId, ChainSlot>>,
}

impl ExecChains {
    /// Install the next slot for `id`, handing the current slot (if any) to
    /// `make` so the new execution can wait for it to settle first.
    ///
    /// With `reuse` set and a slot already present, that slot is returned
    /// unchanged and nothing new is installed (run-once memoization).
    ///
    /// The read-current/install-next sequence happens under a single lock
    /// acquisition with no intervening await, which is what keeps
    /// overlapping triggers on the same instance strictly FIFO even on a
    /// multi-threaded runtime.
    pub fn advance<F>(&self, id: RequestId, reuse: bool, make: F) -> ChainSlot
    where
        F: FnOnce(Option<ChainSlot>) -> ChainSlot,
    {
        let mut slots = self.slots.lock().unwrap();
        if reuse {
            if let Some(slot) = slots.get(&id) {
                return slot.clone();
            }
        }
        let next = make(slots.get(&id).cloned());
        slots.insert(id, next.clone());
        next
    }

    /// Drop the slot of an instance that went out of scope.
    pub fn evict(&self, id: RequestId) {
        self.slots.lock().unwrap().remove(&id);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::Value;

    fn outcome(status: u16) -> Result<ApiResponse, ApiError> {
        Ok(ApiResponse {
            status,
            headers: HashMap::new(),
            body: Value::Null,
            ok: (200..300).contains(&status),
            content_type: None,
        })
    }

    fn slot(status: u16) -> ChainSlot {
        async move { outcome(status) }.boxed().shared()
    }

    #[test]
    fn minted_ids_are_unique() {
        let a = RequestId::mint();
        let b = RequestId::mint();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn reuse_returns_the_installed_slot_unchanged() {
        let chains = ExecChains::default();
        let id = RequestId::mint();

        let first = chains.advance(id, true, |_| slot(200));
        let mut remade = false;
        let second = chains.advance(id, true, |_| {
            remade = true;
            slot(500)
        });

        assert!(!remade);
        assert_eq!(first.await.unwrap().status, 200);
        assert_eq!(second.await.unwrap().status, 200);
    }

    #[tokio::test]
    async fn without_reuse_the_previous_slot_is_handed_to_make() {
        let chains = ExecChains::default();
        let id = RequestId::mint();

        chains.advance(id, false, |prev| {
            assert!(prev.is_none());
            slot(200)
        });
        let next = chains.advance(id, false, |prev| {
            assert!(prev.is_some());
            slot(201)
        });

        assert_eq!(next.await.unwrap().status, 201);
        assert_eq!(chains.len(), 1);
    }

    #[tokio::test]
    async fn evicted_slots_are_gone() {
        let chains = ExecChains::default();
        let id = RequestId::mint();

        chains.advance(id, false, |_| slot(200));
        assert_eq!(chains.len(), 1);

        chains.evict(id);
        assert_eq!(chains.len(), 0);
    }
}
