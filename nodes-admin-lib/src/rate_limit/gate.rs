//! Concurrency cap shared across clients

use std::sync::Arc;

use tokio::sync::OwnedSemaphorePermit;
use tokio::sync::Semaphore;

/// Caps how many requests one client has on the wire at once.
///
/// Clones share the cap, so clients built with the same gate share it too.
/// The dashboard loads a handful of panels together, so the default is 8.
#[derive(Clone)]
pub struct RequestGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl RequestGate {
    /// A gate admitting `capacity` requests (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot. The slot frees up when the permit drops.
    pub(crate) async fn enter(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.permits).acquire_owned().await.ok()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Requests currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new(8)
    }
}

impl std::fmt::Debug for RequestGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RequestGate({}/{})", self.in_flight(), self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_slots_are_shared_and_returned() {
        let gate = RequestGate::new(2);
        let other = gate.clone();
        let slot = gate.enter().await;
        assert!(slot.is_some());
        assert_eq!(other.in_flight(), 1);
        drop(slot);
        assert_eq!(other.in_flight(), 0);
        assert_eq!(RequestGate::new(0).capacity(), 1);
    }
}
