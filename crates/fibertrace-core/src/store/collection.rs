// ── Generic reactive entity collection ──
//
// Lock-free concurrent storage with O(1) id lookups and push-based
// change notification via `watch` channels. One instance per record
// type; the `InventoryStore` facade owns them all.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{EntityId, InventoryRecord};

/// A lock-free, reactive collection for a single record type.
///
/// Records are keyed by their `EntityId`. Every mutation bumps a
/// version counter and rebuilds the snapshot that subscribers receive,
/// so readers always observe a consistent point-in-time vector.
pub(crate) struct EntityCollection<T: InventoryRecord> {
    by_id: DashMap<EntityId, Arc<T>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: InventoryRecord> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or update a record. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, record: T) -> bool {
        let id = record.record_id().clone();
        let is_new = !self.by_id.contains_key(&id);
        self.by_id.insert(id, Arc::new(record));

        self.rebuild_snapshot();
        self.bump_version();

        is_new
    }

    /// Remove a record by id. Returns the removed record if it existed.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<Arc<T>> {
        let removed = self.by_id.remove(id).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Records belonging to one project, from the current snapshot.
    pub(crate) fn for_project(&self, project: &EntityId) -> Vec<Arc<T>> {
        self.snapshot()
            .iter()
            .filter(|r| r.record_project() == project)
            .map(Arc::clone)
            .collect()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    #[allow(dead_code)]
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn ids(&self) -> Vec<EntityId> {
        self.by_id.iter().map(|r| r.key().clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    #[allow(dead_code)]
    pub(crate) fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values into a snapshot vec and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let values: Vec<Arc<T>> = self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    /// Increment the version counter.
    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}
