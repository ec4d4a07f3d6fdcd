// ── Central inventory store ──
//
// Thread-safe, lock-free storage for all plant records of all projects.
// The editing application writes; traces read via point-in-time
// snapshots, so a walk never observes a half-applied edit.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use super::collection::EntityCollection;
use super::source::{InventorySource, ProjectSnapshot};
use crate::error::InventoryError;
use crate::model::{
    Cable, Enclosure, EnclosurePort, EntityId, InventoryRecord, Olt, Splice, Splitter, Tray,
};

/// Upsert all incoming records, then prune the project's existing ids
/// not in the incoming set. This avoids the brief empty state that a
/// clear-then-insert approach would cause.
fn upsert_and_prune<T: InventoryRecord>(
    collection: &EntityCollection<T>,
    project: &EntityId,
    incoming: Vec<T>,
) {
    let incoming_ids: HashSet<EntityId> =
        incoming.iter().map(|r| r.record_id().clone()).collect();
    for record in incoming {
        collection.upsert(record);
    }
    for existing in collection.for_project(project) {
        if !incoming_ids.contains(existing.record_id()) {
            collection.remove(existing.record_id());
        }
    }
}

/// Central reactive store for plant inventory.
///
/// Thread-safe and lock-free: all reads are wait-free, writes use
/// fine-grained per-shard locks within `DashMap`. Any mutation bumps
/// the store version broadcast to subscribers, which is the signal a
/// consumer uses to decide when a cached trace is stale.
pub struct InventoryStore {
    olts: EntityCollection<Olt>,
    enclosures: EntityCollection<Enclosure>,
    cables: EntityCollection<Cable>,
    trays: EntityCollection<Tray>,
    splices: EntityCollection<Splice>,
    splitters: EntityCollection<Splitter>,
    ports: EntityCollection<EnclosurePort>,
    version: watch::Sender<u64>,
    last_applied: watch::Sender<Option<DateTime<Utc>>>,
}

impl InventoryStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (last_applied, _) = watch::channel(None);

        Self {
            olts: EntityCollection::new(),
            enclosures: EntityCollection::new(),
            cables: EntityCollection::new(),
            trays: EntityCollection::new(),
            splices: EntityCollection::new(),
            splitters: EntityCollection::new(),
            ports: EntityCollection::new(),
            version,
            last_applied,
        }
    }

    // ── Bulk application ─────────────────────────────────────────────

    /// Apply a full project snapshot.
    ///
    /// Uses upsert-then-prune scoped to the snapshot's project: incoming
    /// records are upserted first, then the project's ids not present in
    /// the incoming set are removed. Other projects are untouched.
    pub fn apply_snapshot(&self, snap: ProjectSnapshot) {
        let project = snap.project.clone();
        let records = snap.record_count();

        upsert_and_prune(&self.olts, &project, snap.olts);
        upsert_and_prune(&self.enclosures, &project, snap.enclosures);
        upsert_and_prune(&self.cables, &project, snap.cables);
        upsert_and_prune(&self.trays, &project, snap.trays);
        upsert_and_prune(&self.splices, &project, snap.splices);
        upsert_and_prune(&self.splitters, &project, snap.splitters);
        upsert_and_prune(&self.ports, &project, snap.ports);

        self.last_applied.send_replace(Some(snap.taken_at));
        self.bump_version();

        debug!(project = %project, records, "applied inventory snapshot");
    }

    /// Assemble a point-in-time snapshot of one project.
    pub fn snapshot_now(&self, project: &EntityId) -> ProjectSnapshot {
        fn owned<T: InventoryRecord>(records: Vec<Arc<T>>) -> Vec<T> {
            records.iter().map(|r| (**r).clone()).collect()
        }

        ProjectSnapshot {
            project: project.clone(),
            taken_at: Utc::now(),
            olts: owned(self.olts.for_project(project)),
            enclosures: owned(self.enclosures.for_project(project)),
            cables: owned(self.cables.for_project(project)),
            trays: owned(self.trays.for_project(project)),
            splices: owned(self.splices.for_project(project)),
            splitters: owned(self.splitters.for_project(project)),
            ports: owned(self.ports.for_project(project)),
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub fn upsert_olt(&self, olt: Olt) -> bool {
        let is_new = self.olts.upsert(olt);
        self.bump_version();
        is_new
    }

    pub fn upsert_enclosure(&self, enclosure: Enclosure) -> bool {
        let is_new = self.enclosures.upsert(enclosure);
        self.bump_version();
        is_new
    }

    pub fn upsert_cable(&self, cable: Cable) -> bool {
        let is_new = self.cables.upsert(cable);
        self.bump_version();
        is_new
    }

    pub fn upsert_tray(&self, tray: Tray) -> bool {
        let is_new = self.trays.upsert(tray);
        self.bump_version();
        is_new
    }

    pub fn upsert_splice(&self, splice: Splice) -> bool {
        let is_new = self.splices.upsert(splice);
        self.bump_version();
        is_new
    }

    pub fn upsert_splitter(&self, splitter: Splitter) -> bool {
        let is_new = self.splitters.upsert(splitter);
        self.bump_version();
        is_new
    }

    pub fn upsert_port(&self, port: EnclosurePort) -> bool {
        let is_new = self.ports.upsert(port);
        self.bump_version();
        is_new
    }

    pub fn remove_splice(&self, id: &EntityId) -> Option<Arc<Splice>> {
        let removed = self.splices.remove(id);
        if removed.is_some() {
            self.bump_version();
        }
        removed
    }

    pub fn remove_port(&self, id: &EntityId) -> Option<Arc<EnclosurePort>> {
        let removed = self.ports.remove(id);
        if removed.is_some() {
            self.bump_version();
        }
        removed
    }

    // ── Single-record lookups ────────────────────────────────────────

    pub fn olt(&self, id: &EntityId) -> Option<Arc<Olt>> {
        self.olts.get(id)
    }

    pub fn enclosure(&self, id: &EntityId) -> Option<Arc<Enclosure>> {
        self.enclosures.get(id)
    }

    pub fn cable(&self, id: &EntityId) -> Option<Arc<Cable>> {
        self.cables.get(id)
    }

    pub fn tray(&self, id: &EntityId) -> Option<Arc<Tray>> {
        self.trays.get(id)
    }

    pub fn splice(&self, id: &EntityId) -> Option<Arc<Splice>> {
        self.splices.get(id)
    }

    pub fn splitter(&self, id: &EntityId) -> Option<Arc<Splitter>> {
        self.splitters.get(id)
    }

    pub fn port(&self, id: &EntityId) -> Option<Arc<EnclosurePort>> {
        self.ports.get(id)
    }

    // ── Project listings ─────────────────────────────────────────────

    pub fn olts_in_project(&self, project: &EntityId) -> Vec<Arc<Olt>> {
        self.olts.for_project(project)
    }

    pub fn enclosures_in_project(&self, project: &EntityId) -> Vec<Arc<Enclosure>> {
        self.enclosures.for_project(project)
    }

    pub fn cables_in_project(&self, project: &EntityId) -> Vec<Arc<Cable>> {
        self.cables.for_project(project)
    }

    pub fn splices_in_project(&self, project: &EntityId) -> Vec<Arc<Splice>> {
        self.splices.for_project(project)
    }

    // ── Cross-field lookups ──────────────────────────────────────────

    pub fn ports_in_enclosure(&self, enclosure: &EntityId) -> Vec<Arc<EnclosurePort>> {
        self.ports
            .snapshot()
            .iter()
            .filter(|p| p.enclosure == *enclosure)
            .map(Arc::clone)
            .collect()
    }

    pub fn splices_in_tray(&self, tray: &EntityId) -> Vec<Arc<Splice>> {
        self.splices
            .snapshot()
            .iter()
            .filter(|s| s.tray == *tray)
            .map(Arc::clone)
            .collect()
    }

    pub fn splices_on_cable(&self, cable: &EntityId) -> Vec<Arc<Splice>> {
        self.splices
            .snapshot()
            .iter()
            .filter(|s| s.cable_a == *cable || s.cable_b == *cable)
            .map(Arc::clone)
            .collect()
    }

    // ── Counts ───────────────────────────────────────────────────────

    pub fn record_count(&self) -> usize {
        self.olts.len()
            + self.enclosures.len()
            + self.cables.len()
            + self.trays.len()
            + self.splices.len()
            + self.splitters.len()
            + self.ports.len()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Subscribe to the store version; it bumps on every mutation.
    pub fn subscribe_version(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    pub fn last_applied(&self) -> Option<DateTime<Utc>> {
        *self.last_applied.borrow()
    }

    /// How long ago the last snapshot was applied, or `None` if never.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_applied().map(|t| Utc::now() - t)
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InventorySource for InventoryStore {
    fn project_snapshot(
        &self,
        project: &EntityId,
    ) -> impl std::future::Future<Output = Result<ProjectSnapshot, InventoryError>> + Send {
        let snap = self.snapshot_now(project);
        async move { Ok(snap) }
    }
}
