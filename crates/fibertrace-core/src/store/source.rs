// ── Inventory load seam ──
//
// The tracer never talks to persistence directly. It asks an
// `InventorySource` for one project's records in a single call, so the
// resulting view is always derived from one internally consistent
// point-in-time snapshot.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;
use crate::model::{Cable, Enclosure, EnclosurePort, EntityId, Olt, Splice, Splitter, Tray};

/// Point-in-time bulk export of one project's inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub project: EntityId,
    pub taken_at: DateTime<Utc>,
    #[serde(default)]
    pub olts: Vec<Olt>,
    #[serde(default)]
    pub enclosures: Vec<Enclosure>,
    #[serde(default)]
    pub cables: Vec<Cable>,
    #[serde(default)]
    pub trays: Vec<Tray>,
    #[serde(default)]
    pub splices: Vec<Splice>,
    #[serde(default)]
    pub splitters: Vec<Splitter>,
    #[serde(default)]
    pub ports: Vec<EnclosurePort>,
}

impl ProjectSnapshot {
    pub fn empty(project: EntityId) -> Self {
        Self {
            project,
            taken_at: Utc::now(),
            olts: Vec::new(),
            enclosures: Vec::new(),
            cables: Vec::new(),
            trays: Vec::new(),
            splices: Vec::new(),
            splitters: Vec::new(),
            ports: Vec::new(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.olts.len()
            + self.enclosures.len()
            + self.cables.len()
            + self.trays.len()
            + self.splices.len()
            + self.splitters.len()
            + self.ports.len()
    }
}

/// Read-only access to project inventory.
///
/// Deliberately a single bulk method: fetching collections one by one
/// could interleave with writes and hand the tracer a torn view.
pub trait InventorySource: Send + Sync {
    fn project_snapshot(
        &self,
        project: &EntityId,
    ) -> impl Future<Output = Result<ProjectSnapshot, InventoryError>> + Send;
}
