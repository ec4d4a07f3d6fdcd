// ── Splice domain types ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// Field workflow status of a fusion splice.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SpliceStatus {
    Pending,
    Completed,
    NeedsReview,
    Failed,
}

/// A fusion splice joining one fiber to another inside a tray.
///
/// The a/b side labels mirror how the splice was recorded; they carry no
/// upstream/downstream meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Splice {
    pub id: EntityId,
    pub project: EntityId,
    pub tray: EntityId,
    pub cable_a: EntityId,
    pub fiber_a: u32,
    pub cable_b: EntityId,
    pub fiber_b: u32,
    /// Measured insertion loss, when the tech recorded one.
    pub loss_db: Option<f64>,
    pub status: SpliceStatus,
}

impl Splice {
    pub fn joins(&self, cable: &EntityId, fiber: u32) -> bool {
        (self.cable_a == *cable && self.fiber_a == fiber)
            || (self.cable_b == *cable && self.fiber_b == fiber)
    }

    /// The far side relative to an entry on (cable, fiber), if this
    /// splice joins that fiber.
    pub fn far_side(&self, cable: &EntityId, fiber: u32) -> Option<(&EntityId, u32)> {
        if self.cable_a == *cable && self.fiber_a == fiber {
            Some((&self.cable_b, self.fiber_b))
        } else if self.cable_b == *cable && self.fiber_b == fiber {
            Some((&self.cable_a, self.fiber_a))
        } else {
            None
        }
    }
}
