// ── Cable domain types ──
//
// A cable is a bundle of numbered fibers (1-based) running between two
// endpoints. The A/B side labels are directional but arbitrary: they do
// not mean source/destination.

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// Which physical end of a cable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndSide {
    A,
    B,
}

impl EndSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Kind of node a cable end lands on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EndpointKind {
    Olt,
    Enclosure,
}

/// Where one end of a cable terminates. An absent end on the cable is an
/// unterminated (open) end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CableEnd {
    pub kind: EndpointKind,
    pub id: EntityId,
}

/// A reference to one fiber within a cable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiberRef {
    pub cable: EntityId,
    pub fiber: u32,
}

/// A fiber cable run between two plant nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cable {
    pub id: EntityId,
    pub project: EntityId,
    pub name: String,
    pub fiber_count: u32,
    pub end_a: Option<CableEnd>,
    pub end_b: Option<CableEnd>,
}

impl Cable {
    pub fn end(&self, side: EndSide) -> Option<&CableEnd> {
        match side {
            EndSide::A => self.end_a.as_ref(),
            EndSide::B => self.end_b.as_ref(),
        }
    }

    /// The side terminating at a given enclosure, if either does.
    pub fn side_at_enclosure(&self, enclosure: &EntityId) -> Option<EndSide> {
        self.side_at(EndpointKind::Enclosure, enclosure)
    }

    /// The side terminating at a given OLT, if either does.
    pub fn side_at_olt(&self, olt: &EntityId) -> Option<EndSide> {
        self.side_at(EndpointKind::Olt, olt)
    }

    pub fn has_fiber(&self, fiber: u32) -> bool {
        (1..=self.fiber_count).contains(&fiber)
    }

    fn side_at(&self, kind: EndpointKind, id: &EntityId) -> Option<EndSide> {
        let matches = |end: &Option<CableEnd>| {
            end.as_ref()
                .is_some_and(|e| e.kind == kind && e.id == *id)
        };
        if matches(&self.end_a) {
            Some(EndSide::A)
        } else if matches(&self.end_b) {
            Some(EndSide::B)
        } else {
            None
        }
    }
}
