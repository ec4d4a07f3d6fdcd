// ── Canonical inventory model ──
//
// Every type in this module is the canonical read-only representation of
// a plant record. Lifecycle (create/edit/delete) belongs to the editing
// application; this crate only consumes them.

pub mod cable;
pub mod color;
pub mod common;
pub mod enclosure;
pub mod entity_id;
pub mod olt;
pub mod port;
pub mod splice;
pub mod splitter;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use fibertrace_core::model::*` gives you everything.

pub use cable::{Cable, CableEnd, EndSide, EndpointKind, FiberRef};
pub use color::FiberColor;
pub use common::GeoPoint;
pub use enclosure::{Enclosure, EnclosureKind, ParentKind, ParentLink, Tray};
pub use entity_id::EntityId;
pub use olt::{Olt, PonPort};
pub use port::{CustomerInfo, EnclosurePort, PortStatus};
pub use splice::{Splice, SpliceStatus};
pub use splitter::{SplitRatio, Splitter, SplitterEgress, SplitterOutput};

// ── Record identity ─────────────────────────────────────────────────

/// Uniform access to the id and owning project of any inventory record.
/// The store keys its collections on these.
pub trait InventoryRecord: Clone + Send + Sync + 'static {
    fn record_id(&self) -> &EntityId;
    fn record_project(&self) -> &EntityId;
}

macro_rules! inventory_record {
    ($($ty:ty),+ $(,)?) => {
        $(impl InventoryRecord for $ty {
            fn record_id(&self) -> &EntityId {
                &self.id
            }

            fn record_project(&self) -> &EntityId {
                &self.project
            }
        })+
    };
}

inventory_record!(Cable, Enclosure, EnclosurePort, Olt, Splice, Splitter, Tray);
