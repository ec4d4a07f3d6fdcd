// ── Reactive inventory store ──
//
// Lock-free record storage with push-based change notification, plus
// the bulk-load seam (`InventorySource`) the graph view consumes.

mod collection;
mod inventory;
mod source;

pub use inventory::InventoryStore;
pub use source::{InventorySource, ProjectSnapshot};
