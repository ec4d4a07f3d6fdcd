//! Path tracing core for FTTH plant inventories.
//!
//! This crate owns the domain model, inventory storage, and trace
//! engine for the fibertrace workspace:
//!
//! - **[`InventoryStore`]** — Lock-free reactive storage built on
//!   `EntityCollection<T>` (`DashMap` + `tokio::sync::watch` channels).
//!   Applies per-project snapshots, prunes records that disappeared,
//!   and vends point-in-time copies through [`InventorySource`].
//!
//! - **[`NetworkView`]** — Immutable per-project index of the plant,
//!   rebuilt per trace: splice locations, splitter feeds and egresses,
//!   port assignments, cable endpoints, PON feeds.
//!
//! - **[`PathTracer`]** / [`trace_fiber_path()`] — Segment-by-segment
//!   walk with cycle detection, a hop budget shared with branch probes,
//!   and the single-live-branch heuristic for settling splitter
//!   fanouts.
//!
//! - **[`TraceReport`]** — Ordered path segments with loss accounting,
//!   splice and connector counts, and node/edge highlight sets for map
//!   rendering. [`LossBudget`] checks a report against a PON power
//!   budget.
//!
//! - **Domain model** ([`model`]) — Canonical plant types (`Olt`,
//!   `Cable`, `Splice`, `Splitter`, `EnclosurePort`, etc.) with
//!   [`EntityId`] supporting both UUID and legacy string identifiers.

pub mod budget;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use budget::{BudgetEvaluation, LossBudget};
pub use config::TraceConfig;
pub use error::{FailureReason, InventoryError, TraceError};
pub use graph::{
    NetworkView, PathSegment, PathStatus, PathTracer, SegmentDetail, SegmentKind, StartNode,
    TraceDirection, TraceReport, TraceStart, trace_fiber_path,
};
pub use store::{InventorySource, InventoryStore, ProjectSnapshot};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Cables and fibers
    Cable,
    CableEnd,
    // Customer attachment
    CustomerInfo,
    // Enclosures and trays
    Enclosure,
    EnclosureKind,
    EnclosurePort,
    EndSide,
    EndpointKind,
    EntityId,
    FiberColor,
    FiberRef,
    GeoPoint,
    InventoryRecord,
    // Head end
    Olt,
    ParentKind,
    ParentLink,
    PonPort,
    PortStatus,
    SplitRatio,
    // Splices and splitters
    Splice,
    SpliceStatus,
    Splitter,
    SplitterEgress,
    SplitterOutput,
    Tray,
};
