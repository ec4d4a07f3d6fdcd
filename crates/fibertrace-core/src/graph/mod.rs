//! Path tracing over a project's plant records.
//!
//! [`NetworkView`] indexes one project snapshot for next-hop lookups,
//! [`PathTracer`] walks it segment by segment, and [`TraceReport`]
//! carries the resulting path, loss totals, and highlight sets.

mod resolve;

pub mod report;
pub mod trace;
pub mod view;

pub use report::{PathSegment, PathStatus, SegmentDetail, SegmentKind, TraceReport};
pub use trace::{PathTracer, StartNode, TraceDirection, TraceStart, trace_fiber_path};
pub use view::NetworkView;
