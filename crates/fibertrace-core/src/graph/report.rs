// ── Trace report ──
//
// The serializable result of a path trace: the start segment, every hop
// beyond it, loss accounting, and the node/edge id sets a map layer
// highlights.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{CustomerInfo, EntityId, FiberColor, PortStatus, SplitRatio, SpliceStatus};

/// Whether the walk reached a real terminus or stopped short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PathStatus {
    /// Ended at a connected customer port or the OLT head end.
    Complete,
    /// Ended at an open port, an open cable end, or a dark slot.
    Partial,
}

/// Coarse classification of a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SegmentKind {
    OltPort,
    Cable,
    Splice,
    Splitter,
    Port,
    OpenEnd,
}

/// Per-kind payload of a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SegmentDetail {
    OltPort {
        olt: EntityId,
        port: u32,
        tx_power_dbm: Option<f64>,
    },
    Cable {
        cable: EntityId,
        fiber: u32,
        fiber_count: u32,
    },
    Splice {
        splice: EntityId,
        tray: EntityId,
        status: SpliceStatus,
        recorded_loss_db: Option<f64>,
        color_a: FiberColor,
        color_b: FiberColor,
    },
    Splitter {
        splitter: EntityId,
        ratio: SplitRatio,
        /// Leg the walk left through; `None` when the walk stopped at
        /// the splitter itself.
        output: Option<u32>,
    },
    Port {
        port: EntityId,
        enclosure: EntityId,
        number: u32,
        status: PortStatus,
        customer: Option<CustomerInfo>,
        rx_power_dbm: Option<f64>,
    },
    OpenEnd {
        enclosure: Option<EntityId>,
    },
}

/// One hop of a traced path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    /// Display label, e.g. `"FEEDER-01"` or `"tray 1: C1 f5 / C2 f2"`.
    pub name: String,
    /// Fiber number the signal arrives on, where one applies.
    pub fiber_in: Option<u32>,
    /// Fiber number the signal leaves on.
    pub fiber_out: Option<u32>,
    /// Loss contributed by this segment.
    pub loss_db: f64,
    pub detail: SegmentDetail,
}

impl PathSegment {
    pub fn kind(&self) -> SegmentKind {
        match self.detail {
            SegmentDetail::OltPort { .. } => SegmentKind::OltPort,
            SegmentDetail::Cable { .. } => SegmentKind::Cable,
            SegmentDetail::Splice { .. } => SegmentKind::Splice,
            SegmentDetail::Splitter { .. } => SegmentKind::Splitter,
            SegmentDetail::Port { .. } => SegmentKind::Port,
            SegmentDetail::OpenEnd { .. } => SegmentKind::OpenEnd,
        }
    }

    /// Id of the record behind this segment, when one exists.
    pub fn node_id(&self) -> Option<&EntityId> {
        match &self.detail {
            SegmentDetail::OltPort { olt, .. } => Some(olt),
            SegmentDetail::Cable { cable, .. } => Some(cable),
            SegmentDetail::Splice { splice, .. } => Some(splice),
            SegmentDetail::Splitter { splitter, .. } => Some(splitter),
            SegmentDetail::Port { port, .. } => Some(port),
            SegmentDetail::OpenEnd { enclosure } => enclosure.as_ref(),
        }
    }

    pub fn customer(&self) -> Option<&CustomerInfo> {
        if let SegmentDetail::Port { customer, .. } = &self.detail {
            customer.as_ref()
        } else {
            None
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match (self.fiber_in, self.fiber_out) {
            (Some(a), Some(b)) if a == b => write!(f, " f{a}")?,
            (Some(a), Some(b)) => write!(f, " f{a}>f{b}")?,
            (Some(a), None) => write!(f, " f{a}")?,
            (None, Some(b)) => write!(f, " >f{b}")?,
            (None, None) => {}
        }
        write!(f, " ({:.2} dB)", self.loss_db)
    }
}

/// Result of a successful walk.
///
/// `start` is where the trace was anchored; `segments` lists every hop
/// beyond it in walk order. Loss totals and counts cover both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceReport {
    pub start: PathSegment,
    pub segments: Vec<PathSegment>,
    pub status: PathStatus,
    pub total_loss_db: f64,
    pub splice_count: usize,
    pub connector_count: usize,
    /// Record ids of equipment on the path, for map highlighting.
    pub highlighted_nodes: HashSet<EntityId>,
    /// Cable and splice ids on the path.
    pub highlighted_edges: HashSet<EntityId>,
}

impl TraceReport {
    pub fn is_complete(&self) -> bool {
        self.status == PathStatus::Complete
    }

    /// The segment the walk ended on.
    pub fn terminus(&self) -> &PathSegment {
        self.segments.last().unwrap_or(&self.start)
    }

    /// Customer at the terminus, if the path lands on a wired port.
    pub fn customer(&self) -> Option<&CustomerInfo> {
        self.terminus().customer()
    }

    /// Hops beyond the start segment.
    pub fn hop_count(&self) -> usize {
        self.segments.len()
    }

    /// Start segment followed by every hop, in walk order.
    pub fn full_path(&self) -> impl Iterator<Item = &PathSegment> {
        std::iter::once(&self.start).chain(self.segments.iter())
    }
}

impl fmt::Display for TraceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "trace {}: {} hops, {:.2} dB, {} splices, {} connectors",
            self.status,
            self.hop_count(),
            self.total_loss_db,
            self.splice_count,
            self.connector_count
        )?;
        for segment in self.full_path() {
            writeln!(f, "  {segment}")?;
        }
        Ok(())
    }
}

/// Accumulates segments and highlight sets during a walk.
pub(crate) struct ReportBuilder {
    start: PathSegment,
    segments: Vec<PathSegment>,
    nodes: HashSet<EntityId>,
    edges: HashSet<EntityId>,
}

impl ReportBuilder {
    pub(crate) fn new(start: PathSegment) -> Self {
        Self {
            start,
            segments: Vec::new(),
            nodes: HashSet::new(),
            edges: HashSet::new(),
        }
    }

    pub(crate) fn push_segment(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub(crate) fn mark_node(&mut self, id: EntityId) {
        self.nodes.insert(id);
    }

    pub(crate) fn mark_edge(&mut self, id: EntityId) {
        self.edges.insert(id);
    }

    /// Record which leg the walk took after a fanout was settled. The
    /// splitter segment is pushed before the leg is known; a trace
    /// anchored at the splitter patches the start segment instead.
    pub(crate) fn set_last_splitter_output(&mut self, output: u32) {
        let target = self.segments.last_mut().unwrap_or(&mut self.start);
        if let SegmentDetail::Splitter { output: slot, .. } = &mut target.detail {
            *slot = Some(output);
        }
    }

    pub(crate) fn finish(self, status: PathStatus) -> TraceReport {
        let mut total_loss_db = 0.0;
        let mut splice_count = 0;
        let mut connector_count = 0;
        for segment in std::iter::once(&self.start).chain(self.segments.iter()) {
            total_loss_db += segment.loss_db;
            match segment.detail {
                SegmentDetail::Splice { .. } => splice_count += 1,
                SegmentDetail::OltPort { .. } | SegmentDetail::Port { .. } => connector_count += 1,
                _ => {}
            }
        }
        TraceReport {
            start: self.start,
            segments: self.segments,
            status,
            total_loss_db,
            splice_count,
            connector_count,
            highlighted_nodes: self.nodes,
            highlighted_edges: self.edges,
        }
    }
}
