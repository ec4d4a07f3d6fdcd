// ── Path tracer ──
//
// Walks the plant segment by segment from an anchored start node until
// the signal terminates, the path breaks, or a budget trips. Splitter
// fanouts are settled by the single-live-branch heuristic when enabled;
// probe walks share the hop budget of the trace that spawned them.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TraceConfig;
use crate::error::TraceError;
use crate::model::{Enclosure, EndSide, EndpointKind, EntityId, FiberColor};
use crate::store::InventorySource;

use super::report::{PathSegment, PathStatus, ReportBuilder, SegmentDetail, TraceReport};
use super::resolve::{self, Branch, Node, NodeKey, Resolution, Terminus};
use super::view::NetworkView;

/// Which way a trace walks relative to the OLT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TraceDirection {
    /// Toward the OLT head end.
    Upstream,
    /// Away from the OLT, toward customers.
    Downstream,
}

/// Record type a trace is anchored on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "kebab-case")]
pub enum StartNode {
    Olt(EntityId),
    Cable(EntityId),
    Splice(EntityId),
    Splitter(EntityId),
    Port(EntityId),
}

impl StartNode {
    fn type_name(&self) -> &'static str {
        match self {
            StartNode::Olt(_) => "olt",
            StartNode::Cable(_) => "cable",
            StartNode::Splice(_) => "splice",
            StartNode::Splitter(_) => "splitter",
            StartNode::Port(_) => "port",
        }
    }

    fn id(&self) -> &EntityId {
        match self {
            StartNode::Olt(id)
            | StartNode::Cable(id)
            | StartNode::Splice(id)
            | StartNode::Splitter(id)
            | StartNode::Port(id) => id,
        }
    }
}

/// Anchor for a trace.
///
/// `fiber` picks a pon port, fiber, or splitter output where the node
/// type needs one; splice and port anchors ignore it. `direction`
/// defaults to upstream for ports and downstream for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStart {
    pub node: StartNode,
    #[serde(default)]
    pub fiber: Option<u32>,
    #[serde(default)]
    pub direction: Option<TraceDirection>,
}

impl TraceStart {
    pub fn olt_port(olt: impl Into<EntityId>, port: u32) -> Self {
        Self {
            node: StartNode::Olt(olt.into()),
            fiber: Some(port),
            direction: None,
        }
    }

    pub fn cable_fiber(cable: impl Into<EntityId>, fiber: u32) -> Self {
        Self {
            node: StartNode::Cable(cable.into()),
            fiber: Some(fiber),
            direction: None,
        }
    }

    pub fn splice(id: impl Into<EntityId>) -> Self {
        Self {
            node: StartNode::Splice(id.into()),
            fiber: None,
            direction: None,
        }
    }

    pub fn splitter(id: impl Into<EntityId>) -> Self {
        Self {
            node: StartNode::Splitter(id.into()),
            fiber: None,
            direction: None,
        }
    }

    pub fn splitter_output(id: impl Into<EntityId>, output: u32) -> Self {
        Self {
            node: StartNode::Splitter(id.into()),
            fiber: Some(output),
            direction: None,
        }
    }

    pub fn port(id: impl Into<EntityId>) -> Self {
        Self {
            node: StartNode::Port(id.into()),
            fiber: None,
            direction: None,
        }
    }

    /// Override the default walk direction.
    #[must_use]
    pub fn towards(mut self, direction: TraceDirection) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Walks paths over one [`NetworkView`].
pub struct PathTracer<'a> {
    view: &'a NetworkView,
    config: &'a TraceConfig,
}

impl<'a> PathTracer<'a> {
    pub fn new(view: &'a NetworkView, config: &'a TraceConfig) -> Self {
        Self { view, config }
    }

    /// Trace from `start` until the signal terminates.
    pub fn trace(&self, start: &TraceStart) -> Result<TraceReport, TraceError> {
        let direction = start.direction.unwrap_or(match start.node {
            StartNode::Port(_) => TraceDirection::Upstream,
            _ => TraceDirection::Downstream,
        });
        let origin = self.materialize(start, direction)?;
        debug!(start = %origin.locus(), %direction, "starting path trace");

        let start_segment = self.describe(&origin);
        let mut last_fiber = start_segment.fiber_out;
        let mut builder = ReportBuilder::new(start_segment);
        self.mark(&mut builder, &origin);

        let mut visited: HashSet<NodeKey> = HashSet::new();
        visited.insert(origin.key());
        let mut hops: usize = 0;
        let mut current = origin;

        loop {
            hops += 1;
            if hops > self.config.max_hops {
                return Err(TraceError::HopBudgetExceeded {
                    limit: self.config.max_hops,
                });
            }
            match resolve::resolve(self.view, &current, direction) {
                Resolution::Next(next) => {
                    self.step(&mut builder, &mut visited, &mut last_fiber, &next, hops)?;
                    current = next;
                }
                Resolution::Fanout(branches) => {
                    let (output, next) =
                        self.choose_branch(&current, branches, &visited, &mut hops)?;
                    builder.set_last_splitter_output(output);
                    self.step(&mut builder, &mut visited, &mut last_fiber, &next, hops)?;
                    current = next;
                }
                Resolution::Terminal(terminus) => {
                    let report = Self::finish(builder, terminus, last_fiber);
                    debug!(status = %report.status, hops = report.hop_count(),
                        loss_db = report.total_loss_db, "path trace finished");
                    return Ok(report);
                }
                Resolution::Broken { at, missing } => {
                    return Err(TraceError::Disconnected { at, missing });
                }
            }
        }
    }

    /// Advance the walk onto `next`, recording its segment.
    fn step(
        &self,
        builder: &mut ReportBuilder,
        visited: &mut HashSet<NodeKey>,
        last_fiber: &mut Option<u32>,
        next: &Node,
        hops: usize,
    ) -> Result<(), TraceError> {
        if !visited.insert(next.key()) {
            return Err(TraceError::Cycle {
                at: next.locus(),
                hops,
            });
        }
        let segment = self.describe(next);
        *last_fiber = segment.fiber_out;
        self.mark(builder, next);
        builder.push_segment(segment);
        Ok(())
    }

    fn finish(
        mut builder: ReportBuilder,
        terminus: Terminus,
        last_fiber: Option<u32>,
    ) -> TraceReport {
        match terminus {
            Terminus::Customer | Terminus::OltHead => builder.finish(PathStatus::Complete),
            Terminus::OpenPort => builder.finish(PathStatus::Partial),
            Terminus::OpenEnd { enclosure } => {
                if let Some(enc) = &enclosure {
                    builder.mark_node(enc.id.clone());
                }
                builder.push_segment(open_end_segment(enclosure.as_ref(), last_fiber));
                builder.finish(PathStatus::Partial)
            }
        }
    }

    /// Settle a splitter fanout: a lone linked output is followed
    /// directly; otherwise the heuristic probes each leg and follows
    /// the only one that reaches a connected customer.
    fn choose_branch(
        &self,
        splitter: &Node,
        mut branches: Vec<Branch>,
        visited: &HashSet<NodeKey>,
        hops: &mut usize,
    ) -> Result<(u32, Node), TraceError> {
        let total = branches.len();
        if total == 1 {
            if let Some(branch) = branches.pop() {
                return Ok((branch.output, branch.node));
            }
        }
        if !self.config.prefer_single_live_branch {
            return Err(TraceError::BranchAmbiguous {
                at: splitter.locus(),
                detail: format!(
                    "{total} linked outputs; start from a specific output to disambiguate"
                ),
            });
        }
        let mut live: Vec<(u32, Node)> = Vec::new();
        for branch in branches {
            let customers = self.probe(&branch.node, visited.clone(), hops)?;
            if customers > 0 {
                live.push((branch.output, branch.node));
            }
        }
        if live.len() == 1 {
            if let Some(choice) = live.pop() {
                return Ok(choice);
            }
        }
        let detail = if live.is_empty() {
            format!("no output reaches a connected customer ({total} linked outputs)")
        } else {
            format!(
                "{}/{total} outputs reach a connected customer",
                live.len()
            )
        };
        Err(TraceError::BranchAmbiguous {
            at: splitter.locus(),
            detail,
        })
    }

    /// Count customers reachable downstream of `node`, stopping early
    /// once more than one is found. Shares the caller's hop budget;
    /// cycles and breaks count as unreachable.
    fn probe(
        &self,
        node: &Node,
        mut seen: HashSet<NodeKey>,
        hops: &mut usize,
    ) -> Result<usize, TraceError> {
        if !seen.insert(node.key()) {
            return Ok(0);
        }
        let mut current = node.clone();
        loop {
            *hops += 1;
            if *hops > self.config.max_hops {
                return Err(TraceError::HopBudgetExceeded {
                    limit: self.config.max_hops,
                });
            }
            match resolve::resolve(self.view, &current, TraceDirection::Downstream) {
                Resolution::Next(next) => {
                    if !seen.insert(next.key()) {
                        return Ok(0);
                    }
                    current = next;
                }
                Resolution::Fanout(branches) => {
                    let mut customers = 0;
                    for branch in branches {
                        customers += self.probe(&branch.node, seen.clone(), hops)?;
                        if customers > 1 {
                            break;
                        }
                    }
                    return Ok(customers);
                }
                Resolution::Terminal(Terminus::Customer) => return Ok(1),
                Resolution::Terminal(_) | Resolution::Broken { .. } => return Ok(0),
            }
        }
    }

    /// Turn a [`TraceStart`] into a concrete graph node.
    fn materialize(&self, start: &TraceStart, direction: TraceDirection) -> Result<Node, TraceError> {
        let not_found = |node_type: &str| TraceError::NotFound {
            node_type: node_type.to_string(),
            id: start.node.id().clone(),
        };
        match &start.node {
            StartNode::Olt(id) => {
                let olt = self
                    .view
                    .olt(id)
                    .ok_or_else(|| not_found(start.node.type_name()))?;
                let port = match start.fiber {
                    Some(number) => {
                        if olt.pon_port(number).is_none() {
                            return Err(not_found(&format!("pon port {number} on olt")));
                        }
                        number
                    }
                    None => {
                        let cabled: Vec<u32> = olt
                            .pon_ports
                            .iter()
                            .filter(|p| p.cable.is_some())
                            .map(|p| p.number)
                            .collect();
                        match cabled.as_slice() {
                            [] => return Err(not_found("cabled pon port on olt")),
                            [one] => *one,
                            many => {
                                return Err(TraceError::BranchAmbiguous {
                                    at: format!("olt {}", olt.name),
                                    detail: format!(
                                        "{} cabled pon ports; pass a port number",
                                        many.len()
                                    ),
                                });
                            }
                        }
                    }
                };
                Ok(Node::OltPort {
                    olt: Arc::clone(olt),
                    port,
                })
            }
            StartNode::Cable(id) => {
                let cable = self
                    .view
                    .cable(id)
                    .ok_or_else(|| not_found(start.node.type_name()))?;
                let fiber = match start.fiber {
                    Some(number) => {
                        if !cable.has_fiber(number) {
                            return Err(not_found(&format!("fiber {number} on cable")));
                        }
                        number
                    }
                    None if cable.fiber_count == 1 => 1,
                    None => {
                        return Err(TraceError::BranchAmbiguous {
                            at: format!("cable {}", cable.name),
                            detail: format!(
                                "{} fibers; pass a fiber number",
                                cable.fiber_count
                            ),
                        });
                    }
                };
                // Downstream rides away from the OLT-anchored end, or
                // toward B when neither end is at an OLT.
                let olt_side = match (&cable.end_a, &cable.end_b) {
                    (Some(a), _) if a.kind == EndpointKind::Olt => Some(EndSide::A),
                    (_, Some(b)) if b.kind == EndpointKind::Olt => Some(EndSide::B),
                    _ => None,
                };
                let downstream_exit = olt_side.map_or(EndSide::B, EndSide::opposite);
                let exit = match direction {
                    TraceDirection::Downstream => downstream_exit,
                    TraceDirection::Upstream => downstream_exit.opposite(),
                };
                Ok(Node::CableFiber {
                    cable: Arc::clone(cable),
                    fiber,
                    exit,
                })
            }
            StartNode::Splice(id) => {
                let splice = self
                    .view
                    .splice(id)
                    .ok_or_else(|| not_found(start.node.type_name()))?;
                let (entered_cable, entered_fiber) = match direction {
                    // Entering on side A exits via B, and vice versa.
                    TraceDirection::Downstream => (splice.cable_a.clone(), splice.fiber_a),
                    TraceDirection::Upstream => (splice.cable_b.clone(), splice.fiber_b),
                };
                Ok(Node::Splice {
                    splice: Arc::clone(splice),
                    entered_cable,
                    entered_fiber,
                })
            }
            StartNode::Splitter(id) => {
                let splitter = self
                    .view
                    .splitter(id)
                    .ok_or_else(|| not_found(start.node.type_name()))?;
                let output = match start.fiber {
                    Some(number) => {
                        if splitter.output(number).is_none() {
                            return Err(not_found(&format!("output {number} on splitter")));
                        }
                        Some(number)
                    }
                    None => None,
                };
                Ok(Node::Splitter {
                    splitter: Arc::clone(splitter),
                    output,
                })
            }
            StartNode::Port(id) => {
                let port = self
                    .view
                    .port(id)
                    .ok_or_else(|| not_found(start.node.type_name()))?;
                Ok(Node::Port {
                    port: Arc::clone(port),
                })
            }
        }
    }

    /// Render a node as a report segment.
    fn describe(&self, node: &Node) -> PathSegment {
        match node {
            Node::OltPort { olt, port } => {
                let pon = olt.pon_port(*port);
                PathSegment {
                    name: format!("{} pon {port}", olt.name),
                    fiber_in: None,
                    fiber_out: pon.and_then(|p| p.cable.as_ref().map(|_| p.feeder_fiber())),
                    loss_db: self.config.connector_loss_db,
                    detail: SegmentDetail::OltPort {
                        olt: olt.id.clone(),
                        port: *port,
                        tx_power_dbm: pon.and_then(|p| p.tx_power_dbm),
                    },
                }
            }
            Node::CableFiber { cable, fiber, .. } => PathSegment {
                name: cable.name.clone(),
                fiber_in: Some(*fiber),
                fiber_out: Some(*fiber),
                loss_db: 0.0,
                detail: SegmentDetail::Cable {
                    cable: cable.id.clone(),
                    fiber: *fiber,
                    fiber_count: cable.fiber_count,
                },
            },
            Node::Splice {
                splice,
                entered_cable,
                entered_fiber,
            } => {
                let name = match self.view.tray(&splice.tray) {
                    Some(tray) => {
                        let name_a = self
                            .view
                            .cable(&splice.cable_a)
                            .map_or_else(|| splice.cable_a.to_string(), |c| c.name.clone());
                        let name_b = self
                            .view
                            .cable(&splice.cable_b)
                            .map_or_else(|| splice.cable_b.to_string(), |c| c.name.clone());
                        format!(
                            "tray {}: {name_a} f{} / {name_b} f{}",
                            tray.number, splice.fiber_a, splice.fiber_b
                        )
                    }
                    None => format!("splice {}", splice.id),
                };
                PathSegment {
                    name,
                    fiber_in: Some(*entered_fiber),
                    fiber_out: splice.far_side(entered_cable, *entered_fiber).map(|(_, f)| f),
                    loss_db: splice.loss_db.unwrap_or(self.config.default_splice_loss_db),
                    detail: SegmentDetail::Splice {
                        splice: splice.id.clone(),
                        tray: splice.tray.clone(),
                        status: splice.status,
                        recorded_loss_db: splice.loss_db,
                        color_a: FiberColor::for_fiber(splice.fiber_a),
                        color_b: FiberColor::for_fiber(splice.fiber_b),
                    },
                }
            }
            Node::Splitter { splitter, output } => PathSegment {
                name: splitter
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{} splitter", splitter.ratio)),
                fiber_in: splitter.input.as_ref().map(|i| i.fiber),
                fiber_out: None,
                loss_db: splitter.effective_loss_db(),
                detail: SegmentDetail::Splitter {
                    splitter: splitter.id.clone(),
                    ratio: splitter.ratio,
                    output: *output,
                },
            },
            Node::Port { port } => {
                let enclosure_name = self
                    .view
                    .enclosure(&port.enclosure)
                    .map_or_else(|| port.enclosure.to_string(), |e| e.name.clone());
                PathSegment {
                    name: format!("port {} @ {enclosure_name}", port.number),
                    fiber_in: Some(port.number),
                    fiber_out: None,
                    loss_db: self.config.connector_loss_db,
                    detail: SegmentDetail::Port {
                        port: port.id.clone(),
                        enclosure: port.enclosure.clone(),
                        number: port.number,
                        status: port.status,
                        customer: port.customer.clone(),
                        rx_power_dbm: port.rx_power_dbm,
                    },
                }
            }
        }
    }

    /// Record highlight ids for a node the walk passed through.
    fn mark(&self, builder: &mut ReportBuilder, node: &Node) {
        match node {
            Node::OltPort { olt, .. } => builder.mark_node(olt.id.clone()),
            Node::CableFiber { cable, .. } => builder.mark_edge(cable.id.clone()),
            Node::Splice { splice, .. } => {
                builder.mark_edge(splice.id.clone());
                if let Some(enclosure) = self.view.splice_enclosure(splice) {
                    builder.mark_node(enclosure.id.clone());
                }
            }
            Node::Splitter { splitter, .. } => {
                builder.mark_node(splitter.id.clone());
                builder.mark_node(splitter.enclosure.clone());
            }
            Node::Port { port } => {
                builder.mark_node(port.id.clone());
                builder.mark_node(port.enclosure.clone());
            }
        }
    }
}

fn open_end_segment(enclosure: Option<&Arc<Enclosure>>, fiber: Option<u32>) -> PathSegment {
    let name = match enclosure {
        Some(enc) => format!("open end @ {}", enc.name),
        None => "open end (unterminated)".to_string(),
    };
    PathSegment {
        name,
        fiber_in: fiber,
        fiber_out: None,
        loss_db: 0.0,
        detail: SegmentDetail::OpenEnd {
            enclosure: enclosure.map(|e| e.id.clone()),
        },
    }
}

/// Snapshot a project from `source`, build the view, and trace.
///
/// The one-call surface most callers want; hold a [`NetworkView`] and a
/// [`PathTracer`] directly to run many traces against one snapshot.
pub async fn trace_fiber_path<S: InventorySource>(
    source: &S,
    project: &EntityId,
    start: &TraceStart,
    config: &TraceConfig,
) -> Result<TraceReport, TraceError> {
    let view = NetworkView::load(source, project).await?;
    PathTracer::new(&view, config).trace(start)
}
