// ── Segment resolver ──
//
// One step of a trace: given the node a signal currently occupies and a
// direction, answer what comes next. Pure lookups against the view; the
// walk loop in `trace` owns cycle detection and the hop budget.

use std::sync::Arc;

use tracing::warn;

use crate::model::{
    Cable, Enclosure, EnclosurePort, EndSide, EndpointKind, EntityId, Olt, PortStatus, Splice,
    Splitter, SplitterEgress,
};

use super::trace::TraceDirection;
use super::view::NetworkView;

/// A position the signal can occupy while walking the plant.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    OltPort {
        olt: Arc<Olt>,
        port: u32,
    },
    /// Riding one fiber of a cable toward the `exit` end.
    CableFiber {
        cable: Arc<Cable>,
        fiber: u32,
        exit: EndSide,
    },
    /// Passing through a splice, having entered on the given side.
    Splice {
        splice: Arc<Splice>,
        entered_cable: EntityId,
        entered_fiber: u32,
    },
    /// At a splitter; `output` is the chosen leg, `None` until the walk
    /// picks one going downstream.
    Splitter {
        splitter: Arc<Splitter>,
        output: Option<u32>,
    },
    Port {
        port: Arc<EnclosurePort>,
    },
}

/// Identity of a node for visited-set bookkeeping. Two entries to the
/// same fiber, splice, or splitter collide regardless of direction or
/// chosen leg; that collision is what cycle detection keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum NodeKey {
    OltPort(EntityId, u32),
    CableFiber(EntityId, u32),
    Splice(EntityId),
    Splitter(EntityId),
    Port(EntityId),
}

impl Node {
    pub(crate) fn key(&self) -> NodeKey {
        match self {
            Node::OltPort { olt, port } => NodeKey::OltPort(olt.id.clone(), *port),
            Node::CableFiber { cable, fiber, .. } => NodeKey::CableFiber(cable.id.clone(), *fiber),
            Node::Splice { splice, .. } => NodeKey::Splice(splice.id.clone()),
            Node::Splitter { splitter, .. } => NodeKey::Splitter(splitter.id.clone()),
            Node::Port { port } => NodeKey::Port(port.id.clone()),
        }
    }

    /// Human-readable location for error messages.
    pub(crate) fn locus(&self) -> String {
        match self {
            Node::OltPort { olt, port } => format!("olt {} pon port {port}", olt.name),
            Node::CableFiber { cable, fiber, .. } => {
                format!("cable {} fiber {fiber}", cable.name)
            }
            Node::Splice { splice, .. } => format!("splice {}", splice.id),
            Node::Splitter { splitter, .. } => format!("splitter {}", splitter.id),
            Node::Port { port } => {
                format!("port {} at enclosure {}", port.number, port.enclosure)
            }
        }
    }
}

/// Where a completed or stopped walk ended up.
#[derive(Debug, Clone)]
pub(crate) enum Terminus {
    /// Connected customer port.
    Customer,
    /// Reached the OLT going upstream.
    OltHead,
    /// Port exists but no customer is wired.
    OpenPort,
    /// Fiber goes dark: unterminated cable end, dark enclosure slot, or
    /// an unlinked splitter leg.
    OpenEnd { enclosure: Option<Arc<Enclosure>> },
}

/// One selectable leg of a splitter fanout.
#[derive(Debug, Clone)]
pub(crate) struct Branch {
    pub output: u32,
    pub node: Node,
}

/// Outcome of resolving one step.
#[derive(Debug, Clone)]
pub(crate) enum Resolution {
    Next(Node),
    /// Splitter reached downstream without a chosen leg.
    Fanout(Vec<Branch>),
    Terminal(Terminus),
    /// A record points at something the project does not contain.
    Broken { at: String, missing: String },
}

pub(crate) fn resolve(view: &NetworkView, node: &Node, direction: TraceDirection) -> Resolution {
    match node {
        Node::OltPort { olt, port } => resolve_olt_port(view, olt, *port, direction),
        Node::CableFiber { cable, fiber, exit } => {
            resolve_cable_fiber(view, cable, *fiber, *exit, direction)
        }
        Node::Splice {
            splice,
            entered_cable,
            entered_fiber,
        } => resolve_splice(view, splice, entered_cable, *entered_fiber),
        Node::Splitter { splitter, output } => resolve_splitter(view, splitter, *output, direction),
        Node::Port { port } => resolve_port(view, port, direction),
    }
}

fn resolve_olt_port(view: &NetworkView, olt: &Arc<Olt>, port: u32, direction: TraceDirection) -> Resolution {
    if direction == TraceDirection::Upstream {
        return Resolution::Terminal(Terminus::OltHead);
    }
    let at = format!("olt {} pon port {port}", olt.name);
    let Some(pon) = olt.pon_port(port) else {
        return Resolution::Broken {
            at,
            missing: format!("pon port {port} on olt {}", olt.name),
        };
    };
    let Some(cable_id) = &pon.cable else {
        // Dark port: nothing patched.
        return Resolution::Terminal(Terminus::OpenEnd { enclosure: None });
    };
    let Some(cable) = view.cable(cable_id) else {
        return Resolution::Broken {
            at,
            missing: format!("cable {cable_id}"),
        };
    };
    let fiber = pon.feeder_fiber();
    if !cable.has_fiber(fiber) {
        return Resolution::Broken {
            at,
            missing: format!("fiber {fiber} on cable {} ({} fibers)", cable.name, cable.fiber_count),
        };
    }
    match cable.side_at_olt(&olt.id) {
        Some(side) => Resolution::Next(Node::CableFiber {
            cable: Arc::clone(cable),
            fiber,
            exit: side.opposite(),
        }),
        None => Resolution::Broken {
            at,
            missing: format!("cable {} anchored at olt {}", cable.name, olt.name),
        },
    }
}

fn resolve_cable_fiber(
    view: &NetworkView,
    cable: &Arc<Cable>,
    fiber: u32,
    exit: EndSide,
    direction: TraceDirection,
) -> Resolution {
    let at = format!("cable {} fiber {fiber}", cable.name);
    let Some(end) = cable.end(exit) else {
        return Resolution::Terminal(Terminus::OpenEnd { enclosure: None });
    };
    match end.kind {
        EndpointKind::Olt => {
            if view.olt(&end.id).is_none() {
                return Resolution::Broken {
                    at,
                    missing: format!("olt {}", end.id),
                };
            }
            match view.pon_feed(&cable.id, fiber) {
                Some((olt, port)) if olt.id == end.id => Resolution::Next(Node::OltPort {
                    olt: Arc::clone(olt),
                    port: *port,
                }),
                Some((olt, _)) => {
                    warn!(cable = %cable.id, fiber, end_olt = %end.id, feeding_olt = %olt.id,
                        "pon feed claimed by an olt that is not the cable endpoint");
                    Resolution::Terminal(Terminus::OpenEnd { enclosure: None })
                }
                // Fiber reaches the OLT rack but no pon port is patched
                // to it.
                None => Resolution::Terminal(Terminus::OpenEnd { enclosure: None }),
            }
        }
        EndpointKind::Enclosure => {
            let Some(enclosure) = view.enclosure(&end.id) else {
                return Resolution::Broken {
                    at,
                    missing: format!("enclosure {}", end.id),
                };
            };
            // Splices continue the fiber in either direction.
            if let Some(splice) = view.splice_on(&enclosure.id, &cable.id, fiber) {
                return Resolution::Next(Node::Splice {
                    splice: Arc::clone(splice),
                    entered_cable: cable.id.clone(),
                    entered_fiber: fiber,
                });
            }
            match direction {
                TraceDirection::Downstream => {
                    if let Some(splitter) = view.splitter_fed_by(&cable.id, fiber) {
                        if splitter.enclosure == enclosure.id {
                            return Resolution::Next(Node::Splitter {
                                splitter: Arc::clone(splitter),
                                output: None,
                            });
                        }
                        warn!(splitter = %splitter.id, cable = %cable.id, fiber,
                            enclosure = %enclosure.id,
                            "splitter input fiber lands at a different enclosure; ignoring");
                    }
                    // Convention: fiber n terminates on port n.
                    if let Some(port) = view.port_at(&enclosure.id, fiber) {
                        return Resolution::Next(Node::Port {
                            port: Arc::clone(port),
                        });
                    }
                    Resolution::Terminal(Terminus::OpenEnd {
                        enclosure: Some(Arc::clone(enclosure)),
                    })
                }
                TraceDirection::Upstream => {
                    if let Some((splitter, output)) =
                        view.splitter_egress_at_fiber(&cable.id, fiber)
                    {
                        if splitter.enclosure == enclosure.id {
                            return Resolution::Next(Node::Splitter {
                                splitter: Arc::clone(splitter),
                                output: Some(*output),
                            });
                        }
                        warn!(splitter = %splitter.id, cable = %cable.id, fiber,
                            enclosure = %enclosure.id,
                            "splitter egress fiber lands at a different enclosure; ignoring");
                    }
                    Resolution::Terminal(Terminus::OpenEnd {
                        enclosure: Some(Arc::clone(enclosure)),
                    })
                }
            }
        }
    }
}

fn resolve_splice(
    view: &NetworkView,
    splice: &Arc<Splice>,
    entered_cable: &EntityId,
    entered_fiber: u32,
) -> Resolution {
    let at = format!("splice {}", splice.id);
    let Some((far_cable_id, far_fiber)) = splice.far_side(entered_cable, entered_fiber) else {
        return Resolution::Broken {
            at,
            missing: format!("side {entered_cable} fiber {entered_fiber} on this splice"),
        };
    };
    let Some(enclosure) = view.splice_enclosure(splice) else {
        return Resolution::Broken {
            at,
            missing: format!("tray {} in a known enclosure", splice.tray),
        };
    };
    let Some(far_cable) = view.cable(far_cable_id) else {
        return Resolution::Broken {
            at,
            missing: format!("cable {far_cable_id}"),
        };
    };
    ride_cable_from(far_cable, far_fiber, &enclosure.id, at)
}

fn resolve_splitter(
    view: &NetworkView,
    splitter: &Arc<Splitter>,
    output: Option<u32>,
    direction: TraceDirection,
) -> Resolution {
    let at = match output {
        Some(n) => format!("splitter {} output {n}", splitter.id),
        None => format!("splitter {}", splitter.id),
    };
    match direction {
        TraceDirection::Upstream => {
            let Some(input) = &splitter.input else {
                return Resolution::Terminal(Terminus::OpenEnd {
                    enclosure: view.enclosure(&splitter.enclosure).map(Arc::clone),
                });
            };
            let Some(cable) = view.cable(&input.cable) else {
                return Resolution::Broken {
                    at,
                    missing: format!("cable {}", input.cable),
                };
            };
            ride_cable_from(cable, input.fiber, &splitter.enclosure, at)
        }
        TraceDirection::Downstream => match output {
            Some(number) => {
                let Some(out) = splitter.output(number) else {
                    return Resolution::Broken {
                        at,
                        missing: format!("output {number} on splitter {}", splitter.id),
                    };
                };
                match &out.link {
                    None => Resolution::Terminal(Terminus::OpenEnd {
                        enclosure: view.enclosure(&splitter.enclosure).map(Arc::clone),
                    }),
                    Some(SplitterEgress::CableFiber { cable, fiber }) => {
                        let Some(cable) = view.cable(cable) else {
                            return Resolution::Broken {
                                at,
                                missing: format!("cable {cable}"),
                            };
                        };
                        ride_cable_from(cable, *fiber, &splitter.enclosure, at)
                    }
                    Some(SplitterEgress::EnclosurePort { enclosure, port }) => {
                        match view.port_at(enclosure, *port) {
                            Some(p) => Resolution::Next(Node::Port {
                                port: Arc::clone(p),
                            }),
                            None => Resolution::Broken {
                                at,
                                missing: format!("port {port} at enclosure {enclosure}"),
                            },
                        }
                    }
                }
            }
            None => {
                let mut branches = Vec::new();
                for out in splitter.linked_outputs() {
                    let Some(egress) = &out.link else { continue };
                    match egress_node(view, splitter, egress) {
                        Some(node) => branches.push(Branch {
                            output: out.number,
                            node,
                        }),
                        None => warn!(splitter = %splitter.id, output = out.number,
                            "splitter output has a dangling link; skipping branch"),
                    }
                }
                if branches.is_empty() {
                    Resolution::Terminal(Terminus::OpenEnd {
                        enclosure: view.enclosure(&splitter.enclosure).map(Arc::clone),
                    })
                } else {
                    Resolution::Fanout(branches)
                }
            }
        },
    }
}

fn resolve_port(view: &NetworkView, port: &Arc<EnclosurePort>, direction: TraceDirection) -> Resolution {
    match direction {
        TraceDirection::Downstream => {
            if port.status == PortStatus::Connected {
                Resolution::Terminal(Terminus::Customer)
            } else {
                Resolution::Terminal(Terminus::OpenPort)
            }
        }
        TraceDirection::Upstream => {
            let at = format!("port {} at enclosure {}", port.number, port.enclosure);
            if let Some((splitter, output)) =
                view.splitter_egress_at_port(&port.enclosure, port.number)
            {
                return Resolution::Next(Node::Splitter {
                    splitter: Arc::clone(splitter),
                    output: Some(*output),
                });
            }
            // Convention fallback: the port is fed by fiber n of a cable
            // landing at this enclosure, where n is the port number and
            // the fiber is not already claimed by a splice or splitter.
            let mut candidates: Vec<Arc<Cable>> = Vec::new();
            for cable in view.cables_at(&port.enclosure) {
                if !cable.has_fiber(port.number) {
                    continue;
                }
                if view
                    .splice_on(&port.enclosure, &cable.id, port.number)
                    .is_some()
                {
                    continue;
                }
                if view
                    .splitter_fed_by(&cable.id, port.number)
                    .is_some_and(|s| s.enclosure == port.enclosure)
                {
                    continue;
                }
                if view
                    .splitter_egress_at_fiber(&cable.id, port.number)
                    .is_some_and(|(s, _)| s.enclosure == port.enclosure)
                {
                    continue;
                }
                candidates.push(Arc::clone(cable));
            }
            match candidates.as_slice() {
                [] => Resolution::Terminal(Terminus::OpenEnd {
                    enclosure: view.enclosure(&port.enclosure).map(Arc::clone),
                }),
                [cable] => ride_cable_from(cable, port.number, &port.enclosure, at),
                many => Resolution::Broken {
                    at,
                    missing: format!("unique feeder cable ({} candidates)", many.len()),
                },
            }
        }
    }
}

/// Enter `cable` on the given fiber at `enclosure` and ride toward the
/// far end.
fn ride_cable_from(cable: &Arc<Cable>, fiber: u32, enclosure: &EntityId, at: String) -> Resolution {
    if !cable.has_fiber(fiber) {
        return Resolution::Broken {
            at,
            missing: format!("fiber {fiber} on cable {} ({} fibers)", cable.name, cable.fiber_count),
        };
    }
    match cable.side_at_enclosure(enclosure) {
        Some(side) => Resolution::Next(Node::CableFiber {
            cable: Arc::clone(cable),
            fiber,
            exit: side.opposite(),
        }),
        None => Resolution::Broken {
            at,
            missing: format!("cable {} anchored at this enclosure", cable.name),
        },
    }
}

fn egress_node(view: &NetworkView, splitter: &Splitter, egress: &SplitterEgress) -> Option<Node> {
    match egress {
        SplitterEgress::CableFiber { cable, fiber } => {
            let cable = view.cable(cable)?;
            if !cable.has_fiber(*fiber) {
                return None;
            }
            let side = cable.side_at_enclosure(&splitter.enclosure)?;
            Some(Node::CableFiber {
                cable: Arc::clone(cable),
                fiber: *fiber,
                exit: side.opposite(),
            })
        }
        SplitterEgress::EnclosurePort { enclosure, port } => {
            view.port_at(enclosure, *port).map(|p| Node::Port {
                port: Arc::clone(p),
            })
        }
    }
}
