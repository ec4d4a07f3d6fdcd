// ── Network graph view ──
//
// An immutable, indexed projection of one project's records, rebuilt
// per trace from a point-in-time snapshot. Build is tolerant: malformed
// references are logged and skipped from the derived indexes, so they
// surface later as dead ends or broken references, never build failures.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::InventoryError;
use crate::model::{
    Cable, Enclosure, EnclosureKind, EnclosurePort, EndpointKind, EntityId, Olt, ParentKind,
    Splice, Splitter, SplitterEgress, Tray,
};
use crate::store::{InventorySource, ProjectSnapshot};

/// (cable id, fiber number)
type FiberKey = (EntityId, u32);
/// (enclosure id, port number)
type PortKey = (EntityId, u32);
/// (enclosure id, cable id, fiber number)
type SpliceKey = (EntityId, EntityId, u32);

/// Indexed read model of one project's plant.
pub struct NetworkView {
    project: EntityId,
    taken_at: DateTime<Utc>,

    olts: HashMap<EntityId, Arc<Olt>>,
    enclosures: HashMap<EntityId, Arc<Enclosure>>,
    cables: HashMap<EntityId, Arc<Cable>>,
    trays: HashMap<EntityId, Arc<Tray>>,
    splices: HashMap<EntityId, Arc<Splice>>,
    splitters: HashMap<EntityId, Arc<Splitter>>,
    ports: HashMap<EntityId, Arc<EnclosurePort>>,

    // Derived indexes; the resolver answers next-hop queries from these.
    splice_at: HashMap<SpliceKey, Arc<Splice>>,
    splices_by_tray: HashMap<EntityId, Vec<Arc<Splice>>>,
    splitter_by_input: HashMap<FiberKey, Arc<Splitter>>,
    splitter_by_egress_fiber: HashMap<FiberKey, (Arc<Splitter>, u32)>,
    splitter_by_egress_port: HashMap<PortKey, (Arc<Splitter>, u32)>,
    port_at: HashMap<PortKey, Arc<EnclosurePort>>,
    ports_by_enclosure: HashMap<EntityId, Vec<Arc<EnclosurePort>>>,
    cables_by_enclosure: HashMap<EntityId, Vec<Arc<Cable>>>,
    pon_feed: HashMap<FiberKey, (Arc<Olt>, u32)>,
}

impl NetworkView {
    /// Fetch one project snapshot and build a view from it.
    pub async fn load<S: InventorySource>(
        source: &S,
        project: &EntityId,
    ) -> Result<Self, InventoryError> {
        let snapshot = source.project_snapshot(project).await?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Pure transform from snapshot to indexed view.
    ///
    /// An empty project yields an empty view, not an error.
    #[allow(clippy::too_many_lines)]
    pub fn from_snapshot(snapshot: ProjectSnapshot) -> Self {
        let project = snapshot.project;
        let taken_at = snapshot.taken_at;

        let olt_list: Vec<Arc<Olt>> = snapshot.olts.into_iter().map(Arc::new).collect();
        let enclosure_list: Vec<Arc<Enclosure>> =
            snapshot.enclosures.into_iter().map(Arc::new).collect();
        let cable_list: Vec<Arc<Cable>> = snapshot.cables.into_iter().map(Arc::new).collect();
        let tray_list: Vec<Arc<Tray>> = snapshot.trays.into_iter().map(Arc::new).collect();
        let splice_list: Vec<Arc<Splice>> = snapshot.splices.into_iter().map(Arc::new).collect();
        let splitter_list: Vec<Arc<Splitter>> =
            snapshot.splitters.into_iter().map(Arc::new).collect();
        let port_list: Vec<Arc<EnclosurePort>> =
            snapshot.ports.into_iter().map(Arc::new).collect();

        let olts: HashMap<_, _> = olt_list
            .iter()
            .map(|r| (r.id.clone(), Arc::clone(r)))
            .collect();
        let enclosures: HashMap<_, _> = enclosure_list
            .iter()
            .map(|r| (r.id.clone(), Arc::clone(r)))
            .collect();
        let cables: HashMap<_, _> = cable_list
            .iter()
            .map(|r| (r.id.clone(), Arc::clone(r)))
            .collect();
        let trays: HashMap<_, _> = tray_list
            .iter()
            .map(|r| (r.id.clone(), Arc::clone(r)))
            .collect();
        let splices: HashMap<_, _> = splice_list
            .iter()
            .map(|r| (r.id.clone(), Arc::clone(r)))
            .collect();
        let splitters: HashMap<_, _> = splitter_list
            .iter()
            .map(|r| (r.id.clone(), Arc::clone(r)))
            .collect();
        let ports: HashMap<_, _> = port_list
            .iter()
            .map(|r| (r.id.clone(), Arc::clone(r)))
            .collect();

        // Trays locate splices at an enclosure.
        let mut tray_enclosure: HashMap<EntityId, EntityId> = HashMap::new();
        for tray in &tray_list {
            if enclosures.contains_key(&tray.enclosure) {
                tray_enclosure.insert(tray.id.clone(), tray.enclosure.clone());
            } else {
                warn!(tray = %tray.id, enclosure = %tray.enclosure,
                    "tray references missing enclosure");
            }
        }

        // Splice indexes. A (enclosure, cable, fiber) key may legally be
        // claimed once; duplicates keep the first record seen.
        let mut splice_at: HashMap<SpliceKey, Arc<Splice>> = HashMap::new();
        let mut splices_by_tray: HashMap<EntityId, Vec<Arc<Splice>>> = HashMap::new();
        for splice in &splice_list {
            splices_by_tray
                .entry(splice.tray.clone())
                .or_default()
                .push(Arc::clone(splice));

            let Some(enclosure) = tray_enclosure.get(&splice.tray) else {
                warn!(splice = %splice.id, tray = %splice.tray,
                    "splice cannot be located: tray missing or unanchored");
                continue;
            };
            let sides = [
                (&splice.cable_a, splice.fiber_a),
                (&splice.cable_b, splice.fiber_b),
            ];
            for (cable, fiber) in sides {
                match splice_at.entry((enclosure.clone(), cable.clone(), fiber)) {
                    Entry::Vacant(slot) => {
                        slot.insert(Arc::clone(splice));
                    }
                    Entry::Occupied(slot) => {
                        warn!(splice = %splice.id, kept = %slot.get().id,
                            cable = %cable, fiber, "duplicate splice on fiber; keeping first");
                    }
                }
            }
        }

        // Splitter indexes.
        let mut splitter_by_input: HashMap<FiberKey, Arc<Splitter>> = HashMap::new();
        let mut splitter_by_egress_fiber: HashMap<FiberKey, (Arc<Splitter>, u32)> = HashMap::new();
        let mut splitter_by_egress_port: HashMap<PortKey, (Arc<Splitter>, u32)> = HashMap::new();
        for splitter in &splitter_list {
            if !enclosures.contains_key(&splitter.enclosure) {
                warn!(splitter = %splitter.id, enclosure = %splitter.enclosure,
                    "splitter references missing enclosure");
            }
            if let Some(input) = &splitter.input {
                match splitter_by_input.entry((input.cable.clone(), input.fiber)) {
                    Entry::Vacant(slot) => {
                        slot.insert(Arc::clone(splitter));
                    }
                    Entry::Occupied(slot) => {
                        warn!(splitter = %splitter.id, kept = %slot.get().id,
                            cable = %input.cable, fiber = input.fiber,
                            "two splitters claim the same input fiber; keeping first");
                    }
                }
            }
            for output in &splitter.outputs {
                match &output.link {
                    Some(SplitterEgress::CableFiber { cable, fiber }) => {
                        match splitter_by_egress_fiber.entry((cable.clone(), *fiber)) {
                            Entry::Vacant(slot) => {
                                slot.insert((Arc::clone(splitter), output.number));
                            }
                            Entry::Occupied(_) => {
                                warn!(splitter = %splitter.id, output = output.number,
                                    cable = %cable, fiber,
                                    "duplicate splitter egress fiber; keeping first");
                            }
                        }
                    }
                    Some(SplitterEgress::EnclosurePort { enclosure, port }) => {
                        match splitter_by_egress_port.entry((enclosure.clone(), *port)) {
                            Entry::Vacant(slot) => {
                                slot.insert((Arc::clone(splitter), output.number));
                            }
                            Entry::Occupied(_) => {
                                warn!(splitter = %splitter.id, output = output.number,
                                    enclosure = %enclosure, port,
                                    "duplicate splitter egress port; keeping first");
                            }
                        }
                    }
                    None => {}
                }
            }
        }

        // Port indexes.
        let mut port_at: HashMap<PortKey, Arc<EnclosurePort>> = HashMap::new();
        let mut ports_by_enclosure: HashMap<EntityId, Vec<Arc<EnclosurePort>>> = HashMap::new();
        for port in &port_list {
            if !enclosures.contains_key(&port.enclosure) {
                warn!(port = %port.id, enclosure = %port.enclosure,
                    "port references missing enclosure");
            }
            match port_at.entry((port.enclosure.clone(), port.number)) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::clone(port));
                }
                Entry::Occupied(slot) => {
                    warn!(port = %port.id, kept = %slot.get().id, number = port.number,
                        "duplicate port number in enclosure; keeping first");
                }
            }
            ports_by_enclosure
                .entry(port.enclosure.clone())
                .or_default()
                .push(Arc::clone(port));
        }

        // Cable endpoint index.
        let mut cables_by_enclosure: HashMap<EntityId, Vec<Arc<Cable>>> = HashMap::new();
        for cable in &cable_list {
            for end in [&cable.end_a, &cable.end_b].into_iter().flatten() {
                match end.kind {
                    EndpointKind::Enclosure => {
                        if enclosures.contains_key(&end.id) {
                            cables_by_enclosure
                                .entry(end.id.clone())
                                .or_default()
                                .push(Arc::clone(cable));
                        } else {
                            warn!(cable = %cable.id, enclosure = %end.id,
                                "cable end references missing enclosure");
                        }
                    }
                    EndpointKind::Olt => {
                        if !olts.contains_key(&end.id) {
                            warn!(cable = %cable.id, olt = %end.id,
                                "cable end references missing olt");
                        }
                    }
                }
            }
        }

        // PON feed index.
        let mut pon_feed: HashMap<FiberKey, (Arc<Olt>, u32)> = HashMap::new();
        for olt in &olt_list {
            for port in &olt.pon_ports {
                let Some(cable) = &port.cable else { continue };
                if !cables.contains_key(cable) {
                    warn!(olt = %olt.id, port = port.number, cable = %cable,
                        "pon port references missing cable");
                    continue;
                }
                match pon_feed.entry((cable.clone(), port.feeder_fiber())) {
                    Entry::Vacant(slot) => {
                        slot.insert((Arc::clone(olt), port.number));
                    }
                    Entry::Occupied(_) => {
                        warn!(olt = %olt.id, port = port.number, cable = %cable,
                            fiber = port.feeder_fiber(),
                            "two pon ports feed the same fiber; keeping first");
                    }
                }
            }
        }

        // Hierarchy check is advisory: traces follow cables and splices,
        // not parent links.
        for enclosure in &enclosure_list {
            let Some(parent) = &enclosure.parent else { continue };
            if !enclosure.kind.allows_parent(parent.kind) {
                warn!(enclosure = %enclosure.id, kind = %enclosure.kind,
                    parent_kind = %parent.kind, "invalid hierarchy parent kind");
            }
            let exists = match parent.kind {
                ParentKind::Olt => olts.contains_key(&parent.id),
                ParentKind::Closure => enclosures
                    .get(&parent.id)
                    .is_some_and(|e| e.kind == EnclosureKind::SpliceClosure),
                ParentKind::Lcp => enclosures
                    .get(&parent.id)
                    .is_some_and(|e| e.kind == EnclosureKind::Lcp),
            };
            if !exists {
                warn!(enclosure = %enclosure.id, parent = %parent.id,
                    "hierarchy parent not found");
            }
        }

        debug!(
            project = %project,
            olts = olts.len(),
            enclosures = enclosures.len(),
            cables = cables.len(),
            splices = splices.len(),
            splitters = splitters.len(),
            ports = ports.len(),
            "built network view"
        );

        Self {
            project,
            taken_at,
            olts,
            enclosures,
            cables,
            trays,
            splices,
            splitters,
            ports,
            splice_at,
            splices_by_tray,
            splitter_by_input,
            splitter_by_egress_fiber,
            splitter_by_egress_port,
            port_at,
            ports_by_enclosure,
            cables_by_enclosure,
            pon_feed,
        }
    }

    // ── Record lookups ───────────────────────────────────────────────

    pub fn project(&self) -> &EntityId {
        &self.project
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn is_empty(&self) -> bool {
        self.olts.is_empty()
            && self.enclosures.is_empty()
            && self.cables.is_empty()
            && self.trays.is_empty()
            && self.splices.is_empty()
            && self.splitters.is_empty()
            && self.ports.is_empty()
    }

    pub fn olt(&self, id: &EntityId) -> Option<&Arc<Olt>> {
        self.olts.get(id)
    }

    pub fn enclosure(&self, id: &EntityId) -> Option<&Arc<Enclosure>> {
        self.enclosures.get(id)
    }

    pub fn cable(&self, id: &EntityId) -> Option<&Arc<Cable>> {
        self.cables.get(id)
    }

    pub fn tray(&self, id: &EntityId) -> Option<&Arc<Tray>> {
        self.trays.get(id)
    }

    pub fn splice(&self, id: &EntityId) -> Option<&Arc<Splice>> {
        self.splices.get(id)
    }

    pub fn splitter(&self, id: &EntityId) -> Option<&Arc<Splitter>> {
        self.splitters.get(id)
    }

    pub fn port(&self, id: &EntityId) -> Option<&Arc<EnclosurePort>> {
        self.ports.get(id)
    }

    pub fn splices_in_tray(&self, tray: &EntityId) -> &[Arc<Splice>] {
        self.splices_by_tray.get(tray).map_or(&[], Vec::as_slice)
    }

    pub fn ports_in(&self, enclosure: &EntityId) -> &[Arc<EnclosurePort>] {
        self.ports_by_enclosure
            .get(enclosure)
            .map_or(&[], Vec::as_slice)
    }

    // ── Next-hop indexes (resolver queries) ──────────────────────────

    pub(crate) fn splice_on(
        &self,
        enclosure: &EntityId,
        cable: &EntityId,
        fiber: u32,
    ) -> Option<&Arc<Splice>> {
        self.splice_at.get(&(enclosure.clone(), cable.clone(), fiber))
    }

    pub(crate) fn splitter_fed_by(&self, cable: &EntityId, fiber: u32) -> Option<&Arc<Splitter>> {
        self.splitter_by_input.get(&(cable.clone(), fiber))
    }

    pub(crate) fn splitter_egress_at_fiber(
        &self,
        cable: &EntityId,
        fiber: u32,
    ) -> Option<&(Arc<Splitter>, u32)> {
        self.splitter_by_egress_fiber.get(&(cable.clone(), fiber))
    }

    pub(crate) fn splitter_egress_at_port(
        &self,
        enclosure: &EntityId,
        port: u32,
    ) -> Option<&(Arc<Splitter>, u32)> {
        self.splitter_by_egress_port.get(&(enclosure.clone(), port))
    }

    pub(crate) fn port_at(&self, enclosure: &EntityId, number: u32) -> Option<&Arc<EnclosurePort>> {
        self.port_at.get(&(enclosure.clone(), number))
    }

    pub(crate) fn cables_at(&self, enclosure: &EntityId) -> &[Arc<Cable>] {
        self.cables_by_enclosure
            .get(enclosure)
            .map_or(&[], Vec::as_slice)
    }

    pub(crate) fn pon_feed(&self, cable: &EntityId, fiber: u32) -> Option<&(Arc<Olt>, u32)> {
        self.pon_feed.get(&(cable.clone(), fiber))
    }

    /// Enclosure housing a splice, resolved through its tray.
    pub(crate) fn splice_enclosure(&self, splice: &Splice) -> Option<&Arc<Enclosure>> {
        let tray = self.trays.get(&splice.tray)?;
        self.enclosures.get(&tray.enclosure)
    }
}
