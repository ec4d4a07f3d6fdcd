// ── OLT domain types ──

use serde::{Deserialize, Serialize};

use super::common::GeoPoint;
use super::entity_id::EntityId;

/// One PON port on an OLT line card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PonPort {
    pub number: u32,
    /// Feeder cable patched to this port, if any.
    pub cable: Option<EntityId>,
    /// Feeder fiber the port is patched onto. `None` means the site
    /// convention applies: fiber number equals port number.
    pub fiber: Option<u32>,
    /// Nominal launch power, used for loss-budget evaluation.
    pub tx_power_dbm: Option<f64>,
}

impl PonPort {
    pub fn feeder_fiber(&self) -> u32 {
        self.fiber.unwrap_or(self.number)
    }
}

/// Optical Line Terminal: the head-end of every path in a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Olt {
    pub id: EntityId,
    pub project: EntityId,
    pub name: String,
    pub pon_ports: Vec<PonPort>,
    pub position: Option<GeoPoint>,
}

impl Olt {
    pub fn pon_port(&self, number: u32) -> Option<&PonPort> {
        self.pon_ports.iter().find(|p| p.number == number)
    }

    /// The PON port patched onto a given feeder fiber, if any.
    pub fn port_feeding(&self, cable: &EntityId, fiber: u32) -> Option<&PonPort> {
        self.pon_ports
            .iter()
            .find(|p| p.cable.as_ref() == Some(cable) && p.feeder_fiber() == fiber)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn olt() -> Olt {
        Olt {
            id: "olt-1".into(),
            project: "p1".into(),
            name: "Central OLT".into(),
            pon_ports: vec![
                PonPort {
                    number: 1,
                    cable: Some("C1".into()),
                    fiber: None,
                    tx_power_dbm: None,
                },
                PonPort {
                    number: 3,
                    cable: Some("C1".into()),
                    fiber: Some(5),
                    tx_power_dbm: Some(3.0),
                },
            ],
            position: None,
        }
    }

    #[test]
    fn feeder_fiber_defaults_to_port_number() {
        let olt = olt();
        assert_eq!(olt.pon_port(1).unwrap().feeder_fiber(), 1);
        assert_eq!(olt.pon_port(3).unwrap().feeder_fiber(), 5);
    }

    #[test]
    fn port_feeding_matches_cable_and_fiber() {
        let olt = olt();
        let cable: EntityId = "C1".into();
        assert_eq!(olt.port_feeding(&cable, 5).unwrap().number, 3);
        assert_eq!(olt.port_feeding(&cable, 1).unwrap().number, 1);
        assert!(olt.port_feeding(&cable, 7).is_none());
        assert!(olt.port_feeding(&"C2".into(), 5).is_none());
    }
}
