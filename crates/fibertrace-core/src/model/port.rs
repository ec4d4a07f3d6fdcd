// ── Customer port domain types ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// Provisioning state of an enclosure port.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PortStatus {
    Available,
    Connected,
    Reserved,
    Faulty,
}

/// Subscriber metadata attached to a connected or reserved port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub address: Option<String>,
    pub service: Option<String>,
}

/// A numbered drop port on a NAP or ODF enclosure.
///
/// By site convention an incoming distribution fiber lands on the port
/// whose number matches the fiber number, unless a splitter egress is
/// jumpered to it explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnclosurePort {
    pub id: EntityId,
    pub project: EntityId,
    pub enclosure: EntityId,
    pub number: u32,
    pub status: PortStatus,
    pub customer: Option<CustomerInfo>,
    /// Last measured received optical power at the drop.
    pub rx_power_dbm: Option<f64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_kebab_case() {
        let json = serde_json::to_string(&PortStatus::Connected).unwrap();
        assert_eq!(json, "\"connected\"");
        let back: PortStatus = serde_json::from_str("\"faulty\"").unwrap();
        assert_eq!(back, PortStatus::Faulty);
    }

    #[test]
    fn customer_deserializes_with_optional_fields() {
        let port: EnclosurePort = serde_json::from_str(
            r#"{
                "id": "N1-P2",
                "project": "p1",
                "enclosure": "N1",
                "number": 2,
                "status": "connected",
                "customer": { "name": "Jane Doe", "address": null, "service": "1G" },
                "rx_power_dbm": -18.5
            }"#,
        )
        .unwrap();
        assert_eq!(port.customer.unwrap().name, "Jane Doe");
    }
}
