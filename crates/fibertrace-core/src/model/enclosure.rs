// ── Enclosure hierarchy types ──
//
// Enclosures are the housed nodes of the plant: splice closures along
// feeder routes, LCPs holding splitters, NAPs holding customer ports.
// The hierarchy is OLT → Closure → LCP → NAP, with a legacy OLT → LCP
// shortcut still present in older projects.

use serde::{Deserialize, Serialize};

use super::common::GeoPoint;
use super::entity_id::EntityId;

/// Role of an enclosure in the distribution hierarchy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EnclosureKind {
    SpliceClosure,
    /// Local Convergence Point. Browser-era records used "fdt".
    #[serde(alias = "fdt")]
    #[strum(to_string = "lcp", serialize = "fdt")]
    Lcp,
    /// Network Access Point. Browser-era records used "fat".
    #[serde(alias = "fat")]
    #[strum(to_string = "nap", serialize = "fat")]
    Nap,
}

/// Kind of node a hierarchy parent link points at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ParentKind {
    Olt,
    Closure,
    Lcp,
}

/// Tagged hierarchy parent reference.
///
/// Replaces the browser-era pair of untyped id fields (one per legacy
/// hierarchy shape) with a single explicit link, resolved once at view
/// build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub kind: ParentKind,
    pub id: EntityId,
}

/// A housed plant node: splice closure, LCP, or NAP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enclosure {
    pub id: EntityId,
    pub project: EntityId,
    pub name: String,
    pub kind: EnclosureKind,
    pub parent: Option<ParentLink>,
    pub position: Option<GeoPoint>,
}

impl EnclosureKind {
    /// Whether `parent` is a legal hierarchy parent for this kind.
    /// The OLT → LCP link is the legacy shortcut.
    pub fn allows_parent(self, parent: ParentKind) -> bool {
        match self {
            Self::SpliceClosure => matches!(parent, ParentKind::Olt | ParentKind::Closure),
            Self::Lcp => matches!(parent, ParentKind::Closure | ParentKind::Olt),
            Self::Nap => matches!(parent, ParentKind::Lcp),
        }
    }
}

/// Splice tray inside an enclosure. Purely organizational: it locates
/// its splices at the enclosure and groups them for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tray {
    pub id: EntityId,
    pub project: EntityId,
    pub enclosure: EntityId,
    pub number: u32,
    pub capacity: Option<u32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn legacy_kind_aliases_deserialize() {
        let lcp: EnclosureKind = serde_json::from_str("\"fdt\"").unwrap();
        assert_eq!(lcp, EnclosureKind::Lcp);

        let nap: EnclosureKind = serde_json::from_str("\"fat\"").unwrap();
        assert_eq!(nap, EnclosureKind::Nap);

        let closure: EnclosureKind = serde_json::from_str("\"splice-closure\"").unwrap();
        assert_eq!(closure, EnclosureKind::SpliceClosure);
    }

    #[test]
    fn kind_displays_canonical_names() {
        assert_eq!(EnclosureKind::Lcp.to_string(), "lcp");
        assert_eq!(EnclosureKind::SpliceClosure.to_string(), "splice-closure");
    }

    #[test]
    fn legacy_names_parse_via_strum() {
        let kind: EnclosureKind = "fat".parse().unwrap();
        assert_eq!(kind, EnclosureKind::Nap);
    }

    #[test]
    fn nap_only_hangs_off_an_lcp() {
        assert!(EnclosureKind::Nap.allows_parent(ParentKind::Lcp));
        assert!(!EnclosureKind::Nap.allows_parent(ParentKind::Olt));
        assert!(!EnclosureKind::Nap.allows_parent(ParentKind::Closure));
    }

    #[test]
    fn lcp_accepts_legacy_olt_parent() {
        assert!(EnclosureKind::Lcp.allows_parent(ParentKind::Olt));
        assert!(EnclosureKind::Lcp.allows_parent(ParentKind::Closure));
        assert!(!EnclosureKind::Lcp.allows_parent(ParentKind::Lcp));
    }
}
