// ── Core error types ──
//
// Failure outcomes from fibertrace-core. A failed trace is an ordinary
// value, not a panic: every dead end the walk can hit maps to exactly one
// `TraceError` variant, and `reason()` gives consumers a stable
// machine-readable classification for rendering and telemetry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::EntityId;

/// Stable machine-readable classification of a trace failure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FailureReason {
    NotFound,
    Disconnected,
    Cycle,
    BranchAmbiguous,
    HopBudgetExceeded,
    Inventory,
}

/// Errors from the inventory layer (snapshot loading).
///
/// `InventorySource` implementors construct these; the tracer wraps them
/// into `TraceError::Inventory` at the layer seam.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Inventory backend error: {message}")]
    Backend { message: String },
}

/// Unified error type for a fiber path trace.
#[derive(Debug, Error)]
pub enum TraceError {
    // ── Start resolution ─────────────────────────────────────────────
    #[error("Start node not found: {node_type} {id}")]
    NotFound { node_type: String, id: EntityId },

    // ── Walk failures ────────────────────────────────────────────────
    /// A record references something that no longer exists (deleted
    /// cable, missing tray, vanished enclosure). Distinct from an open
    /// end, which is a legitimate partial result.
    #[error("Path disconnected at {at}: missing {missing}")]
    Disconnected { at: String, missing: String },

    /// The walk revisited a node. Physically invalid plant data.
    #[error("Cycle detected at {at} after {hops} hops")]
    Cycle { at: String, hops: usize },

    /// A splitter fans out and no disambiguating signal applies. The
    /// caller may re-invoke with a more specific starting fiber/output.
    #[error("Ambiguous branch at {at}: {detail}")]
    BranchAmbiguous { at: String, detail: String },

    /// Only malformed plant data walks long enough to trip this bound.
    #[error("Hop budget of {limit} exhausted before reaching a terminus")]
    HopBudgetExceeded { limit: usize },

    // ── Inventory layer (wrapped) ────────────────────────────────────
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl TraceError {
    /// Map this error onto its stable [`FailureReason`].
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::NotFound { .. } => FailureReason::NotFound,
            Self::Disconnected { .. } => FailureReason::Disconnected,
            Self::Cycle { .. } => FailureReason::Cycle,
            Self::BranchAmbiguous { .. } => FailureReason::BranchAmbiguous,
            Self::HopBudgetExceeded { .. } => FailureReason::HopBudgetExceeded,
            Self::Inventory(_) => FailureReason::Inventory,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reason_maps_every_variant() {
        let err = TraceError::Cycle {
            at: "cable A fiber 1".into(),
            hops: 12,
        };
        assert_eq!(err.reason(), FailureReason::Cycle);

        let err = TraceError::Inventory(InventoryError::Backend {
            message: "offline".into(),
        });
        assert_eq!(err.reason(), FailureReason::Inventory);
    }

    #[test]
    fn reason_renders_kebab_case() {
        assert_eq!(FailureReason::BranchAmbiguous.to_string(), "branch-ambiguous");
        assert_eq!(FailureReason::HopBudgetExceeded.to_string(), "hop-budget-exceeded");
    }

    #[test]
    fn disconnected_message_names_the_missing_link() {
        let err = TraceError::Disconnected {
            at: "splice S1".into(),
            missing: "cable C9".into(),
        };
        assert_eq!(
            err.to_string(),
            "Path disconnected at splice S1: missing cable C9"
        );
    }
}
