//! Optical loss budget checks over traced paths.
//!
//! A [`LossBudget`] is evaluated against a [`TraceReport`]: accumulated
//! loss against the budget ceiling, and, when launch power and a
//! measured receive level are known, expected versus observed power at
//! the customer end.

use serde::{Deserialize, Serialize};

use crate::graph::{SegmentDetail, TraceReport};

/// Power budget a traced path is checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossBudget {
    /// Maximum end-to-end loss the link class allows.
    pub max_loss_db: f64,
    /// Launch power fallback when the traced pon port records none.
    pub olt_tx_power_dbm: Option<f64>,
    /// Weakest acceptable receive level at the customer port.
    pub min_rx_power_dbm: Option<f64>,
}

impl Default for LossBudget {
    /// Class B+ PON budget: 28 dB between OLT and customer.
    fn default() -> Self {
        Self {
            max_loss_db: 28.0,
            olt_tx_power_dbm: None,
            min_rx_power_dbm: None,
        }
    }
}

/// Outcome of checking one report against a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEvaluation {
    /// Loss accumulated over the traced path.
    pub total_loss_db: f64,
    /// Budget headroom; negative when the path is over budget.
    pub margin_db: f64,
    pub within_budget: bool,
    /// Launch power minus path loss, when launch power is known.
    pub expected_rx_power_dbm: Option<f64>,
    /// Measured level at the terminating port, when recorded.
    pub observed_rx_power_dbm: Option<f64>,
    /// Observed minus expected; a strongly negative value points at
    /// loss the records do not account for.
    pub deviation_db: Option<f64>,
}

impl LossBudget {
    pub fn evaluate(&self, report: &TraceReport) -> BudgetEvaluation {
        let recorded_tx = report
            .full_path()
            .find_map(|segment| match &segment.detail {
                SegmentDetail::OltPort { tx_power_dbm, .. } => Some(*tx_power_dbm),
                _ => None,
            })
            .flatten();
        let tx = recorded_tx.or(self.olt_tx_power_dbm);

        let observed = report
            .full_path()
            .find_map(|segment| match &segment.detail {
                SegmentDetail::Port { rx_power_dbm, .. } => Some(*rx_power_dbm),
                _ => None,
            })
            .flatten();

        let expected = tx.map(|t| t - report.total_loss_db);
        let deviation = match (observed, expected) {
            (Some(o), Some(e)) => Some(o - e),
            _ => None,
        };
        let margin_db = self.max_loss_db - report.total_loss_db;
        let rx_ok = match (self.min_rx_power_dbm, observed) {
            (Some(min), Some(level)) => level >= min,
            _ => true,
        };

        BudgetEvaluation {
            total_loss_db: report.total_loss_db,
            margin_db,
            within_budget: report.total_loss_db <= self.max_loss_db && rx_ok,
            expected_rx_power_dbm: expected,
            observed_rx_power_dbm: observed,
            deviation_db: deviation,
        }
    }
}
