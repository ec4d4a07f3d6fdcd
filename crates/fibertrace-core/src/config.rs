// ── Trace tuning configuration ──
//
// These knobs describe *how* to walk the plant, not what is in it.
// The consuming application constructs a `TraceConfig` and hands it in;
// core never reads config files.

/// Tuning for a single trace invocation.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Hard bound on total hops per trace, branch probes included.
    /// Cycle detection catches loops first; this is the backstop for
    /// pathologically malformed data.
    pub max_hops: usize,

    /// Loss charged at the OLT port and at the customer port (dB each).
    /// Field installs typically budget 0.3–0.5 dB per mated connector.
    pub connector_loss_db: f64,

    /// Loss assumed for a splice whose record has no measured value (dB).
    pub default_splice_loss_db: f64,

    /// When a splitter fans out without a selection hint, follow the
    /// single output that reaches a connected customer, if exactly one
    /// does. With zero or several live outputs the trace still fails
    /// as branch-ambiguous.
    pub prefer_single_live_branch: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_hops: 10_000,
            connector_loss_db: 0.0,
            default_splice_loss_db: 0.0,
            prefer_single_live_branch: true,
        }
    }
}
