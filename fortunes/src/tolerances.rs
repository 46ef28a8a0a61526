/// Fixed floating-point tolerances the predictor and breakpoint intersection
/// routines compare against. Defaults match the values the algorithm hard-codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Maximum accepted `diff` for a close-event candidate (§4.5).
    pub diff_acceptance: f64,
    /// Below this, a parabola is "narrow enough" to fall back to the
    /// horizontal-line intersection when a focus sits at a segment endpoint (§4.2).
    pub parabola_narrowness: f64,
    /// Candidates within this distance of each other are consolidated to one (§4.2, §4.5).
    pub consolidation: f64,
    /// Round-trip slack for edgeStart/getIntercept equality (§8).
    pub edge_roundtrip: f64,
    /// Slack applied when comparing a candidate's predicted y against the directrix (§4.5).
    pub directrix_slack: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            diff_acceptance: 1e-2,
            parabola_narrowness: 1e-5,
            consolidation: 1e-6,
            edge_roundtrip: 1e-9,
            directrix_slack: 1e-13,
        }
    }
}
