//! System head curve: head the supply must deliver at a given flow.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use sf_core::defaults::{MIN_TERMINAL_PRESSURE_MPA, SYSTEM_CURVE_REFERENCE_MPA};
use sf_core::mpa_to_head;
use sf_core::pipes::branch_pipe_sizes;
use sf_network::{NetworkParams, generate_branch_beads};

use crate::error::SolverResult;
use crate::topology::{Topology, solve};

/// Flow at which `SystemCurve::curve` starts sampling (LPM).
pub const CURVE_START_LPM: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub flow_lpm: f64,
    pub head_m: f64,
}

/// Network resistance seen from the riser.
///
/// Head at flow `q` is the worst branch's total loss plus the minimum
/// terminal head, solved with a reference inlet pressure high enough to keep
/// every terminal positive.
#[derive(Debug, Clone)]
pub struct SystemCurve {
    params: NetworkParams,
    topology: Topology,
    min_terminal_head_m: f64,
}

impl SystemCurve {
    /// Weld beads in `params.weld_beads` are laid out evenly once and reused at every flow.
    pub fn new(params: &NetworkParams, topology: Topology) -> Self {
        let mut params = params.clone();
        if params.weld_bead_layout.is_none() && params.weld_beads.per_branch > 0 {
            let sizes = branch_pipe_sizes(params.heads_per_branch);
            let beads = generate_branch_beads::<StdRng>(
                params.heads_per_branch as usize,
                params.head_spacing_m,
                params.weld_beads.per_branch as usize,
                params.weld_beads.height_mm,
                &sizes,
                params.losses.k1_base,
                None,
            );
            params.weld_bead_layout = Some(vec![beads; params.num_branches as usize]);
        }
        params.inlet_pressure_mpa = SYSTEM_CURVE_REFERENCE_MPA;

        Self {
            params,
            topology,
            min_terminal_head_m: mpa_to_head(MIN_TERMINAL_PRESSURE_MPA),
        }
    }

    pub fn min_terminal_head_m(&self) -> f64 {
        self.min_terminal_head_m
    }

    /// Required head (m) at `q_lpm`.
    pub fn head_at_flow(&self, q_lpm: f64) -> SolverResult<f64> {
        if q_lpm <= 0.0 {
            return Ok(self.min_terminal_head_m);
        }
        let params = self.params.clone().with_total_flow(q_lpm);
        let result = solve(&self.topology, &params)?;
        let loss_mpa = SYSTEM_CURVE_REFERENCE_MPA - result.worst_terminal_mpa;
        Ok(mpa_to_head(loss_mpa) + self.min_terminal_head_m)
    }

    /// `points` samples evenly spaced from 50 LPM to `q_max_lpm`.
    pub fn curve(&self, q_max_lpm: f64, points: usize) -> SolverResult<Vec<CurvePoint>> {
        let flows: Vec<f64> = match points {
            0 => Vec::new(),
            1 => vec![q_max_lpm],
            n => {
                let step = (q_max_lpm - CURVE_START_LPM) / (n - 1) as f64;
                (0..n).map(|i| CURVE_START_LPM + step * i as f64).collect()
            }
        };
        flows
            .into_iter()
            .map(|q| {
                Ok(CurvePoint {
                    flow_lpm: q,
                    head_m: self.head_at_flow(q)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_flow_needs_only_terminal_head() {
        let curve = SystemCurve::new(&NetworkParams::default(), Topology::Tree);
        let h = curve.head_at_flow(0.0).unwrap();
        assert!((h - mpa_to_head(0.1)).abs() < 1e-12);
        assert_eq!(curve.head_at_flow(-5.0).unwrap(), h);
    }

    #[test]
    fn head_rises_with_flow() {
        let curve = SystemCurve::new(&NetworkParams::default().with_weld_beads(3, 1.5), Topology::Tree);
        let pts = curve.curve(1500.0, 12).unwrap();
        assert_eq!(pts.len(), 12);
        assert_eq!(pts[0].flow_lpm, 50.0);
        assert!((pts[11].flow_lpm - 1500.0).abs() < 1e-9);
        for pair in pts.windows(2) {
            assert!(pair[1].head_m > pair[0].head_m);
        }
    }

    #[test]
    fn head_ignores_configured_inlet() {
        let a = SystemCurve::new(&NetworkParams::default().with_inlet_pressure(0.3), Topology::Tree);
        let b = SystemCurve::new(&NetworkParams::default(), Topology::Tree);
        assert_eq!(a.head_at_flow(400.0).unwrap(), b.head_at_flow(400.0).unwrap());
    }
}
