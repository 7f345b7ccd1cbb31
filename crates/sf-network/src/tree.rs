//! Single-source tree network: one cross-main feeding parallel branches.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use sf_core::PipeSize;
use sf_core::pipes::cross_main_size;
use tracing::debug;

use crate::branch::Branch;
use crate::error::NetworkError;
use crate::params::{LossCoefficients, NetworkParams};

/// Cross-main run from the previous tap to branch `index`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossMainSegment {
    pub index: usize,
    pub size: PipeSize,
    pub inner_diameter_m: f64,
    /// 0.0 for the first tap
    pub length_m: f64,
    /// Flow still in the cross-main when it reaches this tap
    pub flow_lpm: f64,
}

/// Tree network with flows fixed by equal split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNetwork {
    pub inlet_pressure_mpa: f64,
    pub total_flow_lpm: f64,
    pub num_branches: usize,
    pub heads_per_branch: usize,
    pub branch_spacing_m: f64,
    pub head_spacing_m: f64,
    pub cross_main_size: PipeSize,
    pub cross_main_segments: Vec<CrossMainSegment>,
    pub branches: Vec<Branch>,
    pub losses: LossCoefficients,
}

impl TreeNetwork {
    /// Build with evenly spaced weld beads.
    pub fn build(params: &NetworkParams) -> Result<Self, NetworkError> {
        Self::build_with_rng::<StdRng>(params, None)
    }

    /// Validate `params` and build the network, drawing weld bead positions from `rng` when given.
    pub fn build_with_rng<R: Rng + ?Sized>(
        params: &NetworkParams,
        mut rng: Option<&mut R>,
    ) -> Result<Self, NetworkError> {
        params.validate()?;

        let n = params.num_branches as usize;
        let size = cross_main_size(params.total_heads());
        let branch_flow = params.branch_flow_lpm();

        let cross_main_segments = (0..n)
            .map(|i| CrossMainSegment {
                index: i,
                size,
                inner_diameter_m: size.inner_diameter_m(),
                length_m: if i > 0 { params.branch_spacing_m } else { 0.0 },
                flow_lpm: params.total_flow_lpm - i as f64 * branch_flow,
            })
            .collect();

        let branches = (0..n)
            .map(|b| Branch::build(b, params, rng.as_deref_mut()))
            .collect();
        debug!(branches = n, cross_main = %size, "Tree network built");

        Ok(Self {
            inlet_pressure_mpa: params.inlet_pressure_mpa,
            total_flow_lpm: params.total_flow_lpm,
            num_branches: n,
            heads_per_branch: params.heads_per_branch as usize,
            branch_spacing_m: params.branch_spacing_m,
            head_spacing_m: params.head_spacing_m,
            cross_main_size: size,
            cross_main_segments,
            branches,
            losses: params.losses,
        })
    }

    pub fn total_heads(&self) -> usize {
        self.num_branches * self.heads_per_branch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn default_layout() {
        let net = TreeNetwork::build(&NetworkParams::default()).unwrap();
        assert_eq!(net.total_heads(), 32);
        assert_eq!(net.cross_main_size, PipeSize::A80);
        assert_eq!(net.branches.len(), 4);

        let flows: Vec<f64> = net.cross_main_segments.iter().map(|s| s.flow_lpm).collect();
        assert_eq!(flows, vec![400.0, 300.0, 200.0, 100.0]);
        assert_eq!(net.cross_main_segments[0].length_m, 0.0);
        assert_eq!(net.cross_main_segments[3].length_m, 3.5);
    }

    #[test]
    fn invalid_params_fail_before_construction() {
        let err = TreeNetwork::build(&NetworkParams::new(0, 8)).unwrap_err();
        assert!(matches!(err, NetworkError::Validation { field: "num_branches", .. }));
    }

    #[test]
    fn random_beads_differ_per_branch() {
        let params = NetworkParams::default().with_weld_beads(5, 1.5);
        let mut rng = StdRng::seed_from_u64(3);
        let net = TreeNetwork::build_with_rng(&params, Some(&mut rng)).unwrap();
        assert!(net.branches.iter().all(|b| b.weld_beads.len() == 5));
        assert_ne!(net.branches[0].weld_beads, net.branches[1].weld_beads);

        let even = TreeNetwork::build(&params).unwrap();
        assert_eq!(even.branches[0].weld_beads, even.branches[1].weld_beads);
    }
}
