//! Single-bead sensitivity along the worst branch.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sf_core::PipeSize;
use sf_core::defaults;
use sf_network::NetworkParams;
use sf_solver::{Topology, solve};
use tracing::info;

use crate::error::{AnalysisError, AnalysisResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    pub bead_height_mm: f64,
    /// Evenly spaced weld beads per branch, present in every solve
    pub weld_beads_per_branch: u32,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            bead_height_mm: defaults::BEAD_HEIGHT_MM,
            weld_beads_per_branch: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    /// Worst terminal with no fitting beads
    pub baseline_mpa: f64,
    pub worst_branch: usize,
    /// Pipe size at each head of the worst branch
    pub pipe_sizes: Vec<PipeSize>,
    /// Worst terminal with a single bead at head `h`
    pub single_bead_mpa: Vec<f64>,
    /// `baseline - single_bead_mpa[h]`
    pub deltas_mpa: Vec<f64>,
    /// Head indices, most damaging first
    pub ranking: Vec<usize>,
    pub critical_point: usize,
    pub bead_height_mm: f64,
}

/// Place one bead at each head of the worst branch in turn.
pub fn run_sensitivity(
    config: &SensitivityConfig,
    params: &NetworkParams,
    topology: &Topology,
) -> AnalysisResult<SensitivityResult> {
    if !config.bead_height_mm.is_finite() || config.bead_height_mm < 0.0 {
        return Err(AnalysisError::config(format!(
            "bead height {} mm must be finite and non-negative",
            config.bead_height_mm
        )));
    }
    params.validate()?;

    let mut base = params
        .clone()
        .with_uniform_bead_height(0.0)
        .with_weld_beads(config.weld_beads_per_branch, config.bead_height_mm);
    base.weld_bead_layout = None;

    info!(topology = topology.name(), "Sensitivity started");

    let baseline = solve(topology, &base)?;
    let worst_branch = baseline.worst_branch_index;
    let pipe_sizes = baseline
        .worst_profile()
        .map(|profile| profile.segments.iter().map(|s| s.pipe_size).collect())
        .unwrap_or_default();

    let m = params.heads_per_branch as usize;
    let n = params.num_branches as usize;
    let single_bead_mpa = (0..m)
        .into_par_iter()
        .map(|head| {
            let mut heights = vec![vec![0.0; m]; n];
            heights[worst_branch][head] = config.bead_height_mm;
            let result = solve(topology, &base.clone().with_bead_heights(heights))?;
            Ok(result.worst_terminal_mpa)
        })
        .collect::<AnalysisResult<Vec<f64>>>()?;

    let deltas_mpa: Vec<f64> = single_bead_mpa
        .iter()
        .map(|p| baseline.worst_terminal_mpa - p)
        .collect();
    let ranking = rank_by_delta(&deltas_mpa);
    let critical_point = ranking.first().copied().unwrap_or(0);

    info!(worst_branch, critical_point, "Sensitivity finished");

    Ok(SensitivityResult {
        baseline_mpa: baseline.worst_terminal_mpa,
        worst_branch,
        pipe_sizes,
        single_bead_mpa,
        deltas_mpa,
        ranking,
        critical_point,
        bead_height_mm: config.bead_height_mm,
    })
}

/// Indices sorted by delta, largest first; ties keep index order.
pub fn rank_by_delta(deltas: &[f64]) -> Vec<usize> {
    let mut ranking: Vec<usize> = (0..deltas.len()).collect();
    ranking.sort_by(|&a, &b| deltas[b].total_cmp(&deltas[a]));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_is_stable_and_descending() {
        assert_eq!(rank_by_delta(&[0.1, 0.3, 0.3, 0.0]), vec![1, 2, 0, 3]);
        assert!(rank_by_delta(&[]).is_empty());
    }

    #[test]
    fn every_single_bead_costs_pressure() {
        let params = NetworkParams::new(4, 8)
            .with_spacing(3.5, 2.3)
            .with_inlet_pressure(1.4)
            .with_total_flow(400.0);
        let res = run_sensitivity(&SensitivityConfig::default(), &params, &Topology::Tree).unwrap();

        assert_eq!(res.worst_branch, 3);
        assert_eq!(res.single_bead_mpa.len(), 8);
        assert_eq!(res.pipe_sizes.len(), 8);
        assert!(res.deltas_mpa.iter().all(|&d| d > 0.0));
        assert_eq!(res.critical_point, res.ranking[0]);
        for pair in res.ranking.windows(2) {
            assert!(res.deltas_mpa[pair[0]] >= res.deltas_mpa[pair[1]]);
        }
    }
}
