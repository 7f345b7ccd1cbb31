//! Bernoulli defect study.
//!
//! Every fitting is independently defective with probability `p`. One level is
//! run per configured `p`; straight-run weld beads stay evenly spaced.

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sf_core::defaults;
use sf_network::NetworkParams;
use sf_solver::{Topology, solve};
use tracing::{debug, info};

use crate::error::{AnalysisError, AnalysisResult};
use crate::seed::{base_seed, stream_seed, trial_rng};
use crate::stats::{SampleStats, cumulative_failure_pct, cumulative_mean};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BernoulliConfig {
    /// Defect probability of each level, in [0.01, 0.99]
    pub p_values: Vec<f64>,
    pub iterations: usize,
    pub bead_height_mm: f64,
    pub weld_beads_per_branch: u32,
    pub seed: Option<u64>,
}

impl Default for BernoulliConfig {
    fn default() -> Self {
        Self {
            p_values: defaults::BERNOULLI_P_VALUES.to_vec(),
            iterations: defaults::BERNOULLI_ITERATIONS,
            bead_height_mm: defaults::BEAD_HEIGHT_MM,
            weld_beads_per_branch: 0,
            seed: None,
        }
    }
}

impl BernoulliConfig {
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.p_values.is_empty() {
            return Err(AnalysisError::config("at least one defect probability is required"));
        }
        for &p in &self.p_values {
            if !(defaults::BERNOULLI_P_MIN..=defaults::BERNOULLI_P_MAX).contains(&p) {
                return Err(AnalysisError::config(format!(
                    "defect probability {p} outside [{}, {}]",
                    defaults::BERNOULLI_P_MIN,
                    defaults::BERNOULLI_P_MAX
                )));
            }
        }
        if self.iterations < 1 {
            return Err(AnalysisError::config("bernoulli iterations must be at least 1"));
        }
        if !self.bead_height_mm.is_finite() || self.bead_height_mm < 0.0 {
            return Err(AnalysisError::config(format!(
                "bead height {} mm must be finite and non-negative",
                self.bead_height_mm
            )));
        }
        Ok(())
    }
}

/// Outcome of one probability level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BernoulliLevel {
    pub p: f64,
    pub worst_terminals_mpa: Vec<f64>,
    pub bead_counts: Vec<usize>,
    pub mean_bead_count: f64,
    /// Sample statistics (n - 1 denominator)
    pub stats: SampleStats,
    pub failure_pct: f64,
    pub cumulative_mean_mpa: Vec<f64>,
    pub cumulative_failure_pct: Vec<f64>,
    pub non_converged: usize,
}

impl BernoulliLevel {
    pub fn expected_bead_count(&self, total_fittings: usize) -> f64 {
        total_fittings as f64 * self.p
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BernoulliResult {
    pub levels: Vec<BernoulliLevel>,
    pub total_fittings: usize,
    pub seed: u64,
}

pub fn run_bernoulli_monte_carlo(
    config: &BernoulliConfig,
    params: &NetworkParams,
    topology: &Topology,
) -> AnalysisResult<BernoulliResult> {
    config.validate()?;
    params.validate()?;

    let seed = base_seed(config.seed);
    let mut base = params
        .clone()
        .with_weld_beads(config.weld_beads_per_branch, config.bead_height_mm);
    base.weld_bead_layout = None;

    info!(
        levels = config.p_values.len(),
        iterations = config.iterations,
        topology = topology.name(),
        seed,
        "Bernoulli study started"
    );

    let levels = config
        .p_values
        .iter()
        .enumerate()
        .map(|(level, &p)| run_level(config, &base, topology, stream_seed(seed, level), p))
        .collect::<AnalysisResult<Vec<_>>>()?;

    info!("Bernoulli study finished");
    Ok(BernoulliResult {
        levels,
        total_fittings: params.fitting_count(),
        seed,
    })
}

fn run_level(
    config: &BernoulliConfig,
    params: &NetworkParams,
    topology: &Topology,
    seed: u64,
    p: f64,
) -> AnalysisResult<BernoulliLevel> {
    let n = params.num_branches as usize;
    let m = params.heads_per_branch as usize;

    let trials = (0..config.iterations)
        .into_par_iter()
        .map(|index| {
            let mut rng = trial_rng(seed, index);
            let mut count = 0;
            let heights: Vec<Vec<f64>> = (0..n)
                .map(|_| {
                    (0..m)
                        .map(|_| {
                            if rng.r#gen::<f64>() <= p {
                                count += 1;
                                config.bead_height_mm
                            } else {
                                0.0
                            }
                        })
                        .collect()
                })
                .collect();
            let result = solve(topology, &params.clone().with_bead_heights(heights))?;
            Ok((result.worst_terminal_mpa, count, result.converged()))
        })
        .collect::<AnalysisResult<Vec<(f64, usize, bool)>>>()?;

    let worst_terminals_mpa: Vec<f64> = trials.iter().map(|t| t.0).collect();
    let bead_counts: Vec<usize> = trials.iter().map(|t| t.1).collect();
    let non_converged = trials.iter().filter(|t| !t.2).count();

    let stats = SampleStats::from_samples(&worst_terminals_mpa, 1);
    let mean_bead_count =
        bead_counts.iter().sum::<usize>() as f64 / bead_counts.len().max(1) as f64;

    debug!(p, mean_mpa = stats.mean_mpa, failure_pct = stats.failure_pct(), "Level done");

    Ok(BernoulliLevel {
        p,
        mean_bead_count,
        failure_pct: stats.failure_pct(),
        cumulative_mean_mpa: cumulative_mean(&worst_terminals_mpa),
        cumulative_failure_pct: cumulative_failure_pct(&worst_terminals_mpa),
        stats,
        worst_terminals_mpa,
        bead_counts,
        non_converged,
    })
}
