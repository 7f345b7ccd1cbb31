//! Monte Carlo over random fitting defects.
//!
//! Each trial picks between `min_defects` and `max_defects` distinct fittings,
//! raises a bead of `bead_height_mm` at each, scatters the straight-run weld
//! beads at random, and records the worst terminal pressure of the solve.

use rand::Rng;
use rand::seq::index::sample;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sf_core::defaults;
use sf_core::pipes::branch_pipe_sizes;
use sf_network::{NetworkParams, WeldBead, generate_branch_beads};
use sf_solver::{Topology, solve};
use tracing::{info, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::seed::{base_seed, trial_rng};
use crate::stats::SampleStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub iterations: usize,
    pub min_defects: usize,
    pub max_defects: usize,
    /// Height of every defect bead and every weld bead (mm)
    pub bead_height_mm: f64,
    /// Straight-run weld beads per branch, re-placed every trial
    pub weld_beads_per_branch: u32,
    /// `None` draws a base seed from entropy
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            iterations: defaults::MC_ITERATIONS,
            min_defects: defaults::MC_MIN_DEFECTS,
            max_defects: defaults::MC_MAX_DEFECTS,
            bead_height_mm: defaults::BEAD_HEIGHT_MM,
            weld_beads_per_branch: 0,
            seed: None,
        }
    }
}

impl MonteCarloConfig {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_defects(mut self, min: usize, max: usize) -> Self {
        self.min_defects = min;
        self.max_defects = max;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.iterations < 1 {
            return Err(AnalysisError::config("monte carlo iterations must be at least 1"));
        }
        if self.min_defects > self.max_defects {
            return Err(AnalysisError::config(format!(
                "min_defects ({}) exceeds max_defects ({})",
                self.min_defects, self.max_defects
            )));
        }
        if !self.bead_height_mm.is_finite() || self.bead_height_mm < 0.0 {
            return Err(AnalysisError::config(format!(
                "bead height {} mm must be finite and non-negative",
                self.bead_height_mm
            )));
        }
        if self.weld_beads_per_branch > defaults::MAX_BEADS_PER_BRANCH {
            return Err(AnalysisError::config(format!(
                "{} weld beads per branch exceeds the maximum of {}",
                self.weld_beads_per_branch,
                defaults::MAX_BEADS_PER_BRANCH
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Worst terminal pressure of every trial, in trial order
    pub worst_terminals_mpa: Vec<f64>,
    /// Defective fittings `(branch, head)` of every trial, sorted
    pub defect_positions: Vec<Vec<(usize, usize)>>,
    /// Population statistics of `worst_terminals_mpa`
    pub stats: SampleStats,
    /// How often each fitting was defective, `[branch][head]`
    pub defect_frequency: Vec<Vec<u32>>,
    /// Row sums of `defect_frequency`
    pub branch_frequency: Vec<u32>,
    pub total_fittings: usize,
    /// Grid trials that stopped without converging (always 0 on a tree)
    pub non_converged: usize,
    pub seed: u64,
}

impl MonteCarloResult {
    pub fn iterations(&self) -> usize {
        self.worst_terminals_mpa.len()
    }

    pub fn total_defects(&self) -> usize {
        self.defect_positions.iter().map(Vec::len).sum()
    }
}

struct Trial {
    worst_terminal_mpa: f64,
    defects: Vec<(usize, usize)>,
    converged: bool,
}

/// Run `config.iterations` independent trials on `topology`.
pub fn run_monte_carlo(
    config: &MonteCarloConfig,
    params: &NetworkParams,
    topology: &Topology,
) -> AnalysisResult<MonteCarloResult> {
    config.validate()?;
    params.validate()?;

    let seed = base_seed(config.seed);
    let n = params.num_branches as usize;
    let m = params.heads_per_branch as usize;
    let total_fittings = params.fitting_count();

    info!(
        iterations = config.iterations,
        topology = topology.name(),
        branches = n,
        heads_per_branch = m,
        seed,
        "Monte Carlo started"
    );

    let trials = (0..config.iterations)
        .into_par_iter()
        .map(|index| run_trial(config, params, topology, seed, index))
        .collect::<AnalysisResult<Vec<_>>>()?;

    let mut defect_frequency = vec![vec![0u32; m]; n];
    for trial in &trials {
        for &(b, h) in &trial.defects {
            defect_frequency[b][h] += 1;
        }
    }
    let branch_frequency: Vec<u32> = defect_frequency.iter().map(|row| row.iter().sum()).collect();
    let non_converged = trials.iter().filter(|t| !t.converged).count();

    let worst_terminals_mpa: Vec<f64> = trials.iter().map(|t| t.worst_terminal_mpa).collect();
    let stats = SampleStats::from_samples(&worst_terminals_mpa, 0);

    if non_converged > 0 {
        warn!(non_converged, "Some grid trials did not converge");
    }
    info!(
        mean_mpa = stats.mean_mpa,
        min_mpa = stats.min_mpa,
        p_below = stats.p_below,
        "Monte Carlo finished"
    );

    Ok(MonteCarloResult {
        worst_terminals_mpa,
        defect_positions: trials.into_iter().map(|t| t.defects).collect(),
        stats,
        defect_frequency,
        branch_frequency,
        total_fittings,
        non_converged,
        seed,
    })
}

fn run_trial(
    config: &MonteCarloConfig,
    params: &NetworkParams,
    topology: &Topology,
    seed: u64,
    index: usize,
) -> AnalysisResult<Trial> {
    let mut rng = trial_rng(seed, index);
    let n = params.num_branches as usize;
    let m = params.heads_per_branch as usize;
    let total = params.fitting_count();

    let hi = config.max_defects.min(total);
    let lo = config.min_defects.min(hi);
    let count = rng.gen_range(lo..=hi);

    let mut flat = sample(&mut rng, total, count).into_vec();
    flat.sort_unstable();
    let defects: Vec<(usize, usize)> = flat.iter().map(|&f| (f / m, f % m)).collect();

    let mut heights = vec![vec![0.0; m]; n];
    for &(b, h) in &defects {
        heights[b][h] = config.bead_height_mm;
    }

    let mut trial_params = params
        .clone()
        .with_bead_heights(heights)
        .with_weld_beads(config.weld_beads_per_branch, config.bead_height_mm);
    trial_params.weld_bead_layout = None;
    if config.weld_beads_per_branch > 0 {
        let layout = random_weld_layout(&trial_params, &mut rng);
        trial_params = trial_params.with_weld_bead_layout(layout);
    }

    let result = solve(topology, &trial_params)?;
    Ok(Trial {
        worst_terminal_mpa: result.worst_terminal_mpa,
        defects,
        converged: result.converged(),
    })
}

/// Weld beads at uniform random positions along every branch.
pub fn random_weld_layout<R: Rng + ?Sized>(
    params: &NetworkParams,
    rng: &mut R,
) -> Vec<Vec<WeldBead>> {
    let sizes = branch_pipe_sizes(params.heads_per_branch);
    (0..params.num_branches)
        .map(|_| {
            generate_branch_beads(
                params.heads_per_branch as usize,
                params.head_spacing_m,
                params.weld_beads.per_branch as usize,
                params.weld_beads.height_mm,
                &sizes,
                params.losses.k1_base,
                Some(&mut *rng),
            )
        })
        .collect()
}
