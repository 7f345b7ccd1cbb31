//! Hardy-Cross loop-flow balancing.

use serde::{Deserialize, Serialize};
use sf_core::defaults;
use sf_core::defaults::MIN_FLOW_LPM;
use sf_core::numeric::ensure_finite;
use sf_core::units::constants::ROUGHNESS_M;
use sf_hydraulics::{friction_factor, major_loss, minor_loss, reynolds_water, velocity_from_lpm};
use sf_network::{GridNetwork, GridPipe, NetworkError, PipeKind};
use tracing::{debug, warn};

use crate::error::{SolverError, SolverResult};
use crate::profile::{HeadDrop, fed_branch_drop};

/// Hardy-Cross configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardyCrossConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Loop head imbalance tolerance (m)
    pub tolerance_m: f64,
    /// Flow correction tolerance (LPM)
    pub tolerance_lpm: f64,
    /// Under-relaxation factor applied to every correction
    pub relaxation: f64,
    /// Consecutive growing iterations that count as divergence
    pub divergence_window: usize,
    /// Growth factor of the imbalance that counts as an increase
    pub divergence_ratio: f64,
}

impl Default for HardyCrossConfig {
    fn default() -> Self {
        Self {
            max_iterations: defaults::HC_MAX_ITERATIONS,
            tolerance_m: defaults::HC_TOLERANCE_M,
            tolerance_lpm: defaults::HC_TOLERANCE_LPM,
            relaxation: defaults::HC_RELAXATION,
            divergence_window: 3,
            divergence_ratio: 1.01,
        }
    }
}

impl HardyCrossConfig {
    pub fn with_relaxation(mut self, relaxation: f64) -> Self {
        self.relaxation = relaxation;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        let r = self.relaxation;
        if !(defaults::HC_RELAXATION_MIN..=defaults::HC_RELAXATION_MAX).contains(&r) {
            return Err(NetworkError::Validation {
                field: "relaxation",
                value: r.to_string(),
                reason: "must be within 0.1..=1.0",
            });
        }
        if self.max_iterations == 0 {
            return Err(NetworkError::Validation {
                field: "max_iterations",
                value: "0".into(),
                reason: "must be at least 1",
            });
        }
        for (field, v) in [("tolerance_m", self.tolerance_m), ("tolerance_lpm", self.tolerance_lpm)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(NetworkError::Validation {
                    field,
                    value: v.to_string(),
                    reason: "must be positive",
                });
            }
        }
        if self.divergence_window == 0 || !(self.divergence_ratio.is_finite() && self.divergence_ratio >= 1.0) {
            return Err(NetworkError::Validation {
                field: "divergence_ratio",
                value: self.divergence_ratio.to_string(),
                reason: "needs a window of at least 1 and a ratio of at least 1.0",
            });
        }
        Ok(())
    }
}

/// Terminal state of the iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardyCrossOutcome {
    /// Both tolerances met
    Converged,
    /// Imbalance grew for `divergence_window` consecutive iterations
    Diverged,
    /// Iteration cap reached
    Exhausted,
}

/// Starting flows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FlowSeed {
    /// Half the supply down each cross-main
    #[default]
    Balanced,
    /// Signed flow per pipe id; must satisfy nodal mass balance
    Custom(Vec<f64>),
}

/// Hardy-Cross iteration result.
#[derive(Debug, Clone, PartialEq)]
pub struct HardyCrossResult {
    /// Signed flow per pipe (LPM), indexed by pipe id
    pub flows: Vec<f64>,
    pub iterations: usize,
    pub outcome: HardyCrossOutcome,
    pub final_imbalance_m: f64,
    pub final_delta_q_lpm: f64,
    pub imbalance_history: Vec<f64>,
    pub delta_q_history: Vec<f64>,
    /// Consecutive growing iterations when the loop stopped
    pub divergence_count: usize,
}

impl HardyCrossResult {
    pub fn converged(&self) -> bool {
        self.outcome == HardyCrossOutcome::Converged
    }

    /// Diverged, or still growing when the cap was hit.
    pub fn diverged(&self) -> bool {
        match self.outcome {
            HardyCrossOutcome::Converged => false,
            HardyCrossOutcome::Diverged => true,
            HardyCrossOutcome::Exhausted => self.divergence_count > 0,
        }
    }
}

/// Consecutive iterations whose imbalance grew by more than `ratio`.
#[derive(Debug, Clone, Copy)]
struct DivergenceWatch {
    ratio: f64,
    window: usize,
    prev: f64,
    count: usize,
}

impl DivergenceWatch {
    fn new(config: &HardyCrossConfig) -> Self {
        Self {
            ratio: config.divergence_ratio,
            window: config.divergence_window,
            prev: f64::INFINITY,
            count: 0,
        }
    }

    /// Record one iteration; true once `window` growing iterations run back to back.
    fn observe(&mut self, imbalance: f64) -> bool {
        if imbalance > self.prev * self.ratio {
            self.count += 1;
        } else {
            self.count = 0;
        }
        self.prev = imbalance;
        self.count >= self.window
    }
}

/// Signed head drop (m) from start to end of `pipe` at signed flow `q_lpm`,
/// with its slope `sum(2 h / |q|)` for the loop correction.
///
/// Cross-main: major + tee-run. Connector: major. Branch: fed from both ends,
/// see `fed_branch_drop`.
pub fn pipe_head_drop(net: &GridNetwork, pipe: &GridPipe, q_lpm: f64) -> HeadDrop {
    match pipe.kind {
        PipeKind::Branch { branch_index } => net
            .branches
            .get(branch_index)
            .map_or(HeadDrop::NONE, |b| fed_branch_drop(b, q_lpm, pipe.draw_lpm, &net.losses)),
        PipeKind::CrossMainTop | PipeKind::CrossMainBottom | PipeKind::Connector => {
            let q_abs = q_lpm.abs();
            if q_abs < MIN_FLOW_LPM {
                return HeadDrop::NONE;
            }
            let d = pipe.inner_diameter_m();
            let v = velocity_from_lpm(q_abs, d);
            let f = friction_factor(reynolds_water(v, d), ROUGHNESS_M, d);
            let mut h = major_loss(f, pipe.length_m, d, v);
            if pipe.kind.is_cross_main() {
                h += minor_loss(net.losses.k_tee_run, v);
            }
            HeadDrop {
                drop_m: h.copysign(q_lpm),
                slope: 2.0 * h / q_abs,
            }
        }
    }
}

/// Balance loop flows until every loop closes in head.
///
/// Each iteration:
/// 1. Per loop, the signed head drops walked in loop direction and `sum(2 h_f / |Q|)`
/// 2. `dQ = -relaxation * sum_h / sum_d` (0 when the derivative vanishes)
/// 3. Apply `dQ * direction` to every loop pipe right away (Gauss-Seidel)
/// 4. Stop on both tolerances, on sustained growth, or at the cap
pub fn hardy_cross(
    net: &GridNetwork,
    config: &HardyCrossConfig,
    seed: &FlowSeed,
) -> SolverResult<HardyCrossResult> {
    config.validate()?;

    let mut flows = match seed {
        FlowSeed::Balanced => net.balanced_flows(),
        FlowSeed::Custom(flows) => {
            net.check_mass_balance(flows, config.tolerance_lpm)?;
            flows.clone()
        }
    };

    let pipes = net.topology.pipes();
    let loops = net.topology.loops();

    let mut imbalance_history = Vec::new();
    let mut delta_q_history = Vec::new();
    let mut watch = DivergenceWatch::new(config);
    let mut outcome = HardyCrossOutcome::Exhausted;
    let mut iterations = 0;

    for iter in 0..config.max_iterations {
        iterations = iter + 1;
        let mut max_imbalance = 0.0_f64;
        let mut max_delta_q = 0.0_f64;

        for lp in loops {
            let mut sum_h = 0.0;
            let mut sum_d = 0.0;
            for (pid, dir) in lp.members() {
                let h = pipe_head_drop(net, &pipes[pid.idx()], flows[pid.idx()]);
                sum_h += h.drop_m * dir;
                sum_d += h.slope;
            }

            let delta_q = if sum_d > 1e-10 {
                -sum_h / sum_d * config.relaxation
            } else {
                0.0
            };
            for (pid, dir) in lp.members() {
                flows[pid.idx()] += delta_q * dir;
            }

            max_imbalance = max_imbalance.max(sum_h.abs());
            max_delta_q = max_delta_q.max(delta_q.abs());
        }

        imbalance_history.push(max_imbalance);
        delta_q_history.push(max_delta_q);

        ensure_finite(max_imbalance, "loop head imbalance")
            .and_then(|_| ensure_finite(max_delta_q, "loop flow correction"))
            .map_err(|e| SolverError::Numeric {
                what: format!("{e} at iteration {iterations}"),
            })?;

        if max_imbalance < config.tolerance_m && max_delta_q < config.tolerance_lpm {
            outcome = HardyCrossOutcome::Converged;
            break;
        }

        if watch.observe(max_imbalance) {
            outcome = HardyCrossOutcome::Diverged;
            break;
        }
    }
    let divergence_count = watch.count;

    let final_imbalance_m = imbalance_history.last().copied().unwrap_or(0.0);
    let final_delta_q_lpm = delta_q_history.last().copied().unwrap_or(0.0);

    match outcome {
        HardyCrossOutcome::Converged => debug!(
            iterations,
            imbalance_m = final_imbalance_m,
            "Hardy-Cross converged"
        ),
        HardyCrossOutcome::Diverged => warn!(
            iterations,
            imbalance_m = final_imbalance_m,
            "Hardy-Cross diverged; try a smaller relaxation factor"
        ),
        HardyCrossOutcome::Exhausted => warn!(
            iterations,
            imbalance_m = final_imbalance_m,
            delta_q_lpm = final_delta_q_lpm,
            "Hardy-Cross hit the iteration cap"
        ),
    }

    Ok(HardyCrossResult {
        flows,
        iterations,
        outcome,
        final_imbalance_m,
        final_delta_q_lpm,
        imbalance_history,
        delta_q_history,
        divergence_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_network::NetworkParams;

    fn grid(n: u32, q: f64) -> GridNetwork {
        GridNetwork::build(&NetworkParams::new(n, 8).with_total_flow(q)).unwrap()
    }

    #[test]
    fn config_validation() {
        assert!(HardyCrossConfig::default().validate().is_ok());
        assert!(HardyCrossConfig::default().with_relaxation(0.05).validate().is_err());
        assert!(HardyCrossConfig::default().with_relaxation(1.2).validate().is_err());
        assert!(HardyCrossConfig::default().with_relaxation(1.0).validate().is_ok());
        assert!(HardyCrossConfig::default().with_max_iterations(0).validate().is_err());
    }

    #[test]
    fn converges_on_default_grid() {
        let net = grid(4, 400.0);
        let res = hardy_cross(&net, &HardyCrossConfig::default(), &FlowSeed::Balanced).unwrap();
        assert!(res.converged(), "outcome {:?} after {}", res.outcome, res.iterations);
        assert!(!res.diverged());
        assert!(res.iterations < 1000);
        assert!(res.final_imbalance_m < 0.001);
        assert!(res.final_delta_q_lpm < 0.0001);
        assert_eq!(res.imbalance_history.len(), res.iterations);
        assert_eq!(res.delta_q_history.len(), res.iterations);
    }

    #[test]
    fn corrections_preserve_mass_balance() {
        let net = grid(2, 400.0);
        let res = hardy_cross(&net, &HardyCrossConfig::default(), &FlowSeed::Balanced).unwrap();
        for b in net.node_balances(&res.flows) {
            assert!(b.abs() < 1e-9);
        }
    }

    #[test]
    fn iteration_cap_is_exhausted() {
        let net = grid(4, 400.0);
        let config = HardyCrossConfig::default().with_max_iterations(2);
        let res = hardy_cross(&net, &config, &FlowSeed::Balanced).unwrap();
        assert_eq!(res.outcome, HardyCrossOutcome::Exhausted);
        assert_eq!(res.iterations, 2);
    }

    #[test]
    fn custom_seed_must_balance() {
        let net = grid(2, 400.0);
        let bad = FlowSeed::Custom(vec![1.0; net.topology.pipes().len()]);
        assert!(hardy_cross(&net, &HardyCrossConfig::default(), &bad).is_err());
    }

    #[test]
    fn drops_follow_flow_direction() {
        let net = grid(2, 400.0);
        for pipe in net.topology.pipes() {
            match pipe.kind {
                PipeKind::Branch { .. } => {
                    // fed from the far end only, the TOP end sits below it
                    assert!(pipe_head_drop(&net, pipe, 0.0).drop_m < 0.0);
                    assert!(pipe_head_drop(&net, pipe, pipe.draw_lpm).drop_m > 0.0);
                }
                _ => {
                    assert_eq!(pipe_head_drop(&net, pipe, 0.009), HeadDrop::NONE);
                    let fwd = pipe_head_drop(&net, pipe, 50.0);
                    let back = pipe_head_drop(&net, pipe, -50.0);
                    assert!(fwd.drop_m > 0.0);
                    assert_eq!(back.drop_m, -fwd.drop_m);
                    assert_eq!(back.slope, fwd.slope);
                }
            }
        }
    }

    #[test]
    fn growth_below_tolerance_still_counts_as_divergence() {
        let config = HardyCrossConfig::default();
        let mut watch = DivergenceWatch::new(&config);
        let flags: Vec<bool> = [0.0004, 0.0005, 0.0006, 0.0007]
            .into_iter()
            .map(|x| watch.observe(x))
            .collect();
        assert!(0.0007 < config.tolerance_m);
        assert_eq!(flags, vec![false, false, false, true]);
    }

    #[test]
    fn a_shrinking_step_resets_the_count() {
        let mut watch = DivergenceWatch::new(&HardyCrossConfig::default());
        for x in [1.0, 2.0, 3.0, 1.0, 2.0, 3.0] {
            assert!(!watch.observe(x));
        }
        assert_eq!(watch.count, 2);
        // within the 1% band is not growth
        assert!(!watch.observe(3.02));
        assert_eq!(watch.count, 0);
    }
}
