//! Variable sweeps: step one design input and watch the cases respond.
//!
//! Design inputs (flow, inlet pressure, bead height, heads per branch) are swept
//! through the case A/B comparison and report the first failing value of each
//! case. Sweeping the Monte Carlo iteration count reports how the statistics
//! settle instead.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sf_core::defaults::{MAX_SWEEP_POINTS, MIN_TERMINAL_PRESSURE_MPA};
use sf_network::NetworkParams;
use sf_solver::{CaseSpec, Topology, compare_cases};
use tracing::{info, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::monte_carlo::{MonteCarloConfig, run_monte_carlo};
use crate::stats::SampleStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepVariable {
    DesignFlow,
    InletPressure,
    BeadHeight,
    HeadsPerBranch,
    McIterations,
}

impl SweepVariable {
    pub const ALL: [SweepVariable; 5] = [
        SweepVariable::DesignFlow,
        SweepVariable::InletPressure,
        SweepVariable::BeadHeight,
        SweepVariable::HeadsPerBranch,
        SweepVariable::McIterations,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SweepVariable::DesignFlow => "design_flow",
            SweepVariable::InletPressure => "inlet_pressure",
            SweepVariable::BeadHeight => "bead_height",
            SweepVariable::HeadsPerBranch => "heads_per_branch",
            SweepVariable::McIterations => "mc_iterations",
        }
    }
}

impl fmt::Display for SweepVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SweepVariable {
    type Err = AnalysisError;

    /// Accepts `design_flow` and `design-flow` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|v| v.name() == key)
            .ok_or_else(|| AnalysisError::config(format!("unknown sweep variable '{s}'")))
    }
}

/// Evenly stepped values `start, start + step, ...` up to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl SweepRange {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(AnalysisError::config(format!(
                "sweep bounds must be finite (start = {}, end = {})",
                self.start, self.end
            )));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(AnalysisError::config(format!(
                "sweep step {} must be positive",
                self.step
            )));
        }
        let count = self.raw_count();
        if count > MAX_SWEEP_POINTS as f64 {
            return Err(AnalysisError::config(format!(
                "sweep of {count} points exceeds the maximum of {MAX_SWEEP_POINTS}"
            )));
        }
        Ok(())
    }

    fn raw_count(&self) -> f64 {
        let stop = self.end + self.step / 2.0;
        ((stop - self.start) / self.step).ceil()
    }

    /// Points of the half-open range `[start, end + step / 2)`, at most
    /// `MAX_SWEEP_POINTS` of them.
    ///
    /// An empty range still yields `[start]`.
    pub fn generate_points(&self) -> Vec<f64> {
        let count = self.raw_count();
        if !(count >= 1.0) {
            return vec![self.start];
        }
        let count = count.min(MAX_SWEEP_POINTS as f64) as usize;
        (0..count).map(|i| self.start + i as f64 * self.step).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub variable: SweepVariable,
    pub range: SweepRange,
    /// Case A/B settings; `bead_height_existing` is the swept value for `BeadHeight`
    pub case: CaseSpec,
    /// Defect settings for `McIterations` (its iteration count is overridden per point)
    pub monte_carlo: MonteCarloConfig,
}

impl SweepConfig {
    pub fn new(variable: SweepVariable, range: SweepRange) -> Self {
        Self {
            variable,
            range,
            case: CaseSpec::default(),
            monte_carlo: MonteCarloConfig::default(),
        }
    }
}

/// Case A/B response over the swept values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CaseSweep {
    pub terminal_a_mpa: Vec<f64>,
    pub terminal_b_mpa: Vec<f64>,
    pub improvement_pct: Vec<f64>,
    pub pass_a: Vec<bool>,
    pub pass_b: Vec<bool>,
    /// First swept value where case A falls below 0.1 MPa
    pub critical_a: Option<f64>,
    pub critical_b: Option<f64>,
    pub num_failed: usize,
}

/// Monte Carlo statistics over the swept iteration counts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonteCarloSweep {
    pub mean_mpa: Vec<f64>,
    pub std_mpa: Vec<f64>,
    pub min_mpa: Vec<f64>,
    pub max_mpa: Vec<f64>,
    pub p_below: Vec<f64>,
    pub num_failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepOutcome {
    Cases(CaseSweep),
    MonteCarlo(MonteCarloSweep),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub variable: SweepVariable,
    pub values: Vec<f64>,
    pub outcome: SweepOutcome,
}

impl SweepResult {
    pub fn num_failed(&self) -> usize {
        match &self.outcome {
            SweepOutcome::Cases(c) => c.num_failed,
            SweepOutcome::MonteCarlo(mc) => mc.num_failed,
        }
    }
}

pub fn run_variable_sweep(
    config: &SweepConfig,
    params: &NetworkParams,
    topology: &Topology,
) -> AnalysisResult<SweepResult> {
    config.range.validate()?;
    let values = config.range.generate_points();

    info!(
        variable = %config.variable,
        points = values.len(),
        topology = topology.name(),
        "Sweep started"
    );

    let outcome = match config.variable {
        SweepVariable::McIterations => {
            SweepOutcome::MonteCarlo(sweep_monte_carlo(config, params, topology, &values))
        }
        variable => SweepOutcome::Cases(sweep_cases(config, variable, params, topology, &values)),
    };

    let result = SweepResult {
        variable: config.variable,
        values,
        outcome,
    };
    info!(num_failed = result.num_failed(), "Sweep finished");
    Ok(result)
}

/// Inputs of one design point.
fn point_inputs(
    variable: SweepVariable,
    value: f64,
    params: &NetworkParams,
    case: &CaseSpec,
) -> (NetworkParams, CaseSpec) {
    let mut params = params.clone();
    let mut case = *case;
    match variable {
        SweepVariable::DesignFlow => params.total_flow_lpm = value,
        SweepVariable::InletPressure => params.inlet_pressure_mpa = value,
        SweepVariable::BeadHeight => case.bead_height_existing = value,
        SweepVariable::HeadsPerBranch => {
            params.heads_per_branch = value as u32;
            params.bead_heights_mm = None;
            params.weld_bead_layout = None;
        }
        SweepVariable::McIterations => {}
    }
    (params, case)
}

fn sweep_cases(
    config: &SweepConfig,
    variable: SweepVariable,
    params: &NetworkParams,
    topology: &Topology,
    values: &[f64],
) -> CaseSweep {
    let points: Vec<Option<(f64, f64, f64)>> = values
        .par_iter()
        .map(|&value| {
            let (point, case) = point_inputs(variable, value, params, &config.case);
            match compare_cases(&point, topology, &case) {
                Ok(cmp) => Some((cmp.terminal_a_mpa, cmp.terminal_b_mpa, cmp.improvement_pct)),
                Err(err) => {
                    warn!(%variable, value, error = %err, "Sweep point failed");
                    None
                }
            }
        })
        .collect();

    let mut out = CaseSweep::default();
    for (&value, &point) in values.iter().zip(&points) {
        let (a, b, imp) = point.unwrap_or_else(|| {
            out.num_failed += 1;
            (0.0, 0.0, 0.0)
        });
        let pass_a = a >= MIN_TERMINAL_PRESSURE_MPA;
        let pass_b = b >= MIN_TERMINAL_PRESSURE_MPA;
        if !pass_a && out.critical_a.is_none() {
            out.critical_a = Some(value);
        }
        if !pass_b && out.critical_b.is_none() {
            out.critical_b = Some(value);
        }
        out.terminal_a_mpa.push(a);
        out.terminal_b_mpa.push(b);
        out.improvement_pct.push(imp);
        out.pass_a.push(pass_a);
        out.pass_b.push(pass_b);
    }
    out
}

fn sweep_monte_carlo(
    config: &SweepConfig,
    params: &NetworkParams,
    topology: &Topology,
    values: &[f64],
) -> MonteCarloSweep {
    let points: Vec<Option<SampleStats>> = values
        .par_iter()
        .map(|&value| {
            let iterations = (value as usize).max(1);
            let mc = config.monte_carlo.clone().with_iterations(iterations);
            match run_monte_carlo(&mc, params, topology) {
                Ok(res) => Some(res.stats),
                Err(err) => {
                    warn!(iterations, error = %err, "Sweep point failed");
                    None
                }
            }
        })
        .collect();

    let mut out = MonteCarloSweep::default();
    for point in points {
        let stats = point.unwrap_or_else(|| {
            out.num_failed += 1;
            SampleStats::default()
        });
        out.mean_mpa.push(stats.mean_mpa);
        out.std_mpa.push(stats.std_mpa);
        out.min_mpa.push(stats.min_mpa);
        out.max_mpa.push(stats.max_mpa);
        out.p_below.push(stats.p_below);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arange_points() {
        assert_eq!(
            SweepRange::new(100.0, 400.0, 100.0).generate_points(),
            vec![100.0, 200.0, 300.0, 400.0]
        );
        assert_eq!(SweepRange::new(1.0, 2.0, 0.5).generate_points(), vec![1.0, 1.5, 2.0]);
        // end not on the grid: last point stays below end + step / 2
        assert_eq!(SweepRange::new(0.0, 1.0, 0.4).generate_points().len(), 3);
        assert_eq!(SweepRange::new(5.0, 1.0, 1.0).generate_points(), vec![5.0]);
    }

    #[test]
    fn range_validation() {
        assert!(SweepRange::new(0.0, 1.0, 0.0).validate().is_err());
        assert!(SweepRange::new(0.0, 1.0, -1.0).validate().is_err());
        assert!(SweepRange::new(f64::NAN, 1.0, 1.0).validate().is_err());
        assert!(SweepRange::new(0.0, 1.0, 0.1).validate().is_ok());
    }

    #[test]
    fn point_count_is_capped() {
        let exact = SweepRange::new(1.0, MAX_SWEEP_POINTS as f64, 1.0);
        assert!(exact.validate().is_ok());
        assert_eq!(exact.generate_points().len(), MAX_SWEEP_POINTS);

        let over = SweepRange::new(0.0, MAX_SWEEP_POINTS as f64, 1.0);
        let err = over.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"), "{err}");
        assert_eq!(over.generate_points().len(), MAX_SWEEP_POINTS);

        let tiny_step = SweepRange::new(0.0, 1.0, 1e-300);
        assert!(tiny_step.validate().is_err());
        assert_eq!(tiny_step.generate_points().len(), MAX_SWEEP_POINTS);
    }

    #[test]
    fn variable_names_parse() {
        for v in SweepVariable::ALL {
            assert_eq!(v.name().parse::<SweepVariable>().unwrap(), v);
        }
        assert_eq!(
            "design-flow".parse::<SweepVariable>().unwrap(),
            SweepVariable::DesignFlow
        );
        assert!("pump_speed".parse::<SweepVariable>().is_err());
    }

    #[test]
    fn failing_points_record_zero() {
        // 60 heads per branch is out of range
        let cfg = SweepConfig::new(
            SweepVariable::HeadsPerBranch,
            SweepRange::new(40.0, 60.0, 20.0),
        );
        let res = run_variable_sweep(&cfg, &NetworkParams::new(2, 8), &Topology::Tree).unwrap();
        let SweepOutcome::Cases(cases) = &res.outcome else {
            panic!("expected a case sweep");
        };
        assert_eq!(res.values, vec![40.0, 60.0]);
        assert_eq!(cases.num_failed, 1);
        assert_eq!(cases.terminal_a_mpa[1], 0.0);
        assert!(!cases.pass_a[1]);
    }
}
