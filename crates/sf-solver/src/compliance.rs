//! Regulatory velocity and pressure checks (NFPC 103).

use serde::{Deserialize, Serialize};
use sf_core::{PipeSize, defaults, units::lpm_to_m3s};

use crate::profile::FittingLocation;
use crate::result::SolveResult;

/// Limits checked by `check_compliance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceLimits {
    pub min_terminal_mpa: f64,
    pub max_terminal_mpa: f64,
    pub max_branch_velocity_mps: f64,
    pub max_cross_main_velocity_mps: f64,
}

impl Default for ComplianceLimits {
    fn default() -> Self {
        Self {
            min_terminal_mpa: defaults::MIN_TERMINAL_PRESSURE_MPA,
            max_terminal_mpa: defaults::MAX_TERMINAL_PRESSURE_MPA,
            max_branch_velocity_mps: defaults::MAX_VELOCITY_BRANCH_MPS,
            max_cross_main_velocity_mps: defaults::MAX_VELOCITY_OTHER_MPS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureBound {
    Under,
    Over,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation {
    BranchVelocity {
        branch: usize,
        /// 1-based
        head: usize,
        pipe_size: PipeSize,
        velocity_mps: f64,
        limit_mps: f64,
    },
    CrossMainVelocity {
        pipe_size: PipeSize,
        velocity_mps: f64,
        limit_mps: f64,
    },
    TerminalPressure {
        branch: usize,
        bound: PressureBound,
        pressure_mpa: f64,
        limit_mpa: f64,
    },
    BlockedFitting {
        branch: usize,
        location: FittingLocation,
        bead_height_mm: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub violations: Vec<Violation>,
    pub is_compliant: bool,
}

impl ComplianceResult {
    pub fn velocity_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| {
            matches!(
                v,
                Violation::BranchVelocity { .. } | Violation::CrossMainVelocity { .. }
            )
        })
    }

    pub fn pressure_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| matches!(v, Violation::TerminalPressure { .. }))
    }
}

/// Check `result` against the default limits.
pub fn check_compliance(result: &SolveResult) -> ComplianceResult {
    check_compliance_with(result, &ComplianceLimits::default())
}

/// Collect every violation of `limits` in `result`.
pub fn check_compliance_with(result: &SolveResult, limits: &ComplianceLimits) -> ComplianceResult {
    let mut violations = Vec::new();

    for profile in &result.branch_profiles {
        for seg in &profile.segments {
            if seg.velocity_mps > limits.max_branch_velocity_mps {
                violations.push(Violation::BranchVelocity {
                    branch: profile.branch_index,
                    head: seg.head_number,
                    pipe_size: seg.pipe_size,
                    velocity_mps: seg.velocity_mps,
                    limit_mps: limits.max_branch_velocity_mps,
                });
            }
        }
    }

    let cross_main_velocity = cross_main_velocity_mps(result);
    if cross_main_velocity > limits.max_cross_main_velocity_mps {
        violations.push(Violation::CrossMainVelocity {
            pipe_size: result.cross_main_size,
            velocity_mps: cross_main_velocity,
            limit_mps: limits.max_cross_main_velocity_mps,
        });
    }

    for (branch, &p) in result.terminal_pressures_mpa.iter().enumerate() {
        let bound = if p < limits.min_terminal_mpa {
            Some((PressureBound::Under, limits.min_terminal_mpa))
        } else if p > limits.max_terminal_mpa {
            Some((PressureBound::Over, limits.max_terminal_mpa))
        } else {
            None
        };
        if let Some((bound, limit_mpa)) = bound {
            violations.push(Violation::TerminalPressure {
                branch,
                bound,
                pressure_mpa: p,
                limit_mpa,
            });
        }
    }

    violations.extend(result.blocked_fittings.iter().map(|b| Violation::BlockedFitting {
        branch: b.branch,
        location: b.location,
        bead_height_mm: b.bead_height_mm,
    }));

    ComplianceResult {
        is_compliant: violations.is_empty(),
        violations,
    }
}

/// Highest cross-main velocity.
///
/// Grid results use the stored cross-main pipe flows. Tree results carry the
/// full supply just past the inlet, rebuilt from the branches' first-segment flows.
pub fn cross_main_velocity_mps(result: &SolveResult) -> f64 {
    let flow_lpm = match &result.grid {
        Some(grid) => grid.max_cross_main_flow_lpm,
        None => result
            .branch_profiles
            .iter()
            .filter_map(|p| p.segments.first())
            .map(|s| s.flow_lpm)
            .sum(),
    };
    let area = result.cross_main_size.flow_area_m2();
    if area > 0.0 {
        lpm_to_m3s(flow_lpm) / area
    } else {
        0.0
    }
}
