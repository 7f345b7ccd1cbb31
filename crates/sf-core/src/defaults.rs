//! Design defaults, input bounds and regulatory (NFPC) limits.

/// Base K of a welded fitting with no bead.
pub const K1_BASE: f64 = 0.5;
/// Head fitting K.
pub const K2_HEAD: f64 = 2.5;
/// Tee-branch K at the cross-main to branch take-off.
pub const K3_BRANCH_ENTRY: f64 = 1.0;
/// Tee-run K at every cross-main tap.
pub const K_TEE_RUN: f64 = 0.3;

pub const NUM_BRANCHES: u32 = 4;
pub const HEADS_PER_BRANCH: u32 = 8;
pub const BRANCH_SPACING_M: f64 = 3.5;
pub const HEAD_SPACING_M: f64 = 2.3;
pub const MAX_BRANCHES: u32 = 200;
pub const MAX_HEADS_PER_BRANCH: u32 = 50;

pub const INLET_PRESSURE_MPA: f64 = 1.4;
pub const TOTAL_FLOW_LPM: f64 = 400.0;

/// Bead height of conventional welding (mm).
pub const BEAD_HEIGHT_MM: f64 = 1.5;
/// Bead height of shape-controlled welding (mm).
pub const NEW_TECH_BEAD_HEIGHT_MM: f64 = 0.0;
pub const MAX_BEADS_PER_BRANCH: u32 = 20;

pub const MIN_TERMINAL_PRESSURE_MPA: f64 = 0.1;
pub const MAX_TERMINAL_PRESSURE_MPA: f64 = 1.2;
pub const MAX_VELOCITY_BRANCH_MPS: f64 = 6.0;
pub const MAX_VELOCITY_OTHER_MPS: f64 = 10.0;

pub const HC_MAX_ITERATIONS: usize = 1000;
pub const HC_TOLERANCE_M: f64 = 0.001;
pub const HC_TOLERANCE_LPM: f64 = 0.0001;
pub const HC_RELAXATION: f64 = 0.5;
pub const HC_RELAXATION_MIN: f64 = 0.1;
pub const HC_RELAXATION_MAX: f64 = 1.0;

/// Flows below this (LPM) carry no loss.
pub const MIN_FLOW_LPM: f64 = 0.01;

pub const MC_ITERATIONS: usize = 100;
pub const MC_MIN_DEFECTS: usize = 1;
pub const MC_MAX_DEFECTS: usize = 3;

pub const BERNOULLI_P_VALUES: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];
pub const BERNOULLI_ITERATIONS: usize = 1000;
pub const BERNOULLI_P_MIN: f64 = 0.01;
pub const BERNOULLI_P_MAX: f64 = 0.99;

/// Most points one sweep may generate.
pub const MAX_SWEEP_POINTS: usize = 10_000;

/// Inlet pressure used when probing the system curve (MPa).
pub const SYSTEM_CURVE_REFERENCE_MPA: f64 = 10.0;
