//! Scenario schema definitions.
//!
//! Every section defaults to the design values, so a file only needs the
//! fields it changes.

use serde::{Deserialize, Serialize};
use sf_core::defaults;

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioFile {
    #[serde(default = "latest_version")]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub network: NetworkDef,
    #[serde(default)]
    pub solver: SolverDef,
    #[serde(default)]
    pub analysis: AnalysisDef,
}

fn latest_version() -> u32 {
    LATEST_VERSION
}

impl Default for ScenarioFile {
    fn default() -> Self {
        Self {
            version: LATEST_VERSION,
            name: String::new(),
            network: NetworkDef::default(),
            solver: SolverDef::default(),
            analysis: AnalysisDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkDef {
    pub num_branches: u32,
    pub heads_per_branch: u32,
    pub branch_spacing_m: f64,
    pub head_spacing_m: f64,
    pub inlet_pressure_mpa: f64,
    pub total_flow_lpm: f64,
    /// Bead height at every fitting, unless `bead_heights_mm` is given (mm)
    pub bead_height_mm: f64,
    /// Per-fitting bead heights, `[branch][head]` (mm)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bead_heights_mm: Option<Vec<Vec<f64>>>,
    pub weld_beads: WeldBeadsDef,
    pub losses: LossesDef,
}

impl Default for NetworkDef {
    fn default() -> Self {
        Self {
            num_branches: defaults::NUM_BRANCHES,
            heads_per_branch: defaults::HEADS_PER_BRANCH,
            branch_spacing_m: defaults::BRANCH_SPACING_M,
            head_spacing_m: defaults::HEAD_SPACING_M,
            inlet_pressure_mpa: defaults::INLET_PRESSURE_MPA,
            total_flow_lpm: defaults::TOTAL_FLOW_LPM,
            bead_height_mm: 0.0,
            bead_heights_mm: None,
            weld_beads: WeldBeadsDef::default(),
            losses: LossesDef::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeldBeadsDef {
    pub per_branch: u32,
    pub height_mm: f64,
}

impl Default for WeldBeadsDef {
    fn default() -> Self {
        Self {
            per_branch: 0,
            height_mm: defaults::BEAD_HEIGHT_MM,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LossesDef {
    pub k1_base: f64,
    pub k2: f64,
    pub k3: f64,
    pub k_tee_run: f64,
}

impl Default for LossesDef {
    fn default() -> Self {
        Self {
            k1_base: defaults::K1_BASE,
            k2: defaults::K2_HEAD,
            k3: defaults::K3_BRANCH_ENTRY,
            k_tee_run: defaults::K_TEE_RUN,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TopologyDef {
    #[default]
    Tree,
    Grid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverDef {
    pub topology: TopologyDef,
    pub max_iterations: usize,
    pub tolerance_m: f64,
    pub tolerance_lpm: f64,
    pub relaxation: f64,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            topology: TopologyDef::Tree,
            max_iterations: defaults::HC_MAX_ITERATIONS,
            tolerance_m: defaults::HC_TOLERANCE_M,
            tolerance_lpm: defaults::HC_TOLERANCE_LPM,
            relaxation: defaults::HC_RELAXATION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AnalysisDef {
    pub cases: CasesDef,
    pub monte_carlo: MonteCarloDef,
    pub bernoulli: BernoulliDef,
    pub sensitivity: SensitivityDef,
    pub system_curve: SystemCurveDef,
}

/// Case A (conventional) against case B (shape-controlled welding).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CasesDef {
    pub bead_height_existing_mm: f64,
    pub bead_height_new_mm: f64,
    pub beads_per_branch: u32,
}

impl Default for CasesDef {
    fn default() -> Self {
        Self {
            bead_height_existing_mm: defaults::BEAD_HEIGHT_MM,
            bead_height_new_mm: defaults::NEW_TECH_BEAD_HEIGHT_MM,
            beads_per_branch: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonteCarloDef {
    pub iterations: usize,
    pub min_defects: usize,
    pub max_defects: usize,
    pub bead_height_mm: f64,
    pub weld_beads_per_branch: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MonteCarloDef {
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

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BernoulliDef {
    pub p_values: Vec<f64>,
    pub iterations: usize,
    pub bead_height_mm: f64,
    pub weld_beads_per_branch: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for BernoulliDef {
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

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensitivityDef {
    pub bead_height_mm: f64,
    pub weld_beads_per_branch: u32,
}

impl Default for SensitivityDef {
    fn default() -> Self {
        Self {
            bead_height_mm: defaults::BEAD_HEIGHT_MM,
            weld_beads_per_branch: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SystemCurveDef {
    pub max_flow_lpm: f64,
    pub points: usize,
}

impl Default for SystemCurveDef {
    fn default() -> Self {
        Self {
            max_flow_lpm: 2.0 * defaults::TOTAL_FLOW_LPM,
            points: 20,
        }
    }
}
