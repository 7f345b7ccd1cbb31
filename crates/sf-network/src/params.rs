//! Network input parameters and their validation.

use serde::{Deserialize, Serialize};
use sf_core::defaults;

use crate::beads::WeldBead;
use crate::error::NetworkError;

/// Minor-loss coefficients shared by every fitting of one network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossCoefficients {
    /// Welded fitting K with no bead
    pub k1_base: f64,
    /// Sprinkler head fitting K
    pub k2: f64,
    /// Branch entry (tee branch) K
    pub k3: f64,
    /// Cross-main tee-run K
    pub k_tee_run: f64,
}

impl Default for LossCoefficients {
    fn default() -> Self {
        Self {
            k1_base: defaults::K1_BASE,
            k2: defaults::K2_HEAD,
            k3: defaults::K3_BRANCH_ENTRY,
            k_tee_run: defaults::K_TEE_RUN,
        }
    }
}

/// Straight-run weld beads generated per branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeldBeadSpec {
    pub per_branch: u32,
    pub height_mm: f64,
}

impl Default for WeldBeadSpec {
    fn default() -> Self {
        Self {
            per_branch: 0,
            height_mm: defaults::BEAD_HEIGHT_MM,
        }
    }
}

/// Everything needed to build a tree or grid network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    pub num_branches: u32,
    pub heads_per_branch: u32,
    pub branch_spacing_m: f64,
    pub head_spacing_m: f64,
    pub inlet_pressure_mpa: f64,
    pub total_flow_lpm: f64,
    /// Fitting bead heights `[branch][head]` in mm; `None` means clean joints.
    pub bead_heights_mm: Option<Vec<Vec<f64>>>,
    pub losses: LossCoefficients,
    pub weld_beads: WeldBeadSpec,
    /// Pre-placed weld beads per branch, used instead of generating them.
    pub weld_bead_layout: Option<Vec<Vec<WeldBead>>>,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            num_branches: defaults::NUM_BRANCHES,
            heads_per_branch: defaults::HEADS_PER_BRANCH,
            branch_spacing_m: defaults::BRANCH_SPACING_M,
            head_spacing_m: defaults::HEAD_SPACING_M,
            inlet_pressure_mpa: defaults::INLET_PRESSURE_MPA,
            total_flow_lpm: defaults::TOTAL_FLOW_LPM,
            bead_heights_mm: None,
            losses: LossCoefficients::default(),
            weld_beads: WeldBeadSpec::default(),
            weld_bead_layout: None,
        }
    }
}

impl NetworkParams {
    pub fn new(num_branches: u32, heads_per_branch: u32) -> Self {
        Self {
            num_branches,
            heads_per_branch,
            ..Self::default()
        }
    }

    pub fn with_spacing(mut self, branch_spacing_m: f64, head_spacing_m: f64) -> Self {
        self.branch_spacing_m = branch_spacing_m;
        self.head_spacing_m = head_spacing_m;
        self
    }

    pub fn with_inlet_pressure(mut self, mpa: f64) -> Self {
        self.inlet_pressure_mpa = mpa;
        self
    }

    pub fn with_total_flow(mut self, lpm: f64) -> Self {
        self.total_flow_lpm = lpm;
        self
    }

    pub fn with_bead_heights(mut self, heights_mm: Vec<Vec<f64>>) -> Self {
        self.bead_heights_mm = Some(heights_mm);
        self
    }

    /// Same bead height at every fitting.
    pub fn with_uniform_bead_height(self, height_mm: f64) -> Self {
        let grid = vec![vec![height_mm; self.heads_per_branch as usize]; self.num_branches as usize];
        self.with_bead_heights(grid)
    }

    pub fn with_losses(mut self, losses: LossCoefficients) -> Self {
        self.losses = losses;
        self
    }

    pub fn with_weld_beads(mut self, per_branch: u32, height_mm: f64) -> Self {
        self.weld_beads = WeldBeadSpec {
            per_branch,
            height_mm,
        };
        self
    }

    pub fn with_weld_bead_layout(mut self, layout: Vec<Vec<WeldBead>>) -> Self {
        self.weld_bead_layout = Some(layout);
        self
    }

    pub fn total_heads(&self) -> u32 {
        self.num_branches * self.heads_per_branch
    }

    /// Number of welded fittings (one per head).
    pub fn fitting_count(&self) -> usize {
        self.total_heads() as usize
    }

    pub fn branch_flow_lpm(&self) -> f64 {
        self.total_flow_lpm / self.num_branches as f64
    }

    pub fn head_flow_lpm(&self) -> f64 {
        self.branch_flow_lpm() / self.heads_per_branch as f64
    }

    /// Bead height at fitting `(branch, head)`; 0.0 when no grid is set.
    pub fn bead_height(&self, branch: usize, head: usize) -> f64 {
        self.bead_heights_mm
            .as_ref()
            .and_then(|grid| grid.get(branch))
            .and_then(|row| row.get(head))
            .copied()
            .unwrap_or(0.0)
    }

    /// Reject inputs that cannot describe a physical network.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.num_branches < 1 {
            return Err(NetworkError::invalid(
                "num_branches",
                self.num_branches,
                "must be at least 1",
            ));
        }
        if self.num_branches > defaults::MAX_BRANCHES {
            return Err(NetworkError::invalid(
                "num_branches",
                self.num_branches,
                "exceeds the maximum of 200",
            ));
        }
        if self.heads_per_branch < 1 {
            return Err(NetworkError::invalid(
                "heads_per_branch",
                self.heads_per_branch,
                "must be at least 1",
            ));
        }
        if self.heads_per_branch > defaults::MAX_HEADS_PER_BRANCH {
            return Err(NetworkError::invalid(
                "heads_per_branch",
                self.heads_per_branch,
                "exceeds the maximum of 50",
            ));
        }

        positive("branch_spacing_m", self.branch_spacing_m)?;
        positive("head_spacing_m", self.head_spacing_m)?;
        positive("inlet_pressure_mpa", self.inlet_pressure_mpa)?;
        positive("total_flow_lpm", self.total_flow_lpm)?;

        non_negative("losses.k1_base", self.losses.k1_base)?;
        non_negative("losses.k2", self.losses.k2)?;
        non_negative("losses.k3", self.losses.k3)?;
        non_negative("losses.k_tee_run", self.losses.k_tee_run)?;

        if self.weld_beads.per_branch > defaults::MAX_BEADS_PER_BRANCH {
            return Err(NetworkError::invalid(
                "weld_beads.per_branch",
                self.weld_beads.per_branch,
                "exceeds the maximum of 20",
            ));
        }
        non_negative("weld_beads.height_mm", self.weld_beads.height_mm)?;

        let n = self.num_branches as usize;
        let m = self.heads_per_branch as usize;

        if let Some(grid) = &self.bead_heights_mm {
            if grid.len() != n || grid.iter().any(|row| row.len() != m) {
                return Err(NetworkError::invalid(
                    "bead_heights_mm",
                    format!("{} rows", grid.len()),
                    "must be num_branches x heads_per_branch",
                ));
            }
            for &h in grid.iter().flatten() {
                non_negative("bead_heights_mm", h)?;
            }
        }

        if let Some(layout) = &self.weld_bead_layout {
            if layout.len() != n {
                return Err(NetworkError::invalid(
                    "weld_bead_layout",
                    format!("{} branches", layout.len()),
                    "must have one entry per branch",
                ));
            }
            for bead in layout.iter().flatten() {
                if bead.segment_index >= m {
                    return Err(NetworkError::invalid(
                        "weld_bead_layout.segment_index",
                        bead.segment_index,
                        "must be below heads_per_branch",
                    ));
                }
                non_negative("weld_bead_layout.height_mm", bead.height_mm)?;
                non_negative(
                    "weld_bead_layout.position_in_segment_m",
                    bead.position_in_segment_m,
                )?;
                if let Some(k) = bead.k_value {
                    non_negative("weld_bead_layout.k_value", k)?;
                }
            }
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), NetworkError> {
    if !value.is_finite() {
        return Err(NetworkError::invalid(field, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(NetworkError::invalid(field, value, "must be positive"));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), NetworkError> {
    if !value.is_finite() {
        return Err(NetworkError::invalid(field, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(NetworkError::invalid(field, value, "must not be negative"));
    }
    Ok(())
}
