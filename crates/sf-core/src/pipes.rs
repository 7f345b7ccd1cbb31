//! Nominal pipe table and NFSC-103 style auto-sizing rules.
//!
//! Sizing thresholds are data: ordered `(minimum heads, size)` lists scanned
//! top-down, so changing a rule never touches control flow.

use crate::units::{Length, mm, mm_to_m};
use std::fmt;

/// Nominal carbon-steel pipe size (Sch. 40 dimensions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PipeSize {
    #[cfg_attr(feature = "serde", serde(rename = "25A"))]
    A25,
    #[cfg_attr(feature = "serde", serde(rename = "32A"))]
    A32,
    #[cfg_attr(feature = "serde", serde(rename = "40A"))]
    A40,
    #[cfg_attr(feature = "serde", serde(rename = "50A"))]
    A50,
    #[cfg_attr(feature = "serde", serde(rename = "65A"))]
    A65,
    #[cfg_attr(feature = "serde", serde(rename = "80A"))]
    A80,
    #[cfg_attr(feature = "serde", serde(rename = "100A"))]
    A100,
}

/// Row of the dimension table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeDimensions {
    pub outer_diameter_mm: f64,
    pub wall_mm: f64,
    pub inner_diameter_mm: f64,
}

impl PipeSize {
    pub const ALL: [PipeSize; 7] = [
        PipeSize::A25,
        PipeSize::A32,
        PipeSize::A40,
        PipeSize::A50,
        PipeSize::A65,
        PipeSize::A80,
        PipeSize::A100,
    ];

    pub const fn dimensions(self) -> PipeDimensions {
        let (outer_diameter_mm, wall_mm, inner_diameter_mm) = match self {
            PipeSize::A25 => (33.40, 3.38, 26.64),
            PipeSize::A32 => (42.16, 3.56, 35.04),
            PipeSize::A40 => (48.26, 3.68, 40.90),
            PipeSize::A50 => (60.33, 3.91, 52.51),
            PipeSize::A65 => (73.03, 5.16, 62.71),
            PipeSize::A80 => (88.90, 5.49, 77.92),
            PipeSize::A100 => (114.30, 6.02, 102.26),
        };
        PipeDimensions {
            outer_diameter_mm,
            wall_mm,
            inner_diameter_mm,
        }
    }

    pub const fn inner_diameter_mm(self) -> f64 {
        self.dimensions().inner_diameter_mm
    }

    pub fn inner_diameter_m(self) -> f64 {
        mm_to_m(self.inner_diameter_mm())
    }

    pub fn inner_diameter(self) -> Length {
        mm(self.inner_diameter_mm())
    }

    /// Flow area (m2).
    pub fn flow_area_m2(self) -> f64 {
        let r = self.inner_diameter_m() / 2.0;
        std::f64::consts::PI * r * r
    }

    pub const fn label(self) -> &'static str {
        match self {
            PipeSize::A25 => "25A",
            PipeSize::A32 => "32A",
            PipeSize::A40 => "40A",
            PipeSize::A50 => "50A",
            PipeSize::A65 => "65A",
            PipeSize::A80 => "80A",
            PipeSize::A100 => "100A",
        }
    }

    pub fn from_label(label: &str) -> Option<PipeSize> {
        PipeSize::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for PipeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Branch segment sizing by number of heads downstream of (and including) the segment.
pub const BRANCH_SIZING: &[(u32, PipeSize)] = &[
    (12, PipeSize::A65),
    (6, PipeSize::A50),
    (4, PipeSize::A40),
    (3, PipeSize::A32),
    (0, PipeSize::A25),
];

/// Cross-main sizing by total head count of the whole system.
pub const CROSS_MAIN_SIZING: &[(u32, PipeSize)] = &[
    (40, PipeSize::A100),
    (20, PipeSize::A80),
    (0, PipeSize::A65),
];

fn lookup(table: &[(u32, PipeSize)], heads: u32) -> PipeSize {
    table
        .iter()
        .find(|(min_heads, _)| heads >= *min_heads)
        .map(|(_, size)| *size)
        .unwrap_or(PipeSize::A25)
}

/// Branch segment size for `downstream_heads` heads fed through the segment.
pub fn branch_pipe_size(downstream_heads: u32) -> PipeSize {
    lookup(BRANCH_SIZING, downstream_heads)
}

/// Cross-main size for a system with `total_heads` heads.
pub fn cross_main_size(total_heads: u32) -> PipeSize {
    lookup(CROSS_MAIN_SIZING, total_heads)
}

/// Per-head segment sizes for a branch of `heads` heads, inlet first.
pub fn branch_pipe_sizes(heads: u32) -> Vec<PipeSize> {
    (0..heads).map(|i| branch_pipe_size(heads - i)).collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sizing_is_monotone(a in 0u32..200, b in 0u32..200) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(branch_pipe_size(lo) <= branch_pipe_size(hi));
            prop_assert!(cross_main_size(lo) <= cross_main_size(hi));
        }
    }
}
