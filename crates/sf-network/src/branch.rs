//! One sprinkler branch: head junctions, segment sizes and weld beads.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sf_core::PipeSize;
use sf_core::pipes::branch_pipe_sizes;
use sf_hydraulics::welded_fitting_k;

use crate::beads::{WeldBead, generate_branch_beads};
use crate::params::NetworkParams;

/// A straight run of one nominal size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeSegment {
    pub index: usize,
    pub size: PipeSize,
    pub inner_diameter_m: f64,
    pub length_m: f64,
}

impl PipeSegment {
    pub fn new(index: usize, size: PipeSize, length_m: f64) -> Self {
        Self {
            index,
            size,
            inner_diameter_m: size.inner_diameter_m(),
            length_m,
        }
    }
}

/// Sprinkler head tap and the welded fitting that feeds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadJunction {
    /// 0-based, inlet first
    pub index: usize,
    /// Segment upstream of this head
    pub segment: PipeSegment,
    pub bead_height_mm: f64,
    /// Welded fitting K; `None` when the bead closes the bore
    pub k1: Option<f64>,
    pub k2: f64,
    pub head_flow_lpm: f64,
}

/// A branch line of `m` heads fed from the cross-main.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub index: usize,
    pub junctions: Vec<HeadJunction>,
    pub pipe_sizes: Vec<PipeSize>,
    pub weld_beads: Vec<WeldBead>,
    /// Equal-split design flow; the grid solver overrides it with the pipe flow.
    pub design_flow_lpm: f64,
}

impl Branch {
    /// Build branch `index` of the network described by `params`.
    ///
    /// Weld beads come from `params.weld_bead_layout` when set, otherwise they
    /// are generated (`rng = None` for even spacing).
    pub fn build<R: Rng + ?Sized>(
        index: usize,
        params: &NetworkParams,
        rng: Option<&mut R>,
    ) -> Self {
        let m = params.heads_per_branch as usize;
        let pipe_sizes = branch_pipe_sizes(params.heads_per_branch);
        let head_flow = params.head_flow_lpm();

        let junctions = pipe_sizes
            .iter()
            .enumerate()
            .map(|(h, &size)| {
                let bead = params.bead_height(index, h);
                HeadJunction {
                    index: h,
                    segment: PipeSegment::new(h, size, params.head_spacing_m),
                    bead_height_mm: bead,
                    k1: welded_fitting_k(bead, size.inner_diameter_mm(), params.losses.k1_base),
                    k2: params.losses.k2,
                    head_flow_lpm: head_flow,
                }
            })
            .collect();

        let weld_beads = match &params.weld_bead_layout {
            Some(layout) => layout.get(index).cloned().unwrap_or_default(),
            None => generate_branch_beads(
                m,
                params.head_spacing_m,
                params.weld_beads.per_branch as usize,
                params.weld_beads.height_mm,
                &pipe_sizes,
                params.losses.k1_base,
                rng,
            ),
        };

        Self {
            index,
            junctions,
            pipe_sizes,
            weld_beads,
            design_flow_lpm: params.branch_flow_lpm(),
        }
    }

    pub fn num_heads(&self) -> usize {
        self.junctions.len()
    }

    /// Inlet segment, which sets the branch-entry velocity.
    pub fn first_segment(&self) -> Option<&PipeSegment> {
        self.junctions.first().map(|j| &j.segment)
    }

    /// Segment at the far end, which sets the entry velocity of a branch fed from both ends.
    pub fn last_segment(&self) -> Option<&PipeSegment> {
        self.junctions.last().map(|j| &j.segment)
    }

    pub fn beads_in_segment(&self, segment: usize) -> impl Iterator<Item = &WeldBead> {
        self.weld_beads
            .iter()
            .filter(move |b| b.segment_index == segment)
    }

    pub fn length_m(&self) -> f64 {
        self.junctions.iter().map(|j| j.segment.length_m).sum()
    }
}
