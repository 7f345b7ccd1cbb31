//! Sequential pressure profile along one branch.

use serde::{Deserialize, Serialize};
use sf_core::defaults::MIN_FLOW_LPM;
use sf_core::units::constants::ROUGHNESS_M;
use sf_core::{PipeSize, head_to_mpa};
use sf_hydraulics::{friction_factor, major_loss, minor_loss, reynolds_water, velocity_from_lpm};
use sf_network::{Branch, HeadJunction, LossCoefficients, PipeSegment};

/// Per-head breakdown of one branch segment. Losses in MPa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDetail {
    /// 1-based
    pub head_number: usize,
    pub pipe_size: PipeSize,
    pub inner_diameter_mm: f64,
    pub flow_lpm: f64,
    pub velocity_mps: f64,
    pub reynolds: f64,
    pub friction_factor: f64,
    pub major_loss_mpa: f64,
    pub k1_value: Option<f64>,
    pub k1_loss_mpa: f64,
    pub k2_loss_mpa: f64,
    pub weld_beads_in_segment: usize,
    pub weld_bead_loss_mpa: f64,
    pub total_loss_mpa: f64,
    pub pressure_after_mpa: f64,
    pub bead_height_mm: f64,
}

/// Pressures at branch positions `0..=m` (0 is the branch inlet).
///
/// On a grid, position 0 is the TOP end and segment flows are signed, negative
/// toward the TOP. Segment losses are magnitudes along the local flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchProfile {
    pub branch_index: usize,
    /// Water discharged by the branch heads (LPM)
    pub flow_lpm: f64,
    /// Share of `flow_lpm` entering at the far end (grid only)
    #[serde(default)]
    pub bottom_inflow_lpm: f64,
    pub positions: Vec<usize>,
    pub pressures_mpa: Vec<f64>,
    pub cumulative_loss_mpa: Vec<f64>,
    pub k3_loss_mpa: f64,
    pub terminal_pressure_mpa: f64,
    pub segments: Vec<SegmentDetail>,
}

impl BranchProfile {
    pub fn inlet_pressure_mpa(&self) -> f64 {
        self.pressures_mpa.first().copied().unwrap_or(self.terminal_pressure_mpa)
    }

    pub fn total_loss_mpa(&self) -> f64 {
        self.cumulative_loss_mpa.last().copied().unwrap_or(0.0)
    }

    pub fn top_inflow_lpm(&self) -> f64 {
        self.flow_lpm - self.bottom_inflow_lpm
    }
}

/// Where a bore-closing bead sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FittingLocation {
    /// Welded fitting feeding head `head` (0-based)
    Fitting { head: usize },
    /// Straight-run weld bead in segment `segment`
    WeldBead { segment: usize },
}

/// A bead tall enough to close the bore; it is solved as lossless and flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockedFitting {
    pub branch: usize,
    pub location: FittingLocation,
    pub bead_height_mm: f64,
}

/// Every blocked fitting and weld bead on `branch`.
pub fn blocked_fittings(branch: &Branch) -> Vec<BlockedFitting> {
    let fittings = branch
        .junctions
        .iter()
        .filter(|j| j.k1.is_none())
        .map(|j| BlockedFitting {
            branch: branch.index,
            location: FittingLocation::Fitting { head: j.index },
            bead_height_mm: j.bead_height_mm,
        });
    let beads = branch
        .weld_beads
        .iter()
        .filter(|b| b.k_value.is_none())
        .map(|b| BlockedFitting {
            branch: branch.index,
            location: FittingLocation::WeldBead {
                segment: b.segment_index,
            },
            bead_height_mm: b.height_mm,
        });
    fittings.chain(beads).collect()
}

/// Head losses (m) of one segment at `flow_lpm`.
struct SegmentLoss {
    velocity: f64,
    reynolds: f64,
    friction: f64,
    major: f64,
    k1: f64,
    k2: f64,
    beads: f64,
    bead_count: usize,
}

impl SegmentLoss {
    fn total(&self) -> f64 {
        self.major + self.k1 + self.k2 + self.beads
    }

    /// A segment with no flow through it.
    fn still(branch: &Branch, junction: &HeadJunction) -> Self {
        SegmentLoss {
            velocity: 0.0,
            reynolds: 0.0,
            friction: 0.0,
            major: 0.0,
            k1: 0.0,
            k2: 0.0,
            beads: 0.0,
            bead_count: branch.beads_in_segment(junction.index).count(),
        }
    }
}

fn segment_loss(branch: &Branch, junction: &HeadJunction, flow_lpm: f64) -> SegmentLoss {
    let seg = &junction.segment;
    let d = seg.inner_diameter_m;
    let v = velocity_from_lpm(flow_lpm, d);
    let re = reynolds_water(v, d);
    let f = friction_factor(re, ROUGHNESS_M, d);

    let mut beads = 0.0;
    let mut bead_count = 0;
    for bead in branch.beads_in_segment(junction.index) {
        bead_count += 1;
        beads += bead.k_value.map_or(0.0, |k| minor_loss(k, v));
    }

    SegmentLoss {
        velocity: v,
        reynolds: re,
        friction: f,
        major: major_loss(f, seg.length_m, d, v),
        k1: junction.k1.map_or(0.0, |k| minor_loss(k, v)),
        k2: minor_loss(junction.k2, v),
        beads,
        bead_count,
    }
}

fn entry_loss(branch: &Branch, flow_lpm: f64, k3: f64) -> f64 {
    branch
        .first_segment()
        .map_or(0.0, |seg| minor_loss(k3, velocity_from_lpm(flow_lpm, seg.inner_diameter_m)))
}

/// Branch-entry loss at one end of a grid branch.
fn end_entry_loss(segment: Option<&PipeSegment>, q_abs: f64, k3: f64) -> f64 {
    if q_abs < MIN_FLOW_LPM {
        return 0.0;
    }
    segment.map_or(0.0, |seg| minor_loss(k3, velocity_from_lpm(q_abs, seg.inner_diameter_m)))
}

/// Signed flow toward the far end in each segment of a branch taking
/// `top_inflow_lpm` at its TOP end and drawing `draw_lpm` evenly over its heads.
fn fed_segment_flows(
    branch: &Branch,
    top_inflow_lpm: f64,
    draw_lpm: f64,
) -> impl Iterator<Item = (&HeadJunction, f64)> {
    let head_flow = draw_lpm / branch.num_heads().max(1) as f64;
    branch
        .junctions
        .iter()
        .enumerate()
        .map(move |(i, j)| (j, top_inflow_lpm - i as f64 * head_flow))
}

/// Signed head drop across a grid pipe, start to end, with its slope
/// against the pipe flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadDrop {
    /// Signed head drop (m)
    pub drop_m: f64,
    /// `sum(2 h / |q|)` over the flowing parts (m/LPM)
    pub slope: f64,
}

impl HeadDrop {
    pub const NONE: HeadDrop = HeadDrop {
        drop_m: 0.0,
        slope: 0.0,
    };
}

/// Head drop (m) across a grid branch fed from both cross-mains.
///
/// The branch draws `draw_lpm` evenly over its heads. `top_inflow_lpm` enters
/// at the TOP end and `draw_lpm - top_inflow_lpm` at the far end, so the flow
/// stagnates somewhere along the branch. Each part drops its loss along its
/// own flow direction; both ends carry a branch-entry (K3) loss.
pub fn fed_branch_drop(
    branch: &Branch,
    top_inflow_lpm: f64,
    draw_lpm: f64,
    losses: &LossCoefficients,
) -> HeadDrop {
    let mut drop_m = 0.0;
    let mut slope = 0.0;
    let mut add = |q: f64, h: f64| {
        drop_m += h.copysign(q);
        if q.abs() > MIN_FLOW_LPM {
            slope += 2.0 * h / q.abs();
        }
    };

    let bottom_inflow = draw_lpm - top_inflow_lpm;
    add(
        top_inflow_lpm,
        end_entry_loss(branch.first_segment(), top_inflow_lpm.abs(), losses.k3),
    );
    for (junction, q) in fed_segment_flows(branch, top_inflow_lpm, draw_lpm) {
        if q.abs() >= MIN_FLOW_LPM {
            add(q, segment_loss(branch, junction, q.abs()).total());
        }
    }
    // entering at the far end raises the far-end pressure above the branch
    add(
        -bottom_inflow,
        end_entry_loss(branch.last_segment(), bottom_inflow.abs(), losses.k3),
    );

    HeadDrop { drop_m, slope }
}

/// Total head loss (m) from branch inlet to terminal at `flow_lpm`.
///
/// Flows below `MIN_FLOW_LPM` contribute nothing, whole-branch and per segment.
pub fn branch_head_loss_m(branch: &Branch, flow_lpm: f64, losses: &LossCoefficients) -> f64 {
    let m = branch.num_heads();
    if flow_lpm < MIN_FLOW_LPM || m == 0 {
        return 0.0;
    }
    let head_flow = flow_lpm / m as f64;

    let mut total = entry_loss(branch, flow_lpm, losses.k3);
    for (i, junction) in branch.junctions.iter().enumerate() {
        let q = flow_lpm - i as f64 * head_flow;
        if q < MIN_FLOW_LPM {
            continue;
        }
        total += segment_loss(branch, junction, q).total();
    }
    total
}

/// Walk `branch` head by head from `inlet_mpa` at total branch flow `flow_lpm`.
///
/// Steps:
/// 1. Branch-entry (K3) loss at the inlet velocity of the first segment
/// 2. For head `i`, segment flow `flow - i * flow/m` (floored at `MIN_FLOW_LPM`)
/// 3. Major + K1 + K2 + weld-bead losses of the segment, subtracted in turn
///
/// A flow below `MIN_FLOW_LPM` leaves the pressure flat along the branch.
pub fn branch_profile(
    branch: &Branch,
    inlet_mpa: f64,
    flow_lpm: f64,
    losses: &LossCoefficients,
) -> BranchProfile {
    let m = branch.num_heads();
    let positions: Vec<usize> = (0..=m).collect();

    if flow_lpm < MIN_FLOW_LPM || m == 0 {
        return BranchProfile {
            branch_index: branch.index,
            flow_lpm,
            bottom_inflow_lpm: 0.0,
            positions,
            pressures_mpa: vec![inlet_mpa; m + 1],
            cumulative_loss_mpa: vec![0.0; m + 1],
            k3_loss_mpa: 0.0,
            terminal_pressure_mpa: inlet_mpa,
            segments: Vec::new(),
        };
    }

    let head_flow = flow_lpm / m as f64;
    let mut pressures = Vec::with_capacity(m + 1);
    let mut cumulative = Vec::with_capacity(m + 1);
    let mut segments = Vec::with_capacity(m);

    let k3_loss = head_to_mpa(entry_loss(branch, flow_lpm, losses.k3));
    let mut p = inlet_mpa;
    let mut lost = 0.0;
    pressures.push(p);
    cumulative.push(0.0);
    p -= k3_loss;
    lost += k3_loss;

    for (i, junction) in branch.junctions.iter().enumerate() {
        let q = (flow_lpm - i as f64 * head_flow).max(MIN_FLOW_LPM);
        let seg = segment_loss(branch, junction, q);
        let total = head_to_mpa(seg.total());
        p -= total;
        lost += total;
        pressures.push(p);
        cumulative.push(lost);

        segments.push(SegmentDetail {
            head_number: i + 1,
            pipe_size: junction.segment.size,
            inner_diameter_mm: junction.segment.size.inner_diameter_mm(),
            flow_lpm: q,
            velocity_mps: seg.velocity,
            reynolds: seg.reynolds,
            friction_factor: seg.friction,
            major_loss_mpa: head_to_mpa(seg.major),
            k1_value: junction.k1,
            k1_loss_mpa: head_to_mpa(seg.k1),
            k2_loss_mpa: head_to_mpa(seg.k2),
            weld_beads_in_segment: seg.bead_count,
            weld_bead_loss_mpa: head_to_mpa(seg.beads),
            total_loss_mpa: total,
            pressure_after_mpa: p,
            bead_height_mm: junction.bead_height_mm,
        });
    }

    BranchProfile {
        branch_index: branch.index,
        flow_lpm,
        bottom_inflow_lpm: 0.0,
        positions,
        pressures_mpa: pressures,
        cumulative_loss_mpa: cumulative,
        k3_loss_mpa: k3_loss,
        terminal_pressure_mpa: p,
        segments,
    }
}

/// Pressures along a grid branch fed from both cross-mains.
///
/// Starts at the TOP end pressure `top_mpa` with inflow `top_inflow_lpm` and
/// walks toward the far end, each segment dropping its loss along its own
/// flow. The terminal is the lowest head pressure, at or next to the point
/// where the two feeds meet.
pub fn fed_branch_profile(
    branch: &Branch,
    top_mpa: f64,
    top_inflow_lpm: f64,
    draw_lpm: f64,
    losses: &LossCoefficients,
) -> BranchProfile {
    let m = branch.num_heads();
    let mut pressures = Vec::with_capacity(m + 1);
    let mut cumulative = Vec::with_capacity(m + 1);
    let mut segments = Vec::with_capacity(m);

    let k3_loss = head_to_mpa(end_entry_loss(
        branch.first_segment(),
        top_inflow_lpm.abs(),
        losses.k3,
    ));
    let mut p = top_mpa;
    pressures.push(p);
    cumulative.push(0.0);
    p -= k3_loss.copysign(top_inflow_lpm);

    for (junction, q) in fed_segment_flows(branch, top_inflow_lpm, draw_lpm) {
        let seg = if q.abs() < MIN_FLOW_LPM {
            SegmentLoss::still(branch, junction)
        } else {
            segment_loss(branch, junction, q.abs())
        };
        let total = head_to_mpa(seg.total());
        p -= total.copysign(q);
        pressures.push(p);
        cumulative.push(top_mpa - p);

        segments.push(SegmentDetail {
            head_number: junction.index + 1,
            pipe_size: junction.segment.size,
            inner_diameter_mm: junction.segment.size.inner_diameter_mm(),
            flow_lpm: q,
            velocity_mps: seg.velocity,
            reynolds: seg.reynolds,
            friction_factor: seg.friction,
            major_loss_mpa: head_to_mpa(seg.major),
            k1_value: junction.k1,
            k1_loss_mpa: head_to_mpa(seg.k1),
            k2_loss_mpa: head_to_mpa(seg.k2),
            weld_beads_in_segment: seg.bead_count,
            weld_bead_loss_mpa: head_to_mpa(seg.beads),
            total_loss_mpa: total,
            pressure_after_mpa: p,
            bead_height_mm: junction.bead_height_mm,
        });
    }

    let terminal = pressures.iter().skip(1).copied().fold(f64::INFINITY, f64::min);
    BranchProfile {
        branch_index: branch.index,
        flow_lpm: draw_lpm,
        bottom_inflow_lpm: draw_lpm - top_inflow_lpm,
        positions: (0..=m).collect(),
        pressures_mpa: pressures,
        cumulative_loss_mpa: cumulative,
        k3_loss_mpa: k3_loss,
        terminal_pressure_mpa: if terminal.is_finite() { terminal } else { top_mpa },
        segments,
    }
}
