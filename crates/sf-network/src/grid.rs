//! Dual cross-main looped ("grid") network.
//!
//! Layout for `n` branches:
//!
//! ```text
//!  inlet
//!  TOP-0 ── top[0] ── TOP-1 ── top[1] ── ... ── TOP-n
//!    │                  │                          │
//!  left              branch 0        ...       branch n-1, right
//!    │                  │                          │
//!  BOT-0 ── bot[0] ── BOT-1 ── bot[1] ── ... ── BOT-n
//! ```
//!
//! Branch `b` joins TOP `b+1` to BOTTOM `b+1`; the right connector runs in
//! parallel with the last branch. Every branch pipe draws `Q/n` off along its
//! length through its heads, fed from both cross-mains, so its signed flow is
//! the TOP-end inflow and `Q/n - flow` enters from the BOTTOM end.
//!
//! Loop 0 is the outer ring (top run, right connector, bottom run back, left
//! connector). Loop `b+1` closes branch `b` through the cross-mains and the
//! right connector, so every branch pipe sits in exactly one loop.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use sf_core::pipes::cross_main_size;
use sf_core::{LoopId, NodeId, PipeId, PipeSize};
use tracing::debug;

use crate::branch::Branch;
use crate::builder::GridBuilder;
use crate::error::NetworkError;
use crate::params::{LossCoefficients, NetworkParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Row {
    Top = 0,
    Bottom = 1,
}

impl Row {
    pub fn label(self) -> &'static str {
        match self {
            Row::Top => "TOP",
            Row::Bottom => "BOT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridNode {
    pub id: NodeId,
    pub row: Row,
    pub col: usize,
    /// External draw (LPM)
    pub demand_lpm: f64,
    pub is_inlet: bool,
}

impl GridNode {
    /// Display label such as `TOP-3`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.row.label(), self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipeKind {
    CrossMainTop,
    CrossMainBottom,
    Branch { branch_index: usize },
    Connector,
}

impl PipeKind {
    pub fn is_cross_main(self) -> bool {
        matches!(self, PipeKind::CrossMainTop | PipeKind::CrossMainBottom)
    }
}

/// A pipe between two grid nodes; positive flow runs start to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPipe {
    pub id: PipeId,
    pub kind: PipeKind,
    pub start: NodeId,
    pub end: NodeId,
    pub size: PipeSize,
    pub length_m: f64,
    /// Flow drawn off along the pipe (LPM)
    pub draw_lpm: f64,
}

impl GridPipe {
    pub fn inner_diameter_m(&self) -> f64 {
        self.size.inner_diameter_m()
    }

    /// Flow leaving the pipe at its end node for start-node inflow `q`.
    pub fn end_flow(&self, q: f64) -> f64 {
        q - self.draw_lpm
    }

    /// The node across the pipe from `node`, if `node` is an endpoint.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if node == self.start {
            Some(self.end)
        } else if node == self.end {
            Some(self.start)
        } else {
            None
        }
    }
}

/// Independent cycle used by the loop-flow correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLoop {
    pub id: LoopId,
    pub pipes: Vec<PipeId>,
    /// +1 when the loop walks the pipe start to end, -1 otherwise
    pub directions: Vec<i8>,
}

impl GridLoop {
    pub fn members(&self) -> impl Iterator<Item = (PipeId, f64)> + '_ {
        self.pipes
            .iter()
            .zip(&self.directions)
            .map(|(&p, &d)| (p, f64::from(d)))
    }
}

/// Validated, immutable pipe graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTopology {
    pub(crate) nodes: Vec<GridNode>,
    pub(crate) pipes: Vec<GridPipe>,
    pub(crate) loops: Vec<GridLoop>,
    pub(crate) node_pipe_offsets: Vec<usize>,
    pub(crate) node_pipes: Vec<PipeId>,
}

impl GridTopology {
    pub fn nodes(&self) -> &[GridNode] {
        &self.nodes
    }

    pub fn pipes(&self) -> &[GridPipe] {
        &self.pipes
    }

    pub fn loops(&self) -> &[GridLoop] {
        &self.loops
    }

    pub fn node(&self, id: NodeId) -> Option<&GridNode> {
        self.nodes.get(id.idx())
    }

    pub fn pipe(&self, id: PipeId) -> Option<&GridPipe> {
        self.pipes.get(id.idx())
    }

    /// Pipes touching `node`, in id order.
    pub fn incident_pipes(&self, node: NodeId) -> &[PipeId] {
        let i = node.idx();
        match (self.node_pipe_offsets.get(i), self.node_pipe_offsets.get(i + 1)) {
            (Some(&a), Some(&b)) => &self.node_pipes[a..b],
            _ => &[],
        }
    }

    pub fn cycle_rank(&self) -> usize {
        (self.pipes.len() + 1).saturating_sub(self.nodes.len())
    }

    /// `inflow + supply - outflow - demand` per node, for signed pipe `flows`.
    ///
    /// A pipe takes `q` from its start node and hands `q - draw` to its end node.
    pub fn node_balances(&self, flows: &[f64], supply_lpm: f64) -> Vec<f64> {
        let mut balance: Vec<f64> = self
            .nodes
            .iter()
            .map(|n| {
                let supply = if n.is_inlet { supply_lpm } else { 0.0 };
                supply - n.demand_lpm
            })
            .collect();
        for (pipe, &q) in self.pipes.iter().zip(flows) {
            balance[pipe.start.idx()] -= q;
            balance[pipe.end.idx()] += pipe.end_flow(q);
        }
        balance
    }

    /// Node demands plus pipe draws (LPM).
    pub fn total_draw_lpm(&self) -> f64 {
        let nodes: f64 = self.nodes.iter().map(|n| n.demand_lpm).sum();
        let pipes: f64 = self.pipes.iter().map(|p| p.draw_lpm).sum();
        nodes + pipes
    }
}

/// Grid network: pipe graph plus the branch fixtures on its branch pipes.
#[derive(Debug, Clone, PartialEq)]
pub struct GridNetwork {
    pub topology: GridTopology,
    pub branches: Vec<Branch>,
    pub inlet: NodeId,
    pub inlet_pressure_mpa: f64,
    pub total_flow_lpm: f64,
    pub num_branches: usize,
    pub heads_per_branch: usize,
    pub branch_spacing_m: f64,
    pub head_spacing_m: f64,
    pub cross_main_size: PipeSize,
    pub losses: LossCoefficients,
}

impl GridNetwork {
    pub fn build(params: &NetworkParams) -> Result<Self, NetworkError> {
        Self::build_with_rng::<StdRng>(params, None)
    }

    pub fn build_with_rng<R: Rng + ?Sized>(
        params: &NetworkParams,
        mut rng: Option<&mut R>,
    ) -> Result<Self, NetworkError> {
        params.validate()?;

        let n = params.num_branches as usize;
        let size = cross_main_size(params.total_heads());
        let q = params.branch_flow_lpm();

        let mut b = GridBuilder::new();
        let top: Vec<NodeId> = (0..=n).map(|c| b.add_node(Row::Top, c, 0.0, c == 0)).collect();
        let bottom: Vec<NodeId> = (0..=n).map(|c| b.add_node(Row::Bottom, c, 0.0, false)).collect();

        let top_pipes: Vec<PipeId> = (0..n)
            .map(|i| b.add_pipe(PipeKind::CrossMainTop, top[i], top[i + 1], size, params.branch_spacing_m))
            .collect();
        let bottom_pipes: Vec<PipeId> = (0..n)
            .map(|i| {
                b.add_pipe(PipeKind::CrossMainBottom, bottom[i], bottom[i + 1], size, params.branch_spacing_m)
            })
            .collect();

        let branches: Vec<Branch> = (0..n)
            .map(|i| Branch::build(i, params, rng.as_deref_mut()))
            .collect();
        let branch_pipes: Vec<PipeId> = branches
            .iter()
            .map(|br| {
                let size = br.pipe_sizes.first().copied().unwrap_or(PipeSize::A25);
                let length = br.length_m();
                b.add_drawing_pipe(
                    PipeKind::Branch { branch_index: br.index },
                    top[br.index + 1],
                    bottom[br.index + 1],
                    size,
                    length,
                    q,
                )
            })
            .collect();

        let left = b.add_pipe(PipeKind::Connector, top[0], bottom[0], size, params.head_spacing_m);
        let right = b.add_pipe(PipeKind::Connector, top[n], bottom[n], size, params.head_spacing_m);

        let ring: Vec<(PipeId, i8)> = top_pipes
            .iter()
            .map(|&p| (p, 1))
            .chain([(right, 1)])
            .chain(bottom_pipes.iter().rev().map(|&p| (p, -1)))
            .chain([(left, -1)])
            .collect();
        b.add_loop(&ring);
        for (i, &branch) in branch_pipes.iter().enumerate() {
            let members: Vec<(PipeId, i8)> = [(branch, 1)]
                .into_iter()
                .chain(bottom_pipes[i + 1..].iter().map(|&p| (p, 1)))
                .chain([(right, -1)])
                .chain(top_pipes[i + 1..].iter().rev().map(|&p| (p, -1)))
                .collect();
            b.add_loop(&members);
        }

        let topology = b.build()?;
        debug!(
            nodes = topology.nodes().len(),
            pipes = topology.pipes().len(),
            loops = topology.loops().len(),
            cross_main = %size,
            "Grid network built"
        );

        Ok(Self {
            topology,
            branches,
            inlet: top[0],
            inlet_pressure_mpa: params.inlet_pressure_mpa,
            total_flow_lpm: params.total_flow_lpm,
            num_branches: n,
            heads_per_branch: params.heads_per_branch as usize,
            branch_spacing_m: params.branch_spacing_m,
            head_spacing_m: params.head_spacing_m,
            cross_main_size: size,
            losses: params.losses,
        })
    }

    pub fn total_heads(&self) -> usize {
        self.num_branches * self.heads_per_branch
    }

    pub fn top_node(&self, col: usize) -> NodeId {
        NodeId::from_usize(col)
    }

    pub fn bottom_node(&self, col: usize) -> NodeId {
        NodeId::from_usize(self.num_branches + 1 + col)
    }

    pub fn top_pipe(&self, i: usize) -> PipeId {
        PipeId::from_usize(i)
    }

    pub fn bottom_pipe(&self, i: usize) -> PipeId {
        PipeId::from_usize(self.num_branches + i)
    }

    pub fn branch_pipe(&self, b: usize) -> PipeId {
        PipeId::from_usize(2 * self.num_branches + b)
    }

    pub fn left_connector(&self) -> PipeId {
        PipeId::from_usize(3 * self.num_branches)
    }

    pub fn right_connector(&self) -> PipeId {
        PipeId::from_usize(3 * self.num_branches + 1)
    }

    /// Initial flows: half the supply down each cross-main.
    ///
    /// Each branch takes `q/2`, the left connector `Q/2`, the right connector
    /// nothing, and cross-main segment `i` carries `Q/2 - i q/2` in both rows.
    /// Every node balances exactly.
    pub fn balanced_flows(&self) -> Vec<f64> {
        let n = self.num_branches;
        let total = self.total_flow_lpm;
        let q = total / n as f64;

        let mut flows = vec![0.0; self.topology.pipes.len()];
        for i in 0..n {
            let run = total / 2.0 - i as f64 * q / 2.0;
            flows[self.top_pipe(i).idx()] = run;
            flows[self.bottom_pipe(i).idx()] = run;
            flows[self.branch_pipe(i).idx()] = q / 2.0;
        }
        flows[self.left_connector().idx()] = total / 2.0;
        flows[self.right_connector().idx()] = 0.0;
        flows
    }

    pub fn node_balances(&self, flows: &[f64]) -> Vec<f64> {
        self.topology.node_balances(flows, self.total_flow_lpm)
    }

    /// Loop that closes branch `b` (loop 0 is the outer ring).
    pub fn branch_loop(&self, b: usize) -> LoopId {
        LoopId::from_usize(b + 1)
    }

    /// Share of branch `b`'s draw fed from the BOTTOM cross-main, for signed pipe `flows`.
    pub fn bottom_inflow_lpm(&self, b: usize, flows: &[f64]) -> f64 {
        let pid = self.branch_pipe(b);
        match (self.topology.pipe(pid), flows.get(pid.idx())) {
            (Some(pipe), Some(&q)) => -pipe.end_flow(q),
            _ => 0.0,
        }
    }

    /// Check a caller-supplied flow vector for length and nodal balance.
    pub fn check_mass_balance(&self, flows: &[f64], tolerance_lpm: f64) -> Result<(), NetworkError> {
        if flows.len() != self.topology.pipes.len() {
            return Err(NetworkError::invalid(
                "flows",
                flows.len(),
                "must have one entry per pipe",
            ));
        }
        if let Some(q) = flows.iter().find(|q| !q.is_finite()) {
            return Err(NetworkError::invalid("flows", q, "must be finite"));
        }
        for (node, imbalance) in self.topology.nodes.iter().zip(self.node_balances(flows)) {
            if imbalance.abs() > tolerance_lpm {
                return Err(NetworkError::invalid(
                    "flows",
                    format!("{:.6} LPM at {}", imbalance, node.label()),
                    "must satisfy nodal mass balance",
                ));
            }
        }
        Ok(())
    }
}
