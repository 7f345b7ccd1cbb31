//! Incremental grid graph builder.

use sf_core::{LoopId, NodeId, PipeId, PipeSize};

use crate::error::NetworkError;
use crate::grid::{GridLoop, GridNode, GridPipe, GridTopology, PipeKind, Row};
use crate::validate;

/// Builder for a looped pipe graph.
///
/// Add nodes, pipes and loops, then call `build()` to validate the layout
/// and freeze it into a `GridTopology` with compact node-to-pipe adjacency.
#[derive(Debug, Default)]
pub struct GridBuilder {
    nodes: Vec<GridNode>,
    pipes: Vec<GridPipe>,
    loops: Vec<GridLoop>,
}

impl GridBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, row: Row, col: usize, demand_lpm: f64, is_inlet: bool) -> NodeId {
        let id = NodeId::from_usize(self.nodes.len());
        self.nodes.push(GridNode {
            id,
            row,
            col,
            demand_lpm,
            is_inlet,
        });
        id
    }

    pub fn add_pipe(
        &mut self,
        kind: PipeKind,
        start: NodeId,
        end: NodeId,
        size: PipeSize,
        length_m: f64,
    ) -> PipeId {
        self.add_drawing_pipe(kind, start, end, size, length_m, 0.0)
    }

    /// Add a pipe that draws `draw_lpm` off along its length.
    pub fn add_drawing_pipe(
        &mut self,
        kind: PipeKind,
        start: NodeId,
        end: NodeId,
        size: PipeSize,
        length_m: f64,
        draw_lpm: f64,
    ) -> PipeId {
        let id = PipeId::from_usize(self.pipes.len());
        self.pipes.push(GridPipe {
            id,
            kind,
            start,
            end,
            size,
            length_m,
            draw_lpm,
        });
        id
    }

    /// Add a loop as `(pipe, direction)` pairs, direction +1 when the loop
    /// walks the pipe start to end and -1 otherwise.
    pub fn add_loop(&mut self, members: &[(PipeId, i8)]) -> LoopId {
        let id = LoopId::from_usize(self.loops.len());
        self.loops.push(GridLoop {
            id,
            pipes: members.iter().map(|&(p, _)| p).collect(),
            directions: members.iter().map(|&(_, d)| d).collect(),
        });
        id
    }

    /// Validate and freeze the graph.
    pub fn build(self) -> Result<GridTopology, NetworkError> {
        validate::validate_structure(&self.nodes, &self.pipes)?;

        let (node_pipe_offsets, node_pipes) = Self::build_adjacency(&self.nodes, &self.pipes);

        validate::validate_loops(&self.nodes, &self.pipes, &self.loops)?;
        validate::validate_connectivity(&self.nodes, &self.pipes, &node_pipe_offsets, &node_pipes)?;

        Ok(GridTopology {
            nodes: self.nodes,
            pipes: self.pipes,
            loops: self.loops,
            node_pipe_offsets,
            node_pipes,
        })
    }

    /// For each node, the incident pipes in id order (CSR layout).
    fn build_adjacency(nodes: &[GridNode], pipes: &[GridPipe]) -> (Vec<usize>, Vec<PipeId>) {
        let mut per_node: Vec<Vec<PipeId>> = vec![Vec::new(); nodes.len()];
        for pipe in pipes {
            per_node[pipe.start.idx()].push(pipe.id);
            per_node[pipe.end.idx()].push(pipe.id);
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat = Vec::with_capacity(pipes.len() * 2);
        offsets.push(0);
        for list in per_node {
            flat.extend(list);
            offsets.push(flat.len());
        }
        (offsets, flat)
    }
}
