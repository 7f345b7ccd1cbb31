//! Grid topology validation.

use std::collections::VecDeque;

use sf_core::{NodeId, PipeId};

use crate::error::NetworkError;
use crate::grid::{GridLoop, GridNode, GridPipe};

/// Ids are contiguous, endpoints exist, and there is exactly one inlet.
pub(crate) fn validate_structure(nodes: &[GridNode], pipes: &[GridPipe]) -> Result<(), NetworkError> {
    for (i, node) in nodes.iter().enumerate() {
        if node.id.idx() != i {
            return Err(NetworkError::topology(format!("node {} stored at index {}", node.id, i)));
        }
        if !node.demand_lpm.is_finite() || node.demand_lpm < 0.0 {
            return Err(NetworkError::topology(format!(
                "node {} has demand {}",
                node.id, node.demand_lpm
            )));
        }
    }

    for (i, pipe) in pipes.iter().enumerate() {
        if pipe.id.idx() != i {
            return Err(NetworkError::topology(format!("pipe {} stored at index {}", pipe.id, i)));
        }
        for end in [pipe.start, pipe.end] {
            if end.idx() >= nodes.len() {
                return Err(NetworkError::topology(format!(
                    "pipe {} refers to non-existent node {}",
                    pipe.id, end
                )));
            }
        }
        if pipe.start == pipe.end {
            return Err(NetworkError::topology(format!("pipe {} is a self-loop", pipe.id)));
        }
        if !pipe.draw_lpm.is_finite() || pipe.draw_lpm < 0.0 {
            return Err(NetworkError::topology(format!(
                "pipe {} has draw {}",
                pipe.id, pipe.draw_lpm
            )));
        }
        if !(pipe.length_m.is_finite() && pipe.length_m > 0.0) {
            return Err(NetworkError::topology(format!(
                "pipe {} has length {}",
                pipe.id, pipe.length_m
            )));
        }
    }

    let inlets = nodes.iter().filter(|n| n.is_inlet).count();
    if inlets != 1 {
        return Err(NetworkError::topology(format!("expected one inlet, found {}", inlets)));
    }

    Ok(())
}

/// Every loop closes when walked with its direction flags, and the loops
/// count matches the cycle rank `pipes - nodes + 1`.
pub(crate) fn validate_loops(
    nodes: &[GridNode],
    pipes: &[GridPipe],
    loops: &[GridLoop],
) -> Result<(), NetworkError> {
    let rank = (pipes.len() + 1).saturating_sub(nodes.len());
    if loops.len() != rank {
        return Err(NetworkError::topology(format!(
            "{} loops for cycle rank {}",
            loops.len(),
            rank
        )));
    }

    for lp in loops {
        if lp.pipes.is_empty() || lp.pipes.len() != lp.directions.len() {
            return Err(NetworkError::topology(format!("loop {} is empty or malformed", lp.id)));
        }

        let mut start: Option<NodeId> = None;
        let mut at: Option<NodeId> = None;
        for (&pid, &dir) in lp.pipes.iter().zip(&lp.directions) {
            let pipe = pipes.get(pid.idx()).ok_or_else(|| {
                NetworkError::topology(format!("loop {} refers to non-existent pipe {}", lp.id, pid))
            })?;
            let (from, to) = match dir {
                1 => (pipe.start, pipe.end),
                -1 => (pipe.end, pipe.start),
                _ => {
                    return Err(NetworkError::topology(format!(
                        "loop {} has direction {} on pipe {}",
                        lp.id, dir, pid
                    )));
                }
            };
            if at.is_some_and(|current| current != from) {
                return Err(NetworkError::topology(format!(
                    "loop {} breaks at pipe {}",
                    lp.id, pid
                )));
            }
            start.get_or_insert(from);
            at = Some(to);
        }

        if at != start {
            return Err(NetworkError::topology(format!("loop {} does not close", lp.id)));
        }
    }

    Ok(())
}

/// Every node is reachable from the inlet.
pub(crate) fn validate_connectivity(
    nodes: &[GridNode],
    pipes: &[GridPipe],
    node_pipe_offsets: &[usize],
    node_pipes: &[PipeId],
) -> Result<(), NetworkError> {
    let Some(inlet) = nodes.iter().find(|n| n.is_inlet) else {
        return Err(NetworkError::topology("no inlet"));
    };

    let mut seen = vec![false; nodes.len()];
    let mut queue = VecDeque::from([inlet.id]);
    seen[inlet.id.idx()] = true;

    while let Some(node) = queue.pop_front() {
        let i = node.idx();
        for &pid in &node_pipes[node_pipe_offsets[i]..node_pipe_offsets[i + 1]] {
            let pipe = &pipes[pid.idx()];
            let next = if pipe.start == node { pipe.end } else { pipe.start };
            if !seen[next.idx()] {
                seen[next.idx()] = true;
                queue.push_back(next);
            }
        }
    }

    match seen.iter().position(|&s| !s) {
        Some(i) => Err(NetworkError::topology(format!(
            "node {} is unreachable from the inlet",
            nodes[i].id
        ))),
        None => Ok(()),
    }
}
