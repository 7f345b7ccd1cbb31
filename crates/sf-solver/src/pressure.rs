//! Node pressures of a balanced grid.

use std::collections::VecDeque;

use sf_core::head_to_mpa;
use sf_network::GridNetwork;

use crate::error::{SolverError, SolverResult};
use crate::hardy_cross::pipe_head_drop;
use crate::result::NodeState;

/// Breadth-first walk from the inlet, applying each pipe's signed head drop.
///
/// Crossing a pipe start to end subtracts its drop; end to start adds it.
pub fn node_pressures(net: &GridNetwork, flows: &[f64]) -> SolverResult<Vec<f64>> {
    let topo = &net.topology;
    let mut pressure: Vec<Option<f64>> = vec![None; topo.nodes().len()];
    pressure[net.inlet.idx()] = Some(net.inlet_pressure_mpa);
    let mut queue = VecDeque::from([(net.inlet, net.inlet_pressure_mpa)]);

    while let Some((node, p)) = queue.pop_front() {
        for &pid in topo.incident_pipes(node) {
            let pipe = &topo.pipes()[pid.idx()];
            let Some(next) = pipe.other_end(node) else {
                continue;
            };
            if pressure[next.idx()].is_some() {
                continue;
            }
            let q = flows.get(pid.idx()).copied().unwrap_or(0.0);
            let drop = head_to_mpa(pipe_head_drop(net, pipe, q).drop_m);
            let p_next = if pipe.start == node { p - drop } else { p + drop };
            pressure[next.idx()] = Some(p_next);
            queue.push_back((next, p_next));
        }
    }

    pressure
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            p.ok_or_else(|| SolverError::InvalidState {
                what: format!("node {} not reached from the inlet", i),
            })
        })
        .collect()
}

/// Per-node flow bookkeeping and pressure.
///
/// A branch pipe hands on only what its heads leave, so its two ends can
/// both draw from their nodes.
pub fn node_table(net: &GridNetwork, flows: &[f64], pressures: &[f64]) -> Vec<NodeState> {
    let topo = &net.topology;
    let mut inflow = vec![0.0; topo.nodes().len()];
    let mut outflow = vec![0.0; topo.nodes().len()];
    for (pipe, &q) in topo.pipes().iter().zip(flows) {
        // leaving the start node, arriving at the end node
        for (node, arriving) in [(pipe.start, -q), (pipe.end, pipe.end_flow(q))] {
            if arriving >= 0.0 {
                inflow[node.idx()] += arriving;
            } else {
                outflow[node.idx()] -= arriving;
            }
        }
    }

    topo.nodes()
        .iter()
        .map(|node| {
            let i = node.id.idx();
            let supply = if node.is_inlet { net.total_flow_lpm } else { 0.0 };
            NodeState {
                id: node.id,
                label: node.label(),
                row: node.row,
                col: node.col,
                is_inlet: node.is_inlet,
                demand_lpm: node.demand_lpm,
                inflow_lpm: inflow[i],
                outflow_lpm: outflow[i],
                balance_lpm: inflow[i] + supply - outflow[i] - node.demand_lpm,
                pressure_mpa: pressures.get(i).copied().unwrap_or(f64::NAN),
            }
        })
        .collect()
}
