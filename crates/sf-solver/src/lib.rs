//! sf-solver: pressure solvers for sprinkflow networks.
//!
//! Provides:
//! - branch pressure profiles (`profile`)
//! - the tree solver (`tree`)
//! - Hardy-Cross loop balancing and grid pressures (`hardy_cross`, `pressure`, `grid`)
//! - a single `solve` entry point over `Topology`
//! - case comparison, compliance checks and the system head curve
//!
//! # Example
//!
//! ```
//! use sf_network::NetworkParams;
//! use sf_solver::{Topology, check_compliance, solve};
//!
//! let params = NetworkParams::default().with_inlet_pressure(0.5);
//! let result = solve(&Topology::grid(), &params).unwrap();
//! assert!(result.converged());
//! assert!(check_compliance(&result).is_compliant);
//! ```

pub mod compare;
pub mod compliance;
pub mod error;
pub mod grid;
pub mod hardy_cross;
pub mod pressure;
pub mod profile;
pub mod result;
pub mod system_curve;
pub mod topology;
pub mod tree;

pub use compare::{CaseSpec, ComparisonResult, compare_cases};
pub use compliance::{
    ComplianceLimits, ComplianceResult, PressureBound, Violation, check_compliance,
    check_compliance_with,
};
pub use error::{SolverError, SolverResult};
pub use grid::{solve_grid, solve_grid_network};
pub use hardy_cross::{FlowSeed, HardyCrossConfig, HardyCrossOutcome, HardyCrossResult, hardy_cross};
pub use profile::{BlockedFitting, BranchProfile, FittingLocation, SegmentDetail, branch_profile};
pub use result::{GridDiagnostics, NodeState, SolveResult, TopologyKind};
pub use system_curve::{CurvePoint, SystemCurve};
pub use topology::{Topology, solve};
pub use tree::{solve_tree, solve_tree_network};

fn report_blocked(blocked: &[BlockedFitting]) {
    for b in blocked {
        tracing::warn!(
            branch = b.branch,
            location = ?b.location,
            bead_height_mm = b.bead_height_mm,
            "Bead closes the bore; fitting solved as lossless"
        );
    }
}
