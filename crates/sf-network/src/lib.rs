//! sf-network: network model layer for sprinkflow.
//!
//! Provides:
//! - `NetworkParams` with input validation
//! - branch fixtures (head junctions, segment sizing, weld beads)
//! - the single-source tree network
//! - the dual cross-main grid graph with its loop basis, built through `GridBuilder`
//!
//! # Example
//!
//! ```
//! use sf_network::{GridNetwork, NetworkParams, TreeNetwork};
//!
//! let params = NetworkParams::new(4, 8);
//! let tree = TreeNetwork::build(&params).unwrap();
//! assert_eq!(tree.total_heads(), 32);
//!
//! let grid = GridNetwork::build(&params).unwrap();
//! assert_eq!(grid.topology.loops().len(), 5);
//! ```

pub mod beads;
pub mod branch;
pub mod builder;
pub mod error;
pub mod grid;
pub mod params;
pub mod tree;
pub(crate) mod validate;

pub use beads::{WeldBead, generate_branch_beads};
pub use branch::{Branch, HeadJunction, PipeSegment};
pub use builder::GridBuilder;
pub use error::NetworkError;
pub use grid::{GridLoop, GridNetwork, GridNode, GridPipe, GridTopology, PipeKind, Row};
pub use params::{LossCoefficients, NetworkParams, WeldBeadSpec};
pub use tree::{CrossMainSegment, TreeNetwork};
