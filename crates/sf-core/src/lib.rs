//! sf-core: stable foundation for sprinkflow.
//!
//! Contains:
//! - units (uom SI types, constructors, head/pressure/flow conversions, water constants)
//! - pipes (nominal pipe table and auto-sizing rules)
//! - defaults (design defaults and regulatory limits)
//! - numeric (Real, finiteness checks, mean and standard deviation)
//! - ids (compact IDs for grid nodes, pipes and loops)
//! - error (shared error types)

pub mod defaults;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod pipes;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{SfError, SfResult};
pub use ids::*;
pub use numeric::*;
pub use pipes::PipeSize;
pub use units::*;
