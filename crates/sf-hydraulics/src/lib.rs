//! sf-hydraulics: incompressible pipe-flow primitives for water.
//!
//! Provides:
//! - Mean velocity and Reynolds number
//! - Darcy friction factor (laminar closed form, Colebrook-White iteration)
//! - Darcy-Weisbach major loss and K-factor minor loss
//! - Weld-bead K transform for welded fittings
//!
//! Every function is pure and total: degenerate inputs (zero diameter, zero
//! flow, closed bore) map to documented fallback values instead of errors, so
//! sweeps that touch flow extremes never abort half way.
//!
//! # Example
//!
//! ```
//! use sf_core::PipeSize;
//! use sf_core::units::constants::ROUGHNESS_M;
//! use sf_hydraulics::{friction_factor, major_loss, reynolds_water, velocity_from_lpm};
//!
//! let d = PipeSize::A50.inner_diameter_m();
//! let v = velocity_from_lpm(100.0, d);
//! let f = friction_factor(reynolds_water(v, d), ROUGHNESS_M, d);
//! let h = major_loss(f, 2.3, d, v);
//! assert!(h > 0.0);
//! ```

pub mod flow;
pub mod friction;
pub mod losses;

pub use flow::{reynolds, reynolds_water, velocity, velocity_from_lpm};
pub use friction::{
    FlowRegime, LAMINAR_LIMIT_RE, colebrook_residual, flow_regime, friction_factor,
};
pub use losses::{major_loss, minor_loss, welded_fitting_k};
