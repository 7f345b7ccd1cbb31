//! Velocity and Reynolds number.

use sf_core::units::constants::NU_M2_S;
use sf_core::units::lpm_to_m3s;

/// Mean velocity (m/s) of `q_m3s` through a circular bore of diameter `d_m`.
///
/// Returns 0.0 for a non-positive diameter.
pub fn velocity(q_m3s: f64, d_m: f64) -> f64 {
    if d_m <= 0.0 {
        return 0.0;
    }
    let area = std::f64::consts::PI * (d_m / 2.0).powi(2);
    q_m3s / area
}

/// [`velocity`] for a flow given in LPM.
pub fn velocity_from_lpm(q_lpm: f64, d_m: f64) -> f64 {
    velocity(lpm_to_m3s(q_lpm), d_m)
}

/// Reynolds number `V D / nu`; 0.0 for non-positive diameter or viscosity.
pub fn reynolds(v: f64, d_m: f64, nu: f64) -> f64 {
    if d_m <= 0.0 || nu <= 0.0 {
        return 0.0;
    }
    v * d_m / nu
}

/// Reynolds number of water at design conditions.
pub fn reynolds_water(v: f64, d_m: f64) -> f64 {
    reynolds(v, d_m, NU_M2_S)
}
