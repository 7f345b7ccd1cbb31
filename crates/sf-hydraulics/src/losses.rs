//! Head-loss terms (metres of water).

use sf_core::units::constants::G_MPS2;

/// Darcy-Weisbach major loss `f (L/D) V^2/2g`; 0.0 for non-positive diameter.
pub fn major_loss(f: f64, length_m: f64, d_m: f64, v: f64) -> f64 {
    if d_m <= 0.0 {
        return 0.0;
    }
    f * (length_m / d_m) * v * v / (2.0 * G_MPS2)
}

/// Minor loss `K V^2/2g`.
pub fn minor_loss(k: f64, v: f64) -> f64 {
    k * v * v / (2.0 * G_MPS2)
}

/// Loss coefficient of a welded joint whose bead protrudes `bead_mm` into a
/// bore of `pipe_id_mm`.
///
/// The bead is modelled as a uniform diameter reduction,
/// `D_eff = D - 2 h`, scaling the clean-joint coefficient by `(D/D_eff)^4`.
/// Returns `None` when the bead closes the bore (`D_eff <= 0`).
pub fn welded_fitting_k(bead_mm: f64, pipe_id_mm: f64, base_k: f64) -> Option<f64> {
    if bead_mm <= 0.0 {
        return Some(base_k);
    }
    let d_eff = pipe_id_mm - 2.0 * bead_mm;
    if d_eff <= 0.0 {
        return None;
    }
    Some(base_k * (pipe_id_mm / d_eff).powi(4))
}
