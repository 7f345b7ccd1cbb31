//! Darcy friction factor.
//!
//! Laminar flow uses the closed form `64/Re`. Turbulent flow solves the
//! implicit Colebrook-White relation by fixed-point iteration on
//! `1/sqrt(f)`, seeded from a single Swamee-Jain style evaluation.

/// Reynolds number at which the turbulent correlation takes over.
pub const LAMINAR_LIMIT_RE: f64 = 2300.0;

const SEED_F: f64 = 0.02;
const MAX_ITER: usize = 10;
const REL_TOL: f64 = 1e-8;
/// Floor for the Colebrook log argument.
const LOG_ARG_MIN: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRegime {
    /// No flow (Re <= 0)
    Stagnant,
    Laminar,
    Turbulent,
}

pub fn flow_regime(re: f64) -> FlowRegime {
    if re <= 0.0 {
        FlowRegime::Stagnant
    } else if re < LAMINAR_LIMIT_RE {
        FlowRegime::Laminar
    } else {
        FlowRegime::Turbulent
    }
}

/// Right-hand side of Colebrook-White for a trial friction factor.
fn colebrook_rhs(f: f64, re: f64, rel_rough: f64) -> f64 {
    let mut arg = rel_rough / 3.7 + 2.51 / (re * f.sqrt());
    if arg <= 0.0 {
        arg = LOG_ARG_MIN;
    }
    -2.0 * arg.log10()
}

/// Darcy friction factor for Reynolds number `re`, absolute roughness `eps_m`
/// and inner diameter `d_m`.
///
/// Returns 0.0 for `re <= 0`. Never returns NaN.
pub fn friction_factor(re: f64, eps_m: f64, d_m: f64) -> f64 {
    match flow_regime(re) {
        FlowRegime::Stagnant => 0.0,
        FlowRegime::Laminar => 64.0 / re,
        FlowRegime::Turbulent => {
            let rel_rough = if d_m > 0.0 { eps_m / d_m } else { 0.0 };

            let mut f = colebrook_rhs(SEED_F, re, rel_rough).powi(-2);
            for _ in 0..MAX_ITER {
                let f_new = colebrook_rhs(f, re, rel_rough).powi(-2);
                let converged = (f_new - f).abs() / f < REL_TOL;
                f = f_new;
                if converged {
                    break;
                }
            }
            f
        }
    }
}

/// Relative residual of Colebrook-White at `f`: `|1/sqrt(f) - rhs| / |rhs|`.
pub fn colebrook_residual(f: f64, re: f64, eps_m: f64, d_m: f64) -> f64 {
    let rhs = colebrook_rhs(f, re, eps_m / d_m);
    ((1.0 / f.sqrt()) - rhs).abs() / rhs.abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::units::constants::ROUGHNESS_M;

    const D: f64 = 0.02664;

    #[test]
    fn laminar_is_closed_form() {
        let re = LAMINAR_LIMIT_RE - 1e-3;
        assert_eq!(friction_factor(re, ROUGHNESS_M, D), 64.0 / re);
        assert_eq!(friction_factor(100.0, ROUGHNESS_M, D), 0.64);
    }

    #[test]
    fn turbulent_satisfies_colebrook() {
        for re in [2300.0, 2300.5, 4000.0, 1e5, 1e7] {
            let f = friction_factor(re, ROUGHNESS_M, D);
            let r = colebrook_residual(f, re, ROUGHNESS_M, D);
            assert!(r < 1e-8, "Re={re}: residual {r}");
        }
    }

    #[test]
    fn stagnant_flow_has_no_friction() {
        assert_eq!(friction_factor(0.0, ROUGHNESS_M, D), 0.0);
        assert_eq!(friction_factor(-5.0, ROUGHNESS_M, D), 0.0);
    }

    #[test]
    fn degenerate_inputs_stay_finite() {
        assert!(friction_factor(1e12, ROUGHNESS_M, D).is_finite());
        assert!(friction_factor(5000.0, 1.0, 1e-6).is_finite());
        assert!(friction_factor(5000.0, ROUGHNESS_M, 0.0).is_finite());
    }

    #[test]
    fn regime_classification() {
        assert_eq!(flow_regime(0.0), FlowRegime::Stagnant);
        assert_eq!(flow_regime(2299.0), FlowRegime::Laminar);
        assert_eq!(flow_regime(2300.0), FlowRegime::Turbulent);
    }
}
