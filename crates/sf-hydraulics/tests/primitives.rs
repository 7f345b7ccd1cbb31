//! Property tests for the hydraulics primitives.

use proptest::prelude::*;
use sf_core::PipeSize;
use sf_core::units::constants::ROUGHNESS_M;
use sf_hydraulics::{
    colebrook_residual, friction_factor, major_loss, minor_loss, reynolds_water,
    velocity_from_lpm, welded_fitting_k,
};

fn pipe_size() -> impl Strategy<Value = PipeSize> {
    prop::sample::select(PipeSize::ALL.to_vec())
}

#[test]
fn boundary_just_above_laminar_limit() {
    for size in PipeSize::ALL {
        let d = size.inner_diameter_m();
        let re = 2300.0 + 1e-6;
        let f = friction_factor(re, ROUGHNESS_M, d);
        let r = colebrook_residual(f, re, ROUGHNESS_M, d);
        println!("{size}: f={f:.6}, residual={r:.3e}");
        assert!(r < 1e-8, "{size} residual {r}");
    }
}

#[test]
fn segment_loss_of_typical_branch() {
    // 50 LPM through 2.3 m of 40A
    let d = PipeSize::A40.inner_diameter_m();
    let v = velocity_from_lpm(50.0, d);
    let f = friction_factor(reynolds_water(v, d), ROUGHNESS_M, d);
    let h = major_loss(f, 2.3, d, v);
    assert!(v > 0.6 && v < 0.7, "v = {v}");
    assert!(f > 0.02 && f < 0.04, "f = {f}");
    assert!(h > 0.02 && h < 0.05, "h = {h}");
}

proptest! {
    #[test]
    fn losses_are_non_negative(q in 0.0_f64..2000.0, size in pipe_size(), len in 0.0_f64..10.0) {
        let d = size.inner_diameter_m();
        let v = velocity_from_lpm(q, d);
        let f = friction_factor(reynolds_water(v, d), ROUGHNESS_M, d);
        prop_assert!(f >= 0.0 && f.is_finite());
        prop_assert!(major_loss(f, len, d, v) >= 0.0);
        prop_assert!(minor_loss(2.5, v) >= 0.0);
    }

    #[test]
    fn turbulent_loss_grows_with_flow(q in 50.0_f64..1500.0, dq in 1.0_f64..200.0, size in pipe_size()) {
        let d = size.inner_diameter_m();
        let h = |q: f64| {
            let v = velocity_from_lpm(q, d);
            let f = friction_factor(reynolds_water(v, d), ROUGHNESS_M, d);
            major_loss(f, 2.3, d, v)
        };
        prop_assert!(h(q + dq) > h(q));
    }

    #[test]
    fn bead_k_is_monotone_in_height(a in 0.0_f64..10.0, b in 0.0_f64..10.0, size in pipe_size()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let id = size.inner_diameter_mm();
        let k_lo = welded_fitting_k(lo, id, 0.5).unwrap();
        let k_hi = welded_fitting_k(hi, id, 0.5).unwrap();
        prop_assert!(k_hi >= k_lo);
    }
}
