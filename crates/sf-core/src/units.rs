// sf-core/src/units.rs

use uom::si::f64::{
    Acceleration as UomAcceleration, Area as UomArea, Length as UomLength,
    Pressure as UomPressure, Velocity as UomVelocity, VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type Area = UomArea;
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Velocity = UomVelocity;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn mpa(v: f64) -> Pressure {
    use uom::si::pressure::megapascal;
    Pressure::new::<megapascal>(v)
}

#[inline]
pub fn lpm(v: f64) -> VolumeRate {
    use uom::si::volume_rate::liter_per_minute;
    VolumeRate::new::<liter_per_minute>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

/// Convert a flow in litres per minute to cubic metres per second.
#[inline]
pub fn lpm_to_m3s(q_lpm: f64) -> f64 {
    use uom::si::volume_rate::cubic_meter_per_second;
    lpm(q_lpm).get::<cubic_meter_per_second>()
}

/// Convert a length in millimetres to metres.
#[inline]
pub fn mm_to_m(v_mm: f64) -> f64 {
    use uom::si::length::meter;
    mm(v_mm).get::<meter>()
}

/// Water head (m) to pressure (MPa): `P = rho * g * h`.
#[inline]
pub fn head_to_mpa(head_m: f64) -> f64 {
    constants::RHO_KG_M3 * constants::G_MPS2 * head_m / 1.0e6
}

/// Pressure (MPa) to water head (m).
#[inline]
pub fn mpa_to_head(p_mpa: f64) -> f64 {
    p_mpa * 1.0e6 / (constants::RHO_KG_M3 * constants::G_MPS2)
}

/// Typed variant of [`head_to_mpa`].
pub fn head_to_pressure(head: Length) -> Pressure {
    use uom::si::length::meter;
    mpa(head_to_mpa(head.get::<meter>()))
}

/// Typed variant of [`mpa_to_head`].
pub fn pressure_to_head(p: Pressure) -> Length {
    use uom::si::pressure::megapascal;
    m(mpa_to_head(p.get::<megapascal>()))
}

/// Water at design temperature, steel pipe roughness and gravity.
pub mod constants {
    use super::*;

    /// Density (kg/m3)
    pub const RHO_KG_M3: f64 = 998.0;
    /// Dynamic viscosity (Pa s)
    pub const MU_PA_S: f64 = 1.002e-3;
    /// Kinematic viscosity (m2/s)
    pub const NU_M2_S: f64 = MU_PA_S / RHO_KG_M3;
    pub const G_MPS2: f64 = 9.81;
    /// Absolute roughness of carbon steel pipe (mm)
    pub const ROUGHNESS_MM: f64 = 0.045;
    /// Absolute roughness of carbon steel pipe (m)
    pub const ROUGHNESS_M: f64 = ROUGHNESS_MM / 1000.0;

    #[inline]
    pub fn g() -> Accel {
        use uom::si::acceleration::meter_per_second_squared;
        Accel::new::<meter_per_second_squared>(G_MPS2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = mpa(1.4);
        let _l = mm(26.64);
        let _q = lpm(400.0);
        let _v = mps(6.0);
        let _g = constants::g();
    }

    #[test]
    fn flow_conversion_matches_litres_per_minute() {
        assert!((lpm_to_m3s(60_000.0) - 1.0).abs() < 1e-12);
        assert!((lpm_to_m3s(400.0) - 400.0 / 60_000.0).abs() < 1e-15);
    }

    #[test]
    fn head_pressure_round_trip() {
        let h = 12.345;
        assert!((mpa_to_head(head_to_mpa(h)) - h).abs() < 1e-12);
        // 10 m of water is just under 0.1 MPa
        assert!((head_to_mpa(10.0) - 0.0979038).abs() < 1e-6);
    }

    #[test]
    fn typed_head_conversion() {
        use uom::si::length::meter;
        let p = head_to_pressure(m(10.0));
        let back = pressure_to_head(p);
        assert!((back.get::<meter>() - 10.0).abs() < 1e-9);
    }
}
