use crate::SfError;

/// Floating point type used throughout the solver
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, SfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SfError::NonFinite { what, value: v })
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[Real]) -> Real {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<Real>() / values.len() as Real
}

/// Standard deviation with `ddof` delta degrees of freedom (0 = population, 1 = sample).
///
/// Returns 0 when there are not more samples than `ddof`.
pub fn std_dev(values: &[Real], ddof: usize) -> Real {
    if values.len() <= ddof {
        return 0.0;
    }
    let mu = mean(values);
    let ss: Real = values.iter().map(|v| (v - mu).powi(2)).sum();
    (ss / (values.len() - ddof) as Real).sqrt()
}
