//! Summary statistics over worst-terminal samples.

use serde::{Deserialize, Serialize};
use sf_core::defaults::MIN_TERMINAL_PRESSURE_MPA;
use sf_core::numeric::{mean, std_dev};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleStats {
    pub mean_mpa: f64,
    pub std_mpa: f64,
    pub min_mpa: f64,
    pub max_mpa: f64,
    /// Share of samples below the 0.1 MPa floor, in [0, 1]
    pub p_below: f64,
}

impl SampleStats {
    /// `ddof` 0 gives the population std, 1 the sample std.
    pub fn from_samples(samples: &[f64], ddof: usize) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let below = samples
            .iter()
            .filter(|&&p| p < MIN_TERMINAL_PRESSURE_MPA)
            .count();
        Self {
            mean_mpa: mean(samples),
            std_mpa: std_dev(samples, ddof),
            min_mpa: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max_mpa: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            p_below: below as f64 / samples.len() as f64,
        }
    }

    pub fn failure_pct(&self) -> f64 {
        self.p_below * 100.0
    }
}

/// Running mean after each sample.
pub fn cumulative_mean(samples: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    samples
        .iter()
        .enumerate()
        .map(|(i, p)| {
            sum += p;
            sum / (i + 1) as f64
        })
        .collect()
}

/// Running percentage of samples below the 0.1 MPa floor.
pub fn cumulative_failure_pct(samples: &[f64]) -> Vec<f64> {
    let mut failed = 0usize;
    samples
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            if p < MIN_TERMINAL_PRESSURE_MPA {
                failed += 1;
            }
            failed as f64 / (i + 1) as f64 * 100.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_known_samples() {
        let s = SampleStats::from_samples(&[0.05, 0.15, 0.25, 0.35], 0);
        assert!((s.mean_mpa - 0.2).abs() < 1e-12);
        assert_eq!(s.min_mpa, 0.05);
        assert_eq!(s.max_mpa, 0.35);
        assert!((s.p_below - 0.25).abs() < 1e-12);
        assert!((s.failure_pct() - 25.0).abs() < 1e-9);

        let sample = SampleStats::from_samples(&[0.05, 0.15, 0.25, 0.35], 1);
        assert!(sample.std_mpa > s.std_mpa);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(SampleStats::from_samples(&[], 0), SampleStats::default());
    }

    #[test]
    fn running_series() {
        let samples = [0.2, 0.05, 0.2, 0.05];
        let means = cumulative_mean(&samples);
        assert!((means[1] - 0.125).abs() < 1e-12);
        let pf = cumulative_failure_pct(&samples);
        assert_eq!(pf.len(), 4);
        assert_eq!(pf[0], 0.0);
        assert!((pf[2] - 100.0 / 3.0).abs() < 1e-9);
        assert!((pf[3] - 50.0).abs() < 1e-9);
    }
}
