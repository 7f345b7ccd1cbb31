//! sf-analysis: statistical drivers over the sprinkflow solvers.
//!
//! Provides:
//! - Monte Carlo over random fitting defects (`monte_carlo`)
//! - Bernoulli defect studies (`bernoulli`)
//! - single-bead sensitivity along the worst branch (`sensitivity`)
//! - design-variable sweeps (`sweep`)
//!
//! Trials are independent and run on rayon. Each trial draws from its own
//! seeded `StdRng`, so a seeded study gives the same numbers on any thread count.

pub mod bernoulli;
pub mod error;
pub mod monte_carlo;
pub mod seed;
pub mod sensitivity;
pub mod stats;
pub mod sweep;

pub use bernoulli::{BernoulliConfig, BernoulliLevel, BernoulliResult, run_bernoulli_monte_carlo};
pub use error::{AnalysisError, AnalysisResult};
pub use monte_carlo::{MonteCarloConfig, MonteCarloResult, random_weld_layout, run_monte_carlo};
pub use sensitivity::{SensitivityConfig, SensitivityResult, run_sensitivity};
pub use stats::SampleStats;
pub use sweep::{
    CaseSweep, MonteCarloSweep, SweepConfig, SweepOutcome, SweepRange, SweepResult,
    SweepVariable, run_variable_sweep,
};
