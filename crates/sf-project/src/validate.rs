//! Scenario validation logic.

use sf_core::defaults;

use crate::schema::{AnalysisDef, LATEST_VERSION, NetworkDef, ScenarioFile, SolverDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must be positive and finite"))
    }
}

fn non_negative(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must be non-negative and finite"))
    }
}

fn in_range(field: &str, v: u32, lo: u32, hi: u32) -> Result<(), ValidationError> {
    if (lo..=hi).contains(&v) {
        Ok(())
    } else {
        Err(invalid(field, v, &format!("must be within {lo}..={hi}")))
    }
}

pub fn validate_scenario(scenario: &ScenarioFile) -> Result<(), ValidationError> {
    if scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    validate_network(&scenario.network)?;
    validate_solver(&scenario.solver)?;
    validate_analysis(&scenario.analysis)?;
    Ok(())
}

fn validate_network(net: &NetworkDef) -> Result<(), ValidationError> {
    in_range("network.num_branches", net.num_branches, 1, defaults::MAX_BRANCHES)?;
    in_range(
        "network.heads_per_branch",
        net.heads_per_branch,
        1,
        defaults::MAX_HEADS_PER_BRANCH,
    )?;
    positive("network.branch_spacing_m", net.branch_spacing_m)?;
    positive("network.head_spacing_m", net.head_spacing_m)?;
    positive("network.inlet_pressure_mpa", net.inlet_pressure_mpa)?;
    positive("network.total_flow_lpm", net.total_flow_lpm)?;
    non_negative("network.bead_height_mm", net.bead_height_mm)?;

    if let Some(grid) = &net.bead_heights_mm {
        let rows_ok = grid.len() == net.num_branches as usize;
        let cols_ok = grid.iter().all(|row| row.len() == net.heads_per_branch as usize);
        if !rows_ok || !cols_ok {
            return Err(invalid(
                "network.bead_heights_mm",
                format!("{} rows", grid.len()),
                "must be num_branches x heads_per_branch",
            ));
        }
        for &h in grid.iter().flatten() {
            non_negative("network.bead_heights_mm", h)?;
        }
    }

    in_range(
        "network.weld_beads.per_branch",
        net.weld_beads.per_branch,
        0,
        defaults::MAX_BEADS_PER_BRANCH,
    )?;
    non_negative("network.weld_beads.height_mm", net.weld_beads.height_mm)?;

    non_negative("network.losses.k1_base", net.losses.k1_base)?;
    non_negative("network.losses.k2", net.losses.k2)?;
    non_negative("network.losses.k3", net.losses.k3)?;
    non_negative("network.losses.k_tee_run", net.losses.k_tee_run)?;
    Ok(())
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    let r = solver.relaxation;
    if !(defaults::HC_RELAXATION_MIN..=defaults::HC_RELAXATION_MAX).contains(&r) {
        return Err(invalid("solver.relaxation", r, "must be within 0.1..=1.0"));
    }
    if solver.max_iterations == 0 {
        return Err(invalid("solver.max_iterations", 0, "must be at least 1"));
    }
    positive("solver.tolerance_m", solver.tolerance_m)?;
    positive("solver.tolerance_lpm", solver.tolerance_lpm)?;
    Ok(())
}

fn validate_analysis(analysis: &AnalysisDef) -> Result<(), ValidationError> {
    let cases = &analysis.cases;
    non_negative("analysis.cases.bead_height_existing_mm", cases.bead_height_existing_mm)?;
    non_negative("analysis.cases.bead_height_new_mm", cases.bead_height_new_mm)?;
    in_range(
        "analysis.cases.beads_per_branch",
        cases.beads_per_branch,
        0,
        defaults::MAX_BEADS_PER_BRANCH,
    )?;

    let mc = &analysis.monte_carlo;
    if mc.iterations < 1 {
        return Err(invalid("analysis.monte_carlo.iterations", 0, "must be at least 1"));
    }
    if mc.min_defects > mc.max_defects {
        return Err(invalid(
            "analysis.monte_carlo.min_defects",
            mc.min_defects,
            "must not exceed max_defects",
        ));
    }
    non_negative("analysis.monte_carlo.bead_height_mm", mc.bead_height_mm)?;
    in_range(
        "analysis.monte_carlo.weld_beads_per_branch",
        mc.weld_beads_per_branch,
        0,
        defaults::MAX_BEADS_PER_BRANCH,
    )?;

    let bern = &analysis.bernoulli;
    if bern.p_values.is_empty() {
        return Err(invalid("analysis.bernoulli.p_values", "[]", "needs at least one value"));
    }
    for &p in &bern.p_values {
        if !(defaults::BERNOULLI_P_MIN..=defaults::BERNOULLI_P_MAX).contains(&p) {
            return Err(invalid("analysis.bernoulli.p_values", p, "must be within 0.01..=0.99"));
        }
    }
    if bern.iterations < 1 {
        return Err(invalid("analysis.bernoulli.iterations", 0, "must be at least 1"));
    }
    non_negative("analysis.bernoulli.bead_height_mm", bern.bead_height_mm)?;

    non_negative("analysis.sensitivity.bead_height_mm", analysis.sensitivity.bead_height_mm)?;

    positive("analysis.system_curve.max_flow_lpm", analysis.system_curve.max_flow_lpm)?;
    if analysis.system_curve.points < 2 {
        return Err(invalid(
            "analysis.system_curve.points",
            analysis.system_curve.points,
            "must be at least 2",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ValidationError) -> String {
        match err {
            ValidationError::InvalidValue { field, .. } => field,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        validate_scenario(&ScenarioFile::default()).unwrap();
    }

    #[test]
    fn rejects_out_of_range_network() {
        let mut s = ScenarioFile::default();
        s.network.num_branches = 201;
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "network.num_branches");

        let mut s = ScenarioFile::default();
        s.network.total_flow_lpm = f64::NAN;
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "network.total_flow_lpm");

        let mut s = ScenarioFile::default();
        s.network.bead_heights_mm = Some(vec![vec![0.0; 8]; 3]);
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "network.bead_heights_mm");
    }

    #[test]
    fn rejects_bad_solver_and_analysis() {
        let mut s = ScenarioFile::default();
        s.solver.relaxation = 0.05;
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "solver.relaxation");

        let mut s = ScenarioFile::default();
        s.analysis.monte_carlo.min_defects = 5;
        assert_eq!(
            field_of(validate_scenario(&s).unwrap_err()),
            "analysis.monte_carlo.min_defects"
        );

        let mut s = ScenarioFile::default();
        s.analysis.bernoulli.p_values = vec![0.5, 1.0];
        assert_eq!(
            field_of(validate_scenario(&s).unwrap_err()),
            "analysis.bernoulli.p_values"
        );
    }

    #[test]
    fn rejects_future_version() {
        let s = ScenarioFile {
            version: LATEST_VERSION + 1,
            ..ScenarioFile::default()
        };
        assert_eq!(
            validate_scenario(&s),
            Err(ValidationError::UnsupportedVersion {
                version: LATEST_VERSION + 1
            })
        );
    }
}
