use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sf_analysis::{SweepOutcome, SweepRange, SweepVariable};
use sf_app::{AppError, AppResult, RunOptions, run_service, scenario_service};
use sf_core::defaults::MIN_TERMINAL_PRESSURE_MPA;
use sf_project::schema::{ScenarioFile, TopologyDef};
use sf_solver::{PressureBound, SolveResult, Violation};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(about = "SprinkFlow CLI - Fire sprinkler network hydraulics", long_about = None)]
struct Cli {
    /// Override the scenario topology
    #[arg(long, global = true, value_enum)]
    topology: Option<TopologyArg>,
    /// Print the full result as JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum TopologyArg {
    Tree,
    Grid,
}

impl From<TopologyArg> for TopologyDef {
    fn from(arg: TopologyArg) -> Self {
        match arg {
            TopologyArg::Tree => TopologyDef::Tree,
            TopologyArg::Grid => TopologyDef::Grid,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and values
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Solve the network and print branch pressures
    Solve { scenario_path: PathBuf },
    /// Compare conventional welding (case A) with shape-controlled welding (case B)
    Compare { scenario_path: PathBuf },
    /// Check velocity and terminal pressure limits
    Compliance { scenario_path: PathBuf },
    /// Random defect placement with a uniform defect count
    MonteCarlo {
        scenario_path: PathBuf,
        #[arg(long)]
        iterations: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Independent per-fitting defects at each probability level
    Bernoulli {
        scenario_path: PathBuf,
        #[arg(long)]
        iterations: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Rank fittings of the worst branch by single-bead pressure drop
    Sensitivity { scenario_path: PathBuf },
    /// Step one input (design_flow, inlet_pressure, bead_height, heads_per_branch, mc_iterations)
    Sweep {
        scenario_path: PathBuf,
        variable: String,
        start: f64,
        end: f64,
        step: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Required inlet head over a flow range
    SystemCurve {
        scenario_path: PathBuf,
        /// Largest flow on the curve (LPM)
        #[arg(long)]
        max_flow: Option<f64>,
        #[arg(long)]
        points: Option<usize>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let out = Output { json: cli.json };
    let options = RunOptions {
        topology: cli.topology.map(TopologyDef::from),
        ..RunOptions::default()
    };

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path, out),
        Commands::Solve { scenario_path } => cmd_solve(&scenario_path, &options, out),
        Commands::Compare { scenario_path } => cmd_compare(&scenario_path, &options, out),
        Commands::Compliance { scenario_path } => cmd_compliance(&scenario_path, &options, out),
        Commands::MonteCarlo {
            scenario_path,
            iterations,
            seed,
        } => cmd_monte_carlo(
            &scenario_path,
            &RunOptions {
                iterations,
                seed,
                ..options
            },
            out,
        ),
        Commands::Bernoulli {
            scenario_path,
            iterations,
            seed,
        } => cmd_bernoulli(&scenario_path, iterations, &RunOptions { seed, ..options }, out),
        Commands::Sensitivity { scenario_path } => cmd_sensitivity(&scenario_path, &options, out),
        Commands::Sweep {
            scenario_path,
            variable,
            start,
            end,
            step,
            seed,
        } => cmd_sweep(
            &scenario_path,
            &RunOptions { seed, ..options },
            &variable,
            SweepRange::new(start, end, step),
            out,
        ),
        Commands::SystemCurve {
            scenario_path,
            max_flow,
            points,
        } => cmd_system_curve(&scenario_path, &options, max_flow, points, out),
    }
}

#[derive(Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    /// Print `value` as JSON when requested; returns true if it did.
    fn json<T: Serialize>(self, value: &T) -> AppResult<bool> {
        if !self.json {
            return Ok(false);
        }
        let text =
            serde_json::to_string_pretty(value).map_err(|e| AppError::Output(e.to_string()))?;
        println!("{text}");
        Ok(true)
    }
}

fn load(path: &Path) -> AppResult<ScenarioFile> {
    scenario_service::load_scenario(path)
}

fn pass_label(pass: bool) -> &'static str {
    if pass { "PASS" } else { "FAIL" }
}

fn cmd_validate(path: &Path, out: Output) -> AppResult<()> {
    let scenario = load(path)?;
    scenario_service::validate_scenario(&scenario)?;
    let summary = scenario_service::summarize(&scenario)?;
    if out.json(&summary)? {
        return Ok(());
    }
    println!("Validating scenario: {}", path.display());
    println!("✓ Scenario is valid");
    if !summary.name.is_empty() {
        println!("  Name: {}", summary.name);
    }
    println!(
        "  {} branches x {} heads ({} heads, cross main {})",
        summary.num_branches, summary.heads_per_branch, summary.total_heads, summary.cross_main
    );
    println!(
        "  Topology: {}  inlet {:.3} MPa  flow {:.1} LPM",
        summary.topology, summary.inlet_pressure_mpa, summary.total_flow_lpm
    );
    Ok(())
}

fn print_solve(result: &SolveResult) {
    println!(
        "Topology: {:?}  heads: {}  cross main: {}",
        result.topology, result.total_heads, result.cross_main_size
    );
    println!("  Branch  Inlet (MPa)  Terminal (MPa)");
    for (i, (inlet, terminal)) in result
        .branch_inlet_pressures_mpa
        .iter()
        .zip(&result.terminal_pressures_mpa)
        .enumerate()
    {
        let marker = if i == result.worst_branch_index { " *" } else { "" };
        println!("  {:>6}  {:>11.4}  {:>14.4}{}", i, inlet, terminal, marker);
    }
    println!(
        "Worst terminal: {:.4} MPa (branch {}), {}",
        result.worst_terminal_mpa,
        result.worst_branch_index,
        pass_label(result.worst_terminal_mpa >= MIN_TERMINAL_PRESSURE_MPA)
    );
    if let Some(grid) = &result.grid {
        println!(
            "Hardy-Cross: {:?} after {} iterations (imbalance {:.3e} m, dQ {:.3e} LPM)",
            grid.outcome, grid.iterations, grid.final_imbalance_m, grid.final_delta_q_lpm
        );
    }
    for b in &result.blocked_fittings {
        println!(
            "  Blocked: branch {} {:?} (bead {:.2} mm)",
            b.branch, b.location, b.bead_height_mm
        );
    }
}

fn cmd_solve(path: &Path, options: &RunOptions, out: Output) -> AppResult<()> {
    let scenario = load(path)?;
    let result = run_service::run_solve(&scenario, options)?;
    if out.json(&result)? {
        return Ok(());
    }
    print_solve(&result);
    Ok(())
}

fn cmd_compare(path: &Path, options: &RunOptions, out: Output) -> AppResult<()> {
    let scenario = load(path)?;
    let cmp = run_service::run_compare(&scenario, options)?;
    if out.json(&cmp)? {
        return Ok(());
    }
    println!(
        "{} heads, cross main {}",
        cmp.total_heads, cmp.cross_main_size
    );
    println!(
        "  Case A: {:.4} MPa (branch {}) {}",
        cmp.terminal_a_mpa,
        cmp.worst_branch_a,
        pass_label(cmp.pass_a)
    );
    println!(
        "  Case B: {:.4} MPa (branch {}) {}",
        cmp.terminal_b_mpa,
        cmp.worst_branch_b,
        pass_label(cmp.pass_b)
    );
    println!("  Improvement: {:.2}%", cmp.improvement_pct);
    Ok(())
}

fn describe_violation(v: &Violation) -> String {
    match v {
        Violation::BranchVelocity {
            branch,
            head,
            pipe_size,
            velocity_mps,
            limit_mps,
        } => format!(
            "branch {branch} head {head} ({pipe_size}): {velocity_mps:.2} m/s > {limit_mps:.1} m/s"
        ),
        Violation::CrossMainVelocity {
            pipe_size,
            velocity_mps,
            limit_mps,
        } => format!("cross main ({pipe_size}): {velocity_mps:.2} m/s > {limit_mps:.1} m/s"),
        Violation::TerminalPressure {
            branch,
            bound,
            pressure_mpa,
            limit_mpa,
        } => {
            let op = match bound {
                PressureBound::Under => "<",
                PressureBound::Over => ">",
            };
            format!("branch {branch} terminal: {pressure_mpa:.4} MPa {op} {limit_mpa:.2} MPa")
        }
        Violation::BlockedFitting {
            branch,
            location,
            bead_height_mm,
        } => format!("branch {branch} {location:?}: bead {bead_height_mm:.2} mm closes the bore"),
    }
}

fn cmd_compliance(path: &Path, options: &RunOptions, out: Output) -> AppResult<()> {
    let scenario = load(path)?;
    let (result, compliance) = run_service::run_compliance(&scenario, options)?;
    if out.json(&compliance)? {
        return Ok(());
    }
    println!(
        "Worst terminal: {:.4} MPa (branch {})",
        result.worst_terminal_mpa, result.worst_branch_index
    );
    if compliance.is_compliant {
        println!("✓ Compliant");
    } else {
        println!("✗ {} violation(s):", compliance.violations.len());
        for v in &compliance.violations {
            println!("  {}", describe_violation(v));
        }
    }
    Ok(())
}

fn cmd_monte_carlo(path: &Path, options: &RunOptions, out: Output) -> AppResult<()> {
    let scenario = load(path)?;
    let result = run_service::run_monte_carlo_study(&scenario, options)?;
    if out.json(&result)? {
        return Ok(());
    }
    let s = &result.stats;
    println!(
        "Monte Carlo: {} iterations over {} fittings (seed {})",
        result.iterations(),
        result.total_fittings,
        result.seed
    );
    println!(
        "  Worst terminal: mean {:.4}  std {:.4}  min {:.4}  max {:.4} MPa",
        s.mean_mpa, s.std_mpa, s.min_mpa, s.max_mpa
    );
    println!("  Below {MIN_TERMINAL_PRESSURE_MPA} MPa: {:.2}%", s.failure_pct());
    println!("  Defects placed per branch:");
    for (branch, count) in result.branch_frequency.iter().enumerate() {
        println!("    {:>4}: {}", branch, count);
    }
    if result.non_converged > 0 {
        println!("  Non-converged trials: {}", result.non_converged);
    }
    Ok(())
}

fn cmd_bernoulli(
    path: &Path,
    iterations: Option<usize>,
    options: &RunOptions,
    out: Output,
) -> AppResult<()> {
    let mut scenario = load(path)?;
    if let Some(n) = iterations {
        scenario.analysis.bernoulli.iterations = n;
    }
    let result = run_service::run_bernoulli_study(&scenario, options)?;
    if out.json(&result)? {
        return Ok(());
    }
    println!(
        "Bernoulli defects: {} fittings (seed {})",
        result.total_fittings, result.seed
    );
    println!("      p  E[beads]  mean beads  mean (MPa)  std (MPa)   fail %");
    for level in &result.levels {
        println!(
            "  {:>5.2}  {:>8.1}  {:>10.1}  {:>10.4}  {:>9.4}  {:>7.2}",
            level.p,
            level.expected_bead_count(result.total_fittings),
            level.mean_bead_count,
            level.stats.mean_mpa,
            level.stats.std_mpa,
            level.failure_pct
        );
    }
    Ok(())
}

fn cmd_sensitivity(path: &Path, options: &RunOptions, out: Output) -> AppResult<()> {
    let scenario = load(path)?;
    let result = run_service::run_sensitivity_study(&scenario, options)?;
    if out.json(&result)? {
        return Ok(());
    }
    println!(
        "Sensitivity on branch {} (bead {:.2} mm), baseline {:.4} MPa",
        result.worst_branch, result.bead_height_mm, result.baseline_mpa
    );
    println!("  Rank  Head  Pipe   Terminal (MPa)  Drop (kPa)");
    for (rank, &head) in result.ranking.iter().enumerate() {
        println!(
            "  {:>4}  {:>4}  {:<5}  {:>14.4}  {:>10.3}",
            rank + 1,
            head + 1,
            result.pipe_sizes[head].label(),
            result.single_bead_mpa[head],
            result.deltas_mpa[head] * 1000.0
        );
    }
    println!("Critical point: head {}", result.critical_point + 1);
    Ok(())
}

fn cmd_sweep(
    path: &Path,
    options: &RunOptions,
    variable: &str,
    range: SweepRange,
    out: Output,
) -> AppResult<()> {
    let variable: SweepVariable = variable
        .parse()
        .map_err(|e: sf_analysis::AnalysisError| AppError::InvalidInput(e.to_string()))?;
    let scenario = load(path)?;
    let result = run_service::run_sweep(&scenario, options, variable, range)?;
    if out.json(&result)? {
        return Ok(());
    }
    println!("Sweep of {} ({} points)", result.variable, result.values.len());
    match &result.outcome {
        SweepOutcome::Cases(c) => {
            println!("     value     A (MPa)     B (MPa)   impr %");
            for (i, value) in result.values.iter().enumerate() {
                println!(
                    "  {:>8.3}  {:>10.4}{} {:>10.4}{} {:>8.2}",
                    value,
                    c.terminal_a_mpa[i],
                    if c.pass_a[i] { " " } else { "!" },
                    c.terminal_b_mpa[i],
                    if c.pass_b[i] { " " } else { "!" },
                    c.improvement_pct[i]
                );
            }
            let critical = |v: Option<f64>| v.map_or("none".to_string(), |v| format!("{v:.3}"));
            println!("  First failing value: A {}, B {}", critical(c.critical_a), critical(c.critical_b));
        }
        SweepOutcome::MonteCarlo(mc) => {
            println!("  iterations   mean (MPa)  std (MPa)  min (MPa)  max (MPa)   p_below");
            for (i, value) in result.values.iter().enumerate() {
                println!(
                    "  {:>10.0}  {:>11.4}  {:>9.4}  {:>9.4}  {:>9.4}  {:>8.4}",
                    value, mc.mean_mpa[i], mc.std_mpa[i], mc.min_mpa[i], mc.max_mpa[i], mc.p_below[i]
                );
            }
        }
    }
    if result.num_failed() > 0 {
        println!("  Failed points: {}", result.num_failed());
    }
    Ok(())
}

fn cmd_system_curve(
    path: &Path,
    options: &RunOptions,
    max_flow: Option<f64>,
    points: Option<usize>,
    out: Output,
) -> AppResult<()> {
    let scenario = load(path)?;
    let curve = run_service::run_system_curve(&scenario, options, max_flow, points)?;
    if out.json(&curve)? {
        return Ok(());
    }
    println!("  Flow (LPM)  Head (m)");
    for p in &curve {
        println!("  {:>10.1}  {:>8.2}", p.flow_lpm, p.head_m);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sweep_with_global_flags() {
        let cli = Cli::try_parse_from([
            "sf-cli",
            "sweep",
            "net.yaml",
            "design-flow",
            "400",
            "4000",
            "400",
            "--topology",
            "grid",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(matches!(cli.topology, Some(TopologyArg::Grid)));
        match cli.command {
            Commands::Sweep {
                variable, end, ..
            } => {
                assert_eq!(variable, "design-flow");
                assert_eq!(end, 4000.0);
            }
            _ => panic!("expected sweep"),
        }
    }

    #[test]
    fn describes_pressure_violation() {
        let text = describe_violation(&Violation::TerminalPressure {
            branch: 2,
            bound: PressureBound::Under,
            pressure_mpa: 0.05,
            limit_mpa: 0.1,
        });
        assert_eq!(text, "branch 2 terminal: 0.0500 MPa < 0.10 MPa");
    }
}
