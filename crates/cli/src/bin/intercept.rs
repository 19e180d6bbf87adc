use anyhow::anyhow;
use clap::Parser;
use intercept_calculator::config::{find_scenario, load_scenarios};
use intercept_calculator::export::writer_for_path;
use intercept_calculator::geometry::Vec2;
use intercept_calculator::report;
use intercept_calculator::session::from_config;
use intercept_calculator::solvers::SolverMethod;
use log::debug;
use std::io::Write;
use std::path::PathBuf;

/// Run one intercept solve and print its iteration trace.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Intercept trace for a single shooter velocity"
)]
struct Cli {
    /// Scenario manifest: a TOML file, a directory of TOML files, or a YAML list
    #[arg(long, default_value = "configs/scenarios")]
    config: PathBuf,

    /// Scenario name (case-insensitive); defaults to the first one loaded
    #[arg(long)]
    scenario: Option<String>,

    /// Solver override: fixed-point or newton
    #[arg(long)]
    solver: Option<SolverMethod>,

    /// Shooter velocity x component override (m/s)
    #[arg(long, allow_hyphen_values = true)]
    vx: Option<f64>,

    /// Shooter velocity y component override (m/s)
    #[arg(long, allow_hyphen_values = true)]
    vy: Option<f64>,

    /// Iteration budget override
    #[arg(long)]
    max_iter: Option<usize>,

    /// Also write the trace as CSV (use '-' for stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let scenarios = load_scenarios(&cli.config)?;
    let config = match &cli.scenario {
        Some(name) => find_scenario(&scenarios, name)?,
        None => scenarios
            .first()
            .ok_or_else(|| anyhow!("no scenarios in {}", cli.config.display()))?,
    };

    let mut inputs = from_config(config)?;
    if let Some(solver) = cli.solver {
        inputs.solver = solver;
    }
    if cli.vx.is_some() || cli.vy.is_some() {
        inputs.shooter_velocity = Vec2::new(
            cli.vx.unwrap_or(inputs.shooter_velocity.x),
            cli.vy.unwrap_or(inputs.shooter_velocity.y),
        );
    }
    if let Some(max_iter) = cli.max_iter {
        if max_iter == 0 {
            return Err(anyhow!("--max-iter must be at least 1"));
        }
        inputs.iteration_budget = max_iter;
    }
    if !inputs.shooter_velocity.is_finite() {
        return Err(anyhow!("shooter velocity must be finite"));
    }
    debug!("scenario '{}' solver={}", config.name, inputs.solver);

    let engagement = inputs.engagement;
    let records = inputs.trace();
    println!(
        "Scenario '{}' | solver {} | shooter ({:.3}, {:.3}) -> target ({:.3}, {:.3}) | vp {:.3} m/s | tol {:.3} m",
        config.name,
        inputs.solver,
        engagement.shooter.x,
        engagement.shooter.y,
        engagement.target.x,
        engagement.target.y,
        engagement.projectile_speed,
        engagement.tolerance,
    );
    println!(
        "Shooter velocity ({:.3}, {:.3}) m/s, budget {}",
        inputs.shooter_velocity.x, inputs.shooter_velocity.y, inputs.iteration_budget
    );
    println!(
        "{:>4} {:>10} {:>10} {:>12} {:>12} {:>10}",
        "iter", "tau_s", "tau_prev_s", "landing_x", "landing_y", "error_m"
    );
    for row in report::trace_rows(&engagement, &records) {
        println!(
            "{:>4} {:>10.5} {:>10.5} {:>12.5} {:>12.5} {:>10.5}",
            row.iteration,
            row.tau_s,
            row.tau_prev_s,
            row.landing.0,
            row.landing.1,
            row.landing_error_m
        );
    }

    let failed = inputs.is_convergence_failure();
    if failed {
        println!(
            "Result: did not converge within {} iterations",
            inputs.iteration_budget
        );
    } else {
        let iterations = records
            .iter()
            .find(|r| engagement.is_hit(r.actual_trajectory_end))
            .map(|r| r.iteration)
            .unwrap_or(records.len());
        println!("Result: converged in {iterations} iteration(s)");
    }

    if let Some(path) = &cli.output {
        let mut writer = writer_for_path(path)?;
        report::write_trace_csv(writer.as_mut(), &engagement, &records)?;
        writer.flush()?;
        if path.as_os_str() != "-" {
            eprintln!("Trace written to {}", path.display());
        }
    }
    Ok(())
}
