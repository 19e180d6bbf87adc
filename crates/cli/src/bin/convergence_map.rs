use anyhow::anyhow;
use clap::Parser;
use intercept_calculator::config::{find_scenario, load_scenarios};
use intercept_calculator::export::{sidecar, writer_for_path};
use intercept_calculator::report;
use intercept_calculator::session::from_config;
use intercept_calculator::solvers::SolverMethod;
use log::info;
use std::io::Write;
use std::path::PathBuf;

/// Sample iteration counts over velocity space and write them as CSV plus a JSON sidecar.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Convergence heat-map CSV generator"
)]
struct Cli {
    /// Scenario manifest: a TOML file, a directory of TOML files, or a YAML list
    #[arg(long, default_value = "configs/scenarios")]
    config: PathBuf,

    /// Scenario name (case-insensitive); defaults to the first one loaded
    #[arg(long)]
    scenario: Option<String>,

    /// Solver override: fixed-point or newton (resets the cap to the solver default)
    #[arg(long)]
    solver: Option<SolverMethod>,

    /// Cells per side
    #[arg(long)]
    resolution: Option<usize>,

    /// Heat-map iteration cap
    #[arg(long)]
    cap: Option<usize>,

    /// Iteration budget of the region-of-convergence overlay
    #[arg(long)]
    budget: Option<usize>,

    /// Output CSV file (use '-' for stdout; no sidecar is written then)
    #[arg(long, default_value = "artifacts/convergence.csv")]
    output: PathBuf,
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
        if solver != inputs.solver {
            inputs.solver = solver;
            inputs.iteration_cap = solver.default_iteration_cap();
        }
    }
    if let Some(resolution) = cli.resolution {
        if resolution == 0 {
            return Err(anyhow!("--resolution must be at least 1"));
        }
        inputs.resolution = resolution;
    }
    if let Some(cap) = cli.cap {
        if cap == 0 {
            return Err(anyhow!("--cap must be at least 1"));
        }
        inputs.iteration_cap = cap;
    }
    if let Some(budget) = cli.budget {
        if budget == 0 {
            return Err(anyhow!("--budget must be at least 1"));
        }
        inputs.iteration_budget = budget;
    }

    let grid = inputs.heatmap();
    let summary = grid.summary();

    let mut writer = writer_for_path(&cli.output)?;
    report::write_heatmap_csv(writer.as_mut(), &grid)?;
    writer.flush()?;

    if cli.output.as_os_str() != "-" {
        let meta = report::build_sidecar(&inputs, &grid);
        let sidecar_path = sidecar::write_sidecar(&cli.output, &meta)?;
        info!("sidecar written to {}", sidecar_path.display());
        println!(
            "Heat-map '{}' ({}, {}x{}, cap {}): iterations {}..={}, {:.1}% converged -> {}",
            config.name,
            inputs.solver,
            grid.resolution,
            grid.resolution,
            grid.iteration_cap,
            summary.min_iterations,
            summary.max_iterations,
            summary.converged_fraction * 100.0,
            cli.output.display()
        );
    }
    Ok(())
}
