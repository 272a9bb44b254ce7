//! market-sim CLI
//!
//! Runs a double-auction simulation from a JSON run file, or the multistart
//! optimizer on a test objective.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use market_sim::{Bfgs, Bounds, MultistartSettings, RunFile, Simulation, multistart};

#[derive(Parser)]
#[command(name = "market-sim")]
#[command(about = "Double-auction goods and labor market simulation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and print the daily series as JSON
    Simulate {
        /// Run file with `sim` settings and `schedules`
        #[arg(long)]
        config: PathBuf,

        /// Also write the recorded trade and market-day tables as parquet
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Minimize the sum of squares over a 2-D box
    Optimize {
        /// Stop once the best value drops below this
        #[arg(long, default_value_t = 1e-6)]
        tau: f64,

        /// Rounds that start from a pure random draw
        #[arg(long, default_value_t = 10)]
        warmup: usize,

        #[arg(long, default_value_t = 100)]
        rounds: usize,

        #[arg(long, default_value_t = -10.0, allow_hyphen_values = true)]
        lower: f64,

        #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
        upper: f64,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { config, record } => simulate(config, record),
        Commands::Optimize {
            tau,
            warmup,
            rounds,
            lower,
            upper,
            seed,
        } => {
            init_logging();
            optimize(
                MultistartSettings {
                    tau,
                    warmup,
                    rounds,
                },
                Bounds::new(lower, upper),
                seed,
            )
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("market_sim=info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn simulate(config: PathBuf, record: Option<PathBuf>) -> Result<()> {
    let run = RunFile::load(&config)?;
    let schedules = run.schedules.into_schedules()?;
    let sim = Simulation::new(run.sim, schedules).context("invalid simulation settings")?;

    let series = match record {
        Some(dir) => run_recorded(sim, dir)?,
        None => {
            init_logging();
            info!(
                households = sim.config().households,
                firms = sim.config().firms,
                days = sim.config().days,
                "starting simulation"
            );
            sim.run()
        }
    };

    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}

/// The recorder owns the global subscriber, so console logging stays off.
#[cfg(feature = "instrument")]
fn run_recorded(sim: Simulation, dir: PathBuf) -> Result<market_sim::SimulationSeries> {
    let recorder = market_sim::instrument::ScopedRecorder::new(dir, "simulate");
    let series = sim.run();
    drop(recorder);
    Ok(series)
}

#[cfg(not(feature = "instrument"))]
fn run_recorded(_sim: Simulation, _dir: PathBuf) -> Result<market_sim::SimulationSeries> {
    anyhow::bail!("--record needs the `instrument` feature")
}

fn optimize(settings: MultistartSettings, bounds: Bounds, seed: u64) -> Result<()> {
    let objective = |x: &[f64; 2]| x[0] * x[0] + x[1] * x[1];
    let mut rng = StdRng::seed_from_u64(seed);

    let result = multistart(objective, bounds, settings, &Bfgs::default(), &mut rng)?;
    info!(
        rounds_run = result.rounds_run,
        best_value = result.best_value,
        converged = result.converged,
        "multistart finished"
    );

    let report = serde_json::json!({
        "best": result.best,
        "best_value": result.best_value,
        "rounds_run": result.rounds_run,
        "converged": result.converged,
        "starts": result.starts,
        "best_history": result.best_history,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
