// odomfuse_sim/src/main.rs

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use odomfuse_sim::prelude::*;

fn main() -> ExitCode {
    let cli = Cli::parse();
    odomfuse_sim::init_logging(cli.quiet);

    match run_cli(&cli) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: &Cli) -> Result<SimulationReport, SimError> {
    info!("Loading scenario from: {}", cli.scenario.display());
    let scenario = ScenarioConfig::load(&cli.scenario)?;
    let seed = resolve_seed(cli.seed, scenario.simulation.seed);
    run(&scenario, seed)
}
