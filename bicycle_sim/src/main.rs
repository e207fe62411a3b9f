// bicycle_sim/src/main.rs

use bicycle_sim::{
    cli::Cli, config::load_scenario, error::SimError, prng::simulation_rng, rollout::Rollout,
};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let mut scenario = load_scenario(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.simulation.seed = Some(seed);
    }

    let mut rng = simulation_rng(scenario.simulation.seed);
    let trace = Rollout::from_scenario(&scenario)?.run(&mut rng)?;

    match &cli.output {
        Some(path) => {
            trace.write_csv(BufWriter::new(File::create(path)?))?;
            log::info!("Wrote {} records to {:?}", trace.records.len(), path);
        }
        None => trace.write_csv(io::stdout().lock())?,
    }
    Ok(())
}
